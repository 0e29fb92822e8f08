use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    authentication::AuthUser,
    data_formats::{DocumentList, EventRequest, EventResponse, EventWrapper, StatusWrapper},
    db_helpers::{delete_event_in_db, insert_event_in_db, list_events_in_db, update_event_in_db},
    errors::RequestError,
};

use super::JsonResult;

type EventJson = EventWrapper<EventResponse>;

fn validate(event: &mut EventRequest) -> Result<(), RequestError> {
    event.title = event.title.trim().to_owned();
    if event.title.is_empty() {
        return Err(RequestError::BadRequest("title is required".to_owned()));
    }
    Ok(())
}

// ----------------- Calendar Event Handlers -----------------
pub async fn list_events(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: AuthUser,
) -> JsonResult<DocumentList<EventResponse>> {
    let events = list_events_in_db(&pool).await?;
    Ok(Json(
        events
            .into_iter()
            .map(EventResponse::from)
            .collect::<Vec<_>>()
            .into(),
    ))
}

pub async fn create_event(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Json(mut event): Json<EventRequest>,
) -> Result<(StatusCode, Json<EventJson>), RequestError> {
    user.require_admin(&pool).await?;
    validate(&mut event)?;
    let created = insert_event_in_db(&pool, &event).await?;
    info!("Created event {} ({})", created.id, created.title);
    Ok((
        StatusCode::CREATED,
        Json(EventWrapper {
            event: created.into(),
        }),
    ))
}

pub async fn update_event(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(mut event): Json<EventRequest>,
) -> JsonResult<EventJson> {
    user.require_admin(&pool).await?;
    validate(&mut event)?;
    let updated = update_event_in_db(&pool, id, &event).await?;
    info!("Updated event {}", id);
    Ok(Json(EventWrapper {
        event: updated.into(),
    }))
}

/// Deleting an event that is already gone still succeeds.
pub async fn delete_event(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<StatusWrapper> {
    user.require_admin(&pool).await?;
    if delete_event_in_db(&pool, id).await? {
        info!("Deleted event {}", id);
    } else {
        warn!("Event {} not found or already deleted", id);
    }
    Ok(Json(StatusWrapper::ok()))
}
