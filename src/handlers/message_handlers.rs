use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use sqlx::SqlitePool;
use tracing::info;

use crate::{
    authentication::AuthUser,
    data_formats::{
        DocumentList, MessageResponse, MessageWrapper, SendMessageRequest, StatusWrapper,
    },
    db_helpers::{
        delete_message_in_db, get_message_in_db, get_user_by_id, insert_message_in_db,
        list_messages_in_db,
    },
    errors::RequestError,
    models::Message,
};

use super::JsonResult;

/// Messages exchanged between `a` and `b` in either direction, order preserved.
pub fn conversation(messages: Vec<Message>, a: i64, b: i64) -> Vec<Message> {
    messages
        .into_iter()
        .filter(|message| message.is_between(a, b))
        .collect()
}

/// Messages the user sent or received, order preserved.
pub fn involving(messages: Vec<Message>, user: i64) -> Vec<Message> {
    messages
        .into_iter()
        .filter(|message| message.sender_id == user || message.receiver_id == user)
        .collect()
}

fn into_list(messages: Vec<Message>) -> DocumentList<MessageResponse> {
    messages
        .into_iter()
        .map(MessageResponse::from)
        .collect::<Vec<_>>()
        .into()
}

// ----------------- Message Handlers -----------------
pub async fn send_message(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Json(SendMessageRequest {
        receiver_id,
        message,
    }): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageWrapper<MessageResponse>>), RequestError> {
    if message.trim().is_empty() {
        return Err(RequestError::BadRequest("message must not be empty".to_owned()));
    }
    if get_user_by_id(&pool, receiver_id).await?.is_none() {
        return Err(RequestError::NotFound("Receiver not found"));
    }
    let sent = insert_message_in_db(&pool, user.id, receiver_id, &message).await?;
    info!("Message {} sent from {} to {}", sent.id, user.id, receiver_id);
    Ok((
        StatusCode::CREATED,
        Json(MessageWrapper {
            message: sent.into(),
        }),
    ))
}

pub async fn list_messages(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
) -> JsonResult<DocumentList<MessageResponse>> {
    let messages = list_messages_in_db(&pool).await?;
    Ok(Json(into_list(involving(messages, user.id))))
}

/// The whole collection is fetched and narrowed to the pair locally.
pub async fn list_conversation(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(other): Path<i64>,
) -> JsonResult<DocumentList<MessageResponse>> {
    let messages = list_messages_in_db(&pool).await?;
    Ok(Json(into_list(conversation(messages, user.id, other))))
}

pub async fn delete_message(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<StatusWrapper> {
    let message = get_message_in_db(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Message not found"))?;
    if message.sender_id != user.id {
        return Err(RequestError::Forbidden);
    }
    delete_message_in_db(&pool, id).await?;
    info!("Message {} deleted by {}", id, user.id);
    Ok(Json(StatusWrapper::ok()))
}
