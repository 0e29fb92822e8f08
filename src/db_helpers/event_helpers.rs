use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};

use crate::{data_formats::EventRequest, errors::RequestError, models::CalendarEvent};

const EVENT_COLUMNS: &str = "id, title, starts_at, ends_at, created_at";

pub async fn insert_event_in_db(
    pool: &SqlitePool,
    EventRequest { title, start, end }: &EventRequest,
) -> Result<CalendarEvent, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        r#"
        INSERT INTO calendar_events (title, starts_at, ends_at, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING {EVENT_COLUMNS}
        "#
    );
    let event = sqlx::query_as::<Sqlite, CalendarEvent>(&query)
        .bind(title)
        .bind(start)
        .bind(end)
        .bind(Utc::now())
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(event)
}

pub async fn list_events_in_db(pool: &SqlitePool) -> Result<Vec<CalendarEvent>, RequestError> {
    let query =
        format!("SELECT {EVENT_COLUMNS} FROM calendar_events ORDER BY created_at DESC, id DESC");
    let events = sqlx::query_as::<Sqlite, CalendarEvent>(&query)
        .fetch_all(pool)
        .await?;
    Ok(events)
}

/// Replaces title, start and end of an existing event.
pub async fn update_event_in_db(
    pool: &SqlitePool,
    id: i64,
    EventRequest { title, start, end }: &EventRequest,
) -> Result<CalendarEvent, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        r#"
        UPDATE calendar_events SET title = $1, starts_at = $2, ends_at = $3
        WHERE id = $4
        RETURNING {EVENT_COLUMNS}
        "#
    );
    let event = sqlx::query_as::<Sqlite, CalendarEvent>(&query)
        .bind(title)
        .bind(start)
        .bind(end)
        .bind(id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    event.ok_or(RequestError::NotFound("Event not found"))
}

/// Returns false when there was nothing to delete.
pub async fn delete_event_in_db(pool: &SqlitePool, id: i64) -> Result<bool, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}
