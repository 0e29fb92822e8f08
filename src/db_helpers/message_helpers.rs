use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Message};

const MESSAGE_COLUMNS: &str = "id, sender_id, receiver_id, message, timestamp";

pub async fn insert_message_in_db(
    pool: &SqlitePool,
    sender_id: i64,
    receiver_id: i64,
    message: &str,
) -> Result<Message, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        r#"
        INSERT INTO messages (sender_id, receiver_id, message, timestamp)
        VALUES ($1, $2, $3, $4)
        RETURNING {MESSAGE_COLUMNS}
        "#
    );
    let message = sqlx::query_as::<Sqlite, Message>(&query)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(message)
        .bind(Utc::now())
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(message)
}

/// Every message in the collection, oldest first.
pub async fn list_messages_in_db(pool: &SqlitePool) -> Result<Vec<Message>, RequestError> {
    let query = format!("SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY timestamp ASC, id ASC");
    let messages = sqlx::query_as::<Sqlite, Message>(&query)
        .fetch_all(pool)
        .await?;
    Ok(messages)
}

pub async fn get_message_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Message>, RequestError> {
    let query = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1");
    let message = sqlx::query_as::<Sqlite, Message>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(message)
}

pub async fn delete_message_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM messages WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Message not found"));
    }
    tx.commit().await?;
    Ok(())
}
