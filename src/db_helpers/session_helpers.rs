use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;

use crate::{errors::RequestError, models::Session};

/// Starts a session, clearing the user's expired ones first.
pub async fn insert_session(
    pool: &SqlitePool,
    id: &str,
    user_id: i64,
    expires_at: DateTime<Utc>,
) -> Result<Session, RequestError> {
    let mut tx = pool.begin().await?;
    let purged = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND expires_at <= $2")
        .bind(user_id)
        .bind(Utc::now())
        .execute(&mut tx)
        .await?
        .rows_affected();
    if purged > 0 {
        debug!("Purged {} expired sessions of user {}", purged, user_id);
    }
    let session = sqlx::query_as::<Sqlite, Session>(
        r#"
        INSERT INTO sessions (id, user_id, expires_at, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, expires_at, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(expires_at)
    .bind(Utc::now())
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(session)
}

/// A session that exists and has not expired.
pub async fn get_live_session(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<Session>, RequestError> {
    let session = sqlx::query_as::<Sqlite, Session>(
        "SELECT id, user_id, expires_at, created_at FROM sessions WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(session.filter(|session| session.expires_at > Utc::now()))
}

pub async fn delete_session_in_db(pool: &SqlitePool, id: &str) -> Result<bool, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}
