use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};

use crate::{
    errors::RequestError,
    models::{Post, SavedPost},
};

use super::post_helpers::POST_QUERY;

const SAVE_COLUMNS: &str = "id, user_id, post_id, created_at";

/// One record per save action; saving twice yields two records.
pub async fn insert_save_in_db(
    pool: &SqlitePool,
    user_id: i64,
    post_id: i64,
) -> Result<SavedPost, RequestError> {
    let mut tx = pool.begin().await?;
    let post_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&mut tx)
        .await?;
    if post_exists.is_none() {
        return Err(RequestError::NotFound("Post not found"));
    }

    let query = format!(
        r#"
        INSERT INTO saves (user_id, post_id, created_at)
        VALUES ($1, $2, $3)
        RETURNING {SAVE_COLUMNS}
        "#
    );
    let save = sqlx::query_as::<Sqlite, SavedPost>(&query)
        .bind(user_id)
        .bind(post_id)
        .bind(Utc::now())
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(save)
}

pub async fn get_save_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<SavedPost>, RequestError> {
    let query = format!("SELECT {SAVE_COLUMNS} FROM saves WHERE id = $1");
    let save = sqlx::query_as::<Sqlite, SavedPost>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(save)
}

pub async fn list_saves_for_user_in_db(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<SavedPost>, RequestError> {
    let query = format!(
        "SELECT {SAVE_COLUMNS} FROM saves WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
    );
    let saves = sqlx::query_as::<Sqlite, SavedPost>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(saves)
}

/// Posts the user has saved, most recently saved first, each post once.
pub async fn list_saved_posts_in_db(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<Post>, RequestError> {
    let query = format!(
        r#"{POST_QUERY}
            JOIN (SELECT post_id, MAX(id) AS save_id FROM saves WHERE user_id = $1 GROUP BY post_id) AS saved
                ON saved.post_id = posts.id
            ORDER BY saved.save_id DESC
        "#
    );
    let posts = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(posts)
}

pub async fn delete_save_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM saves WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Saved post not found"));
    }
    tx.commit().await?;
    Ok(())
}
