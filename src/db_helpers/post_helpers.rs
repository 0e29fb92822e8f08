use chrono::Utc;
use sqlx::{types::Json, Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Post};

use super::like_pattern;

pub(super) const POST_QUERY: &str = r#"
            SELECT posts.id                 AS "id",
                   posts.creator_id         AS "creator_id",
                   posts.caption            AS "caption",
                   posts.image_url          AS "image_url",
                   posts.image_id           AS "image_id",
                   posts.location           AS "location",
                   posts.tags               AS "tags",
                   posts.likes              AS "likes",
                   posts.created_at         AS "created_at",
                   posts.updated_at         AS "updated_at",
                   users.name               AS "creator_name",
                   users.username           AS "creator_username",
                   users.image_url          AS "creator_image_url"
            FROM   posts
                JOIN users
                    ON posts.creator_id = users.id
"#;

#[derive(Debug)]
pub struct NewPost<'a> {
    pub creator_id: i64,
    pub caption: &'a str,
    pub image_url: &'a str,
    pub image_id: &'a str,
    pub location: Option<&'a str>,
    pub tags: Vec<String>,
}

/// A full replacement of the editable post fields.
#[derive(Debug)]
pub struct PostChanges<'a> {
    pub caption: &'a str,
    pub image_url: &'a str,
    pub image_id: &'a str,
    pub location: Option<&'a str>,
    pub tags: Vec<String>,
}

pub async fn get_post_by_id_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Post>, RequestError> {
    let query = format!("{POST_QUERY} WHERE posts.id = $1");
    let post = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(post)
}

pub async fn create_post_in_db(pool: &SqlitePool, post: NewPost<'_>) -> Result<Post, RequestError> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO posts (creator_id, caption, image_url, image_id, location, tags, likes, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, '[]', $7, $7)
        RETURNING id
        "#,
    )
    .bind(post.creator_id)
    .bind(post.caption)
    .bind(post.image_url)
    .bind(post.image_id)
    .bind(post.location)
    .bind(Json(post.tags))
    .bind(now)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;

    get_post_by_id_in_db(pool, id)
        .await?
        .ok_or(RequestError::NotFound("Post not found"))
}

pub async fn list_recent_posts_in_db(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<Post>, RequestError> {
    let query =
        format!("{POST_QUERY} ORDER BY posts.created_at DESC, posts.id DESC LIMIT $1");
    let posts = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(posts)
}

/// One page ordered by last update, starting after the post `cursor`.
pub async fn list_infinite_posts_in_db(
    pool: &SqlitePool,
    cursor: Option<i64>,
    limit: i64,
) -> Result<Vec<Post>, RequestError> {
    if let Some(cursor) = cursor {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM posts WHERE id = $1")
            .bind(cursor)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(RequestError::NotFound("Cursor post not found"));
        }
    }
    let query = format!(
        r#"{POST_QUERY}
            WHERE $1 IS NULL
                OR (posts.updated_at, posts.id) < (SELECT updated_at, id FROM posts WHERE id = $1)
            ORDER BY posts.updated_at DESC, posts.id DESC
            LIMIT $2
        "#
    );
    let posts = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(cursor)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(posts)
}

pub async fn search_posts_in_db(pool: &SqlitePool, term: &str) -> Result<Vec<Post>, RequestError> {
    let query = format!(
        r#"{POST_QUERY}
            WHERE posts.caption LIKE $1 ESCAPE '\'
            ORDER BY posts.created_at DESC, posts.id DESC
        "#
    );
    let posts = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(like_pattern(term))
        .fetch_all(pool)
        .await?;
    Ok(posts)
}

pub async fn list_user_posts_in_db(
    pool: &SqlitePool,
    creator_id: i64,
) -> Result<Vec<Post>, RequestError> {
    let query = format!(
        "{POST_QUERY} WHERE posts.creator_id = $1 ORDER BY posts.created_at DESC, posts.id DESC"
    );
    let posts = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(creator_id)
        .fetch_all(pool)
        .await?;
    Ok(posts)
}

pub async fn update_post_in_db(
    pool: &SqlitePool,
    id: i64,
    changes: PostChanges<'_>,
) -> Result<Post, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        UPDATE posts
        SET caption = $1, image_url = $2, image_id = $3, location = $4, tags = $5, updated_at = $6
        WHERE id = $7
        "#,
    )
    .bind(changes.caption)
    .bind(changes.image_url)
    .bind(changes.image_id)
    .bind(changes.location)
    .bind(Json(changes.tags))
    .bind(Utc::now())
    .bind(id)
    .execute(&mut tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Post not found"));
    }
    tx.commit().await?;

    get_post_by_id_in_db(pool, id)
        .await?
        .ok_or(RequestError::NotFound("Post not found"))
}

/// Overwrites the whole likes array and bumps the update time. Concurrent
/// writers race; the last one wins.
pub async fn set_post_likes_in_db(
    pool: &SqlitePool,
    id: i64,
    likes: Vec<i64>,
) -> Result<Post, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("UPDATE posts SET likes = $1, updated_at = $2 WHERE id = $3")
        .bind(Json(likes))
        .bind(Utc::now())
        .bind(id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Post not found"));
    }
    tx.commit().await?;

    get_post_by_id_in_db(pool, id)
        .await?
        .ok_or(RequestError::NotFound("Post not found"))
}

/// Deletes the post and every save that points at it.
pub async fn delete_post_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM saves WHERE post_id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Post not found"));
    }
    tx.commit().await?;
    Ok(())
}
