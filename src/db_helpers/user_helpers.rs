use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::info;

use crate::{
    data_formats::RegisterRequest,
    errors::RequestError,
    models::{Role, User},
};

use super::{get_user_by_id, QueryBuilder, USER_COLUMNS};

/// Field changes for a user document. `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub image_url: Option<String>,
    pub image_id: Option<String>,
}

/// `user.password` must already be hashed. The first account ever created is an admin.
pub async fn insert_user(
    pool: &SqlitePool,
    user: &RegisterRequest,
    image_url: &str,
) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&mut tx)
        .await?;
    let role = if existing == 0 { Role::Admin } else { Role::User };

    let query = format!(
        r#"
        INSERT INTO users (name, username, email, password, image_url, bio, role, created_at)
        VALUES ($1, $2, $3, $4, $5, '', $6, $7)
        RETURNING {USER_COLUMNS}
        "#
    );
    let user = sqlx::query_as::<Sqlite, User>(&query)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(image_url)
        .bind(role)
        .bind(Utc::now())
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(user)
}

pub async fn list_users_in_db(
    pool: &SqlitePool,
    limit: Option<i64>,
) -> Result<Vec<User>, RequestError> {
    // SQLite treats a negative LIMIT as no limit. Zero means no limit as well.
    let limit = limit.filter(|limit| *limit > 0).unwrap_or(-1);
    let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC LIMIT $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn update_user_in_db(
    pool: &SqlitePool,
    id: i64,
    UserChanges {
        name,
        bio,
        email,
        role,
        image_url,
        image_id,
    }: UserChanges,
) -> Result<User, RequestError> {
    let role = role.map(|role| role.as_str().to_owned());
    let builder = QueryBuilder::new("UPDATE users SET ", ", ")
        .add_param("name", name)
        .add_param("bio", bio)
        .add_param("email", email)
        .add_param("role", role)
        .add_param("image_url", image_url)
        .add_param("image_id", image_id);
    let id_placeholder = builder.next_placeholder();

    if let Some((query, params)) = builder.build() {
        let query = format!("{query} WHERE id = ${id_placeholder}");
        let mut tx = pool.begin().await?;
        let mut query = sqlx::query(&query);
        for param in params {
            query = query.bind(param);
        }
        let result = query.bind(id).execute(&mut tx).await?;
        if result.rows_affected() == 0 {
            return Err(RequestError::NotFound("User not found"));
        }
        tx.commit().await?;
    }

    match get_user_by_id(pool, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotFound("User not found")),
    }
}

/// Removes the user's saved posts, posts and sessions, then the user, in one
/// transaction. Returns the image ids of the deleted posts and avatar so the
/// caller can drop the stored files once the transaction has committed.
pub async fn delete_user_cascade_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<Vec<String>, RequestError> {
    let mut tx = pool.begin().await?;

    let saves = sqlx::query("DELETE FROM saves WHERE user_id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?
        .rows_affected();

    let mut image_ids: Vec<String> =
        sqlx::query_scalar("SELECT image_id FROM posts WHERE creator_id = $1")
            .bind(id)
            .fetch_all(&mut tx)
            .await?;

    // Other users' saves of these posts go too.
    sqlx::query("DELETE FROM saves WHERE post_id IN (SELECT id FROM posts WHERE creator_id = $1)")
        .bind(id)
        .execute(&mut tx)
        .await?;
    let posts = sqlx::query("DELETE FROM posts WHERE creator_id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM sessions WHERE user_id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;

    let avatar: Option<Option<String>> =
        sqlx::query_scalar("DELETE FROM users WHERE id = $1 RETURNING image_id")
            .bind(id)
            .fetch_optional(&mut tx)
            .await?;
    match avatar {
        Some(avatar) => image_ids.extend(avatar),
        None => return Err(RequestError::NotFound("User not found")),
    }

    tx.commit().await?;
    info!(
        "Deleted user {} with {} posts and {} saved posts",
        id, posts, saves
    );
    Ok(image_ids)
}
