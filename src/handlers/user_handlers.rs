use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query},
    Extension, Json,
};
use sqlx::SqlitePool;
use tracing::info;

use crate::{
    authentication::AuthUser,
    data_formats::{
        DocumentList, FormFields, ListUsersParams, PostResponse, StatusWrapper, UserResponse,
        UserWrapper,
    },
    db_helpers::{
        delete_user_cascade_in_db, get_user_by_id, list_user_posts_in_db, list_users_in_db,
        update_user_in_db, UserChanges,
    },
    errors::RequestError,
    models::Role,
    storage::{delete_file_best_effort, FileStorage},
};

use super::{settle_image, stage_image, JsonResult};

type UserJson = UserWrapper<UserResponse>;

// ----------------- User Handlers -----------------
pub async fn list_users(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: AuthUser,
    Query(ListUsersParams { limit }): Query<ListUsersParams>,
) -> JsonResult<DocumentList<UserResponse>> {
    let users = list_users_in_db(&pool, limit).await?;
    Ok(Json(
        users
            .into_iter()
            .map(UserResponse::new)
            .collect::<Vec<_>>()
            .into(),
    ))
}

pub async fn get_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<UserJson> {
    match get_user_by_id(&pool, id).await? {
        Some(user) => Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
            user,
        )))),
        None => Err(RequestError::NotFound("User not found")),
    }
}

pub async fn list_user_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<DocumentList<PostResponse>> {
    let posts = list_user_posts_in_db(&pool, id).await?;
    Ok(Json(
        posts
            .into_iter()
            .map(PostResponse::new)
            .collect::<Vec<_>>()
            .into(),
    ))
}

/// Profile edit: name, bio and an optional new image, for the caller's own account.
pub async fn update_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(storage): Extension<Arc<FileStorage>>,
    user: AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> JsonResult<UserJson> {
    if user.id != id {
        return Err(RequestError::Forbidden);
    }
    let form = FormFields::read(multipart).await?;
    let changes = UserChanges {
        name: Some(form.require("name")?.trim().to_owned()),
        bio: Some(form.get("bio").unwrap_or_default().to_owned()),
        ..Default::default()
    };
    apply_user_changes(&pool, &storage, user.id, id, changes, form).await
}

/// Admin edit: name, bio, email, role and an optional new image, for any account.
pub async fn admin_update_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(storage): Extension<Arc<FileStorage>>,
    user: AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> JsonResult<UserJson> {
    user.require_admin(&pool).await?;
    let form = FormFields::read(multipart).await?;
    let role = match form.optional("role") {
        Some(role) => Some(
            Role::parse(&role)
                .ok_or_else(|| RequestError::BadRequest(format!("Unknown role {role}")))?,
        ),
        None => None,
    };
    let changes = UserChanges {
        name: form.optional("name"),
        bio: form.get("bio").map(str::to_owned),
        email: form.optional("email"),
        role,
        ..Default::default()
    };
    apply_user_changes(&pool, &storage, user.id, id, changes, form).await
}

async fn apply_user_changes(
    pool: &SqlitePool,
    storage: &FileStorage,
    uploader: i64,
    id: i64,
    mut changes: UserChanges,
    mut form: FormFields,
) -> JsonResult<UserJson> {
    let previous = get_user_by_id(pool, id)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;

    let staged = stage_image(pool, storage, uploader, form.take_file()).await?;
    if let Some(file) = &staged {
        changes.image_url = Some(storage.preview_url(&file.id));
        changes.image_id = Some(file.id.clone());
    }

    let outcome = update_user_in_db(pool, id, changes).await.map_err(|e| {
        if e.is_unique_violation() {
            return RequestError::RunTimeError("Email already exists");
        }
        e
    });
    let updated = settle_image(
        pool,
        storage,
        staged.as_ref(),
        previous.image_id.as_deref(),
        outcome,
    )
    .await?;
    info!("Updated user {}", updated.id);
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        updated,
    ))))
}

pub async fn admin_delete_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(storage): Extension<Arc<FileStorage>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<StatusWrapper> {
    user.require_admin(&pool).await?;
    let image_ids = delete_user_cascade_in_db(&pool, id).await?;
    for image_id in image_ids {
        delete_file_best_effort(&pool, &storage, &image_id).await;
    }
    Ok(Json(StatusWrapper::ok()))
}
