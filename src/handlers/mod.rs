use axum::{
    http::{StatusCode, Uri},
    Json,
};
use sqlx::SqlitePool;

use crate::{
    db_helpers::get_user_by_id,
    errors::RequestError,
    models::{Role, StoredFile},
    storage::{delete_file_best_effort, upload_file, FileStorage, Upload},
};

mod account_handlers;
mod event_handlers;
mod file_handlers;
mod message_handlers;
mod post_handlers;
mod user_handlers;

pub use account_handlers::*;
pub use event_handlers::*;
pub use file_handlers::*;
pub use message_handlers::*;
pub use post_handlers::*;
pub use user_handlers::*;

type JsonResult<T> = Result<Json<T>, RequestError>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

// ----------------- Shared Helpers -----------------

async fn is_admin(pool: &SqlitePool, id: i64) -> Result<bool, RequestError> {
    Ok(get_user_by_id(pool, id)
        .await?
        .map(|user| user.role == Role::Admin)
        .unwrap_or(false))
}

/// Uploads a replacement image before the document that will reference it is written.
async fn stage_image(
    pool: &SqlitePool,
    storage: &FileStorage,
    owner_id: i64,
    file: Option<Upload>,
) -> Result<Option<StoredFile>, RequestError> {
    match file {
        Some(file) => Ok(Some(upload_file(pool, storage, Some(owner_id), &file).await?)),
        None => Ok(None),
    }
}

/// Settles a staged image once the document write has finished. A failed write
/// drops the new file; a successful one drops the file it replaced.
async fn settle_image<T>(
    pool: &SqlitePool,
    storage: &FileStorage,
    staged: Option<&StoredFile>,
    previous_id: Option<&str>,
    outcome: Result<T, RequestError>,
) -> Result<T, RequestError> {
    match (&outcome, staged) {
        (Err(_), Some(staged)) => delete_file_best_effort(pool, storage, &staged.id).await,
        (Ok(_), Some(staged)) => {
            if let Some(previous) = previous_id.filter(|previous| *previous != staged.id) {
                delete_file_best_effort(pool, storage, previous).await;
            }
        }
        (_, None) => {}
    }
    outcome
}
