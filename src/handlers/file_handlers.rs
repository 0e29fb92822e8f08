use std::sync::Arc;

use axum::{
    extract::{Multipart, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::{
    authentication::AuthUser,
    data_formats::{FileResponse, FileWrapper, FormFields, StatusWrapper},
    db_helpers::get_file_record_in_db,
    errors::RequestError,
    storage::{delete_file, upload_file, FileStorage},
};

use super::{is_admin, JsonResult};

// ----------------- Storage Handlers -----------------
pub async fn create_file(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(storage): Extension<Arc<FileStorage>>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<FileWrapper<FileResponse>>), RequestError> {
    let mut form = FormFields::read(multipart).await?;
    let upload = form
        .take_file()
        .ok_or_else(|| RequestError::BadRequest("file is required".to_owned()))?;
    let file = upload_file(&pool, &storage, Some(user.id), &upload).await?;
    Ok((
        StatusCode::CREATED,
        Json(FileWrapper {
            file: FileResponse::new(file, &storage),
        }),
    ))
}

pub async fn view_file(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(storage): Extension<Arc<FileStorage>>,
    Path(id): Path<String>,
) -> Result<Response, RequestError> {
    serve_file(&pool, &storage, &id).await
}

/// Serves the stored bytes unchanged; the crop and quality parameters are accepted but not applied.
pub async fn preview_file(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(storage): Extension<Arc<FileStorage>>,
    Path(id): Path<String>,
) -> Result<Response, RequestError> {
    serve_file(&pool, &storage, &id).await
}

async fn serve_file(
    pool: &SqlitePool,
    storage: &FileStorage,
    id: &str,
) -> Result<Response, RequestError> {
    let record = get_file_record_in_db(pool, id)
        .await?
        .ok_or(RequestError::NotFound("File not found"))?;
    let bytes = storage
        .read(id)
        .await?
        .ok_or(RequestError::NotFound("File not found"))?;
    Ok(([(header::CONTENT_TYPE, record.mime_type)], bytes).into_response())
}

pub async fn remove_file(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(storage): Extension<Arc<FileStorage>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> JsonResult<StatusWrapper> {
    let record = get_file_record_in_db(&pool, &id)
        .await?
        .ok_or(RequestError::NotFound("File not found"))?;
    if record.owner_id != Some(user.id) && !is_admin(&pool, user.id).await? {
        return Err(RequestError::Forbidden);
    }
    delete_file(&pool, &storage, &id).await?;
    Ok(Json(StatusWrapper::ok()))
}
