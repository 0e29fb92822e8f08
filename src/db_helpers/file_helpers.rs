use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::StoredFile, storage::Upload};

const FILE_COLUMNS: &str = "id, owner_id, name, mime_type, size, created_at";

pub async fn insert_file_record_in_db(
    pool: &SqlitePool,
    id: &str,
    owner_id: Option<i64>,
    upload: &Upload,
) -> Result<StoredFile, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        r#"
        INSERT INTO files (id, owner_id, name, mime_type, size, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {FILE_COLUMNS}
        "#
    );
    let file = sqlx::query_as::<Sqlite, StoredFile>(&query)
        .bind(id)
        .bind(owner_id)
        .bind(&upload.name)
        .bind(&upload.mime_type)
        .bind(upload.bytes.len() as i64)
        .bind(Utc::now())
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(file)
}

pub async fn get_file_record_in_db(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<StoredFile>, RequestError> {
    let query = format!("SELECT {FILE_COLUMNS} FROM files WHERE id = $1");
    let file = sqlx::query_as::<Sqlite, StoredFile>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(file)
}

pub async fn delete_file_record_in_db(pool: &SqlitePool, id: &str) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM files WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("File not found"));
    }
    tx.commit().await?;
    Ok(())
}
