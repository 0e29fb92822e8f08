use std::path::{Path, PathBuf};

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    authentication::generate_id,
    db_helpers::{delete_file_record_in_db, insert_file_record_in_db},
    errors::RequestError,
    models::StoredFile,
};

pub const PREVIEW_WIDTH: u32 = 2000;
pub const PREVIEW_HEIGHT: u32 = 2000;
pub const PREVIEW_GRAVITY: &str = "top";
pub const PREVIEW_QUALITY: u32 = 100;

const FILE_ID_LEN: usize = 20;

/// A file received in a multipart body, not yet persisted.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Bytes on disk under `dir`, one file per id.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    public_url: String,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_url: public_url.into(),
        }
    }

    pub async fn init(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        info!("File storage ready at {}", self.dir.display());
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    // Ids are generated alphanumerics; anything else never touches the disk.
    fn path_for(&self, id: &str) -> Option<PathBuf> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(self.dir.join(id))
    }

    pub fn preview_url(&self, id: &str) -> String {
        format!(
            "{}/storage/files/{}/preview?width={}&height={}&gravity={}&quality={}",
            self.public_url, id, PREVIEW_WIDTH, PREVIEW_HEIGHT, PREVIEW_GRAVITY, PREVIEW_QUALITY
        )
    }

    pub fn view_url(&self, id: &str) -> String {
        format!("{}/storage/files/{}/view", self.public_url, id)
    }

    pub async fn read(&self, id: &str) -> Result<Option<Vec<u8>>, RequestError> {
        let Some(path) = self.path_for(id) else {
            return Ok(None);
        };
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, id: &str, bytes: &[u8]) -> Result<(), RequestError> {
        let path = self.path_for(id).ok_or(RequestError::ServerError)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), RequestError> {
        let Some(path) = self.path_for(id) else {
            return Ok(());
        };
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Writes the bytes, then the file document. A failed insert removes the bytes again.
pub async fn upload_file(
    pool: &SqlitePool,
    storage: &FileStorage,
    owner_id: Option<i64>,
    upload: &Upload,
) -> Result<StoredFile, RequestError> {
    let id = generate_id(FILE_ID_LEN);
    storage.write(&id, &upload.bytes).await?;
    match insert_file_record_in_db(pool, &id, owner_id, upload).await {
        Ok(file) => {
            info!("Stored file {} ({} bytes)", file.id, file.size);
            Ok(file)
        }
        Err(e) => {
            if let Err(cleanup) = storage.remove(&id).await {
                warn!("Could not remove orphaned file {}: {:?}", id, cleanup);
            }
            Err(e)
        }
    }
}

pub async fn delete_file(
    pool: &SqlitePool,
    storage: &FileStorage,
    id: &str,
) -> Result<(), RequestError> {
    delete_file_record_in_db(pool, id).await?;
    storage.remove(id).await?;
    info!("Deleted file {}", id);
    Ok(())
}

/// Compensating deletes never fail the request that triggered them.
pub async fn delete_file_best_effort(pool: &SqlitePool, storage: &FileStorage, id: &str) {
    if let Err(e) = delete_file(pool, storage, id).await {
        warn!("Best-effort delete of file {} failed: {:?}", id, e);
    }
}
