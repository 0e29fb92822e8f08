use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct UserWrapper<T> {
    pub user: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SessionWrapper<T> {
    pub session: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostWrapper<T> {
    pub post: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EventWrapper<T> {
    pub event: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MessageWrapper<T> {
    pub message: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FileWrapper<T> {
    pub file: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SaveWrapper<T> {
    pub save: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StatusWrapper {
    pub status: String,
}

/// A list of documents together with its length.
#[derive(Debug, Deserialize, Serialize)]
pub struct DocumentList<T> {
    pub total: usize,
    pub documents: Vec<T>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DocumentPage<T> {
    pub documents: Vec<T>,
    #[serde(rename = "nextCursor")]
    pub next_cursor: Option<i64>,
}

impl<T> UserWrapper<T> {
    pub fn wrap_with_user_data(request: T) -> UserWrapper<T> {
        UserWrapper { user: request }
    }
}

impl<T> From<Vec<T>> for DocumentList<T> {
    fn from(documents: Vec<T>) -> Self {
        DocumentList {
            total: documents.len(),
            documents,
        }
    }
}

impl StatusWrapper {
    pub fn ok() -> Self {
        StatusWrapper {
            status: "Ok".to_owned(),
        }
    }
}
