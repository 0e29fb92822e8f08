use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::{error, warn};

use crate::JsonResponse;

#[derive(Debug)]
pub enum RequestError {
    NotFound(&'static str),
    NotAuthorized(&'static str),
    Forbidden,
    BadRequest(String),
    RunTimeError(&'static str),
    ServerError,
    DatabaseError(sqlx::Error),
    StorageError(std::io::Error),
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct RequestErrorJsonWrapper {
    pub errors: RequestErrorJson,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct RequestErrorJson {
    pub body: Vec<String>,
}

impl RequestErrorJsonWrapper {
    pub fn new(error: &str) -> RequestErrorJsonWrapper {
        RequestErrorJsonWrapper {
            errors: RequestErrorJson {
                body: vec![error.to_string()],
            },
        }
    }
}

impl From<sqlx::Error> for RequestError {
    fn from(value: sqlx::Error) -> Self {
        Self::DatabaseError(value)
    }
}

impl From<std::io::Error> for RequestError {
    fn from(value: std::io::Error) -> Self {
        Self::StorageError(value)
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        self.to_json_response().into_response()
    }
}

impl RequestError {
    /// True when the underlying database error is a UNIQUE violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            RequestError::DatabaseError(sqlx::Error::Database(e)) => {
                e.message().contains("UNIQUE constraint failed")
            }
            _ => false,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::NotAuthorized(_) => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden => StatusCode::FORBIDDEN,
            RequestError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RequestError::RunTimeError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RequestError::ServerError
            | RequestError::DatabaseError(_)
            | RequestError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_json_response(&self) -> JsonResponse<RequestErrorJsonWrapper> {
        let json = match self {
            RequestError::NotFound(message)
            | RequestError::NotAuthorized(message)
            | RequestError::RunTimeError(message) => {
                warn!("Request rejected: {}", message);
                RequestErrorJsonWrapper::new(message)
            }
            RequestError::Forbidden => {
                warn!("Request rejected: forbidden");
                RequestErrorJsonWrapper::new("Forbidden")
            }
            RequestError::BadRequest(message) => {
                warn!("Bad request: {}", message);
                RequestErrorJsonWrapper::new(message)
            }
            RequestError::ServerError => RequestErrorJsonWrapper::new("Internal Server Error"),
            RequestError::DatabaseError(e) => {
                error!("Database error: {}", e);
                RequestErrorJsonWrapper::new("Internal Server Error")
            }
            RequestError::StorageError(e) => {
                error!("Storage error: {}", e);
                RequestErrorJsonWrapper::new("Internal Server Error")
            }
        };
        (self.status_code(), Json(json))
    }
}
