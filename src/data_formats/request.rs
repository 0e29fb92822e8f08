use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ----------------- Account Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub username: String,
}

// ----------------- Post Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct LikesRequest {
    pub likes: Vec<i64>,
}

// ----------------- Event Request -----------------
/// Create and update both carry the complete event.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct EventRequest {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

// ----------------- Message Request -----------------
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: i64,
    pub message: String,
}
