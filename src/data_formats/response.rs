use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    models::{CalendarEvent, Message, Post, Role, SavedPost, StoredFile, User},
    storage::FileStorage,
};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub image_id: Option<String>,
    pub bio: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreatorResponse {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub image_url: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i64,
    pub creator: CreatorResponse,
    pub caption: String,
    pub image_url: String,
    pub image_id: String,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub likes: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SavedPostResponse {
    pub id: i64,
    pub user: i64,
    pub post: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EventResponse {
    pub id: i64,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: i64,
    pub view_url: String,
    pub preview_url: String,
}

impl UserResponse {
    pub fn new(
        User {
            id,
            name,
            username,
            email,
            image_url,
            image_id,
            bio,
            role,
            created_at,
            ..
        }: User,
    ) -> Self {
        UserResponse {
            id,
            name,
            username,
            email,
            image_url,
            image_id,
            bio,
            role,
            created_at,
        }
    }
}

impl PostResponse {
    pub fn new(
        Post {
            id,
            creator_id,
            caption,
            image_url,
            image_id,
            location,
            tags,
            likes,
            created_at,
            updated_at,
            creator_name,
            creator_username,
            creator_image_url,
        }: Post,
    ) -> Self {
        PostResponse {
            id,
            creator: CreatorResponse {
                id: creator_id,
                name: creator_name,
                username: creator_username,
                image_url: creator_image_url,
            },
            caption,
            image_url,
            image_id,
            location,
            tags: tags.0,
            likes: likes.0,
            created_at,
            updated_at,
        }
    }
}

impl From<SavedPost> for SavedPostResponse {
    fn from(save: SavedPost) -> Self {
        SavedPostResponse {
            id: save.id,
            user: save.user_id,
            post: save.post_id,
            created_at: save.created_at,
        }
    }
}

impl From<CalendarEvent> for EventResponse {
    fn from(event: CalendarEvent) -> Self {
        EventResponse {
            id: event.id,
            title: event.title,
            start: event.starts_at,
            end: event.ends_at,
        }
    }
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        MessageResponse {
            id: message.id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            message: message.message,
            timestamp: message.timestamp,
        }
    }
}

impl FileResponse {
    pub fn new(file: StoredFile, storage: &FileStorage) -> Self {
        FileResponse {
            view_url: storage.view_url(&file.id),
            preview_url: storage.preview_url(&file.id),
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            size: file.size,
        }
    }
}
