use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::User};

mod event_helpers;
mod file_helpers;
mod message_helpers;
mod post_helpers;
mod save_helpers;
mod session_helpers;
mod user_helpers;

pub use event_helpers::*;
pub use file_helpers::*;
pub use message_helpers::*;
pub use post_helpers::*;
pub use save_helpers::*;
pub use session_helpers::*;
pub use user_helpers::*;

/// Builds `column = $n` assignments for the fields that are present.
struct QueryBuilder {
    query: String,
    params: Vec<String>,
    seperator: &'static str,
}

impl QueryBuilder {
    fn new(initial: &str, seperator: &'static str) -> Self {
        Self {
            query: initial.to_owned(),
            params: vec![],
            seperator,
        }
    }

    fn add_param(mut self, column: &str, param: Option<String>) -> Self {
        if let Some(value) = param {
            if !self.params.is_empty() {
                self.query.push_str(self.seperator);
            }
            self.params.push(value);
            self.query
                .push_str(&format!("{} = ${}", column, self.params.len()));
        }
        self
    }

    fn next_placeholder(&self) -> usize {
        self.params.len() + 1
    }

    /// Returns None when no field was added.
    fn build(self) -> Option<(String, Vec<String>)> {
        if self.params.is_empty() {
            None
        } else {
            Some((self.query, self.params))
        }
    }
}

// ----------------- Helper Functions -----------------

const USER_COLUMNS: &str =
    "id, name, username, email, password, image_url, image_id, bio, role, created_at";

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

/// Escapes LIKE wildcards so a search term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_assignments_for_present_fields_only() {
        let (query, params) = QueryBuilder::new("UPDATE users SET ", ", ")
            .add_param("name", Some("Ada".to_owned()))
            .add_param("bio", None)
            .add_param("role", Some("admin".to_owned()))
            .build()
            .unwrap();
        assert_eq!(query, "UPDATE users SET name = $1, role = $2");
        assert_eq!(params, vec!["Ada", "admin"]);
    }

    #[test]
    fn empty_builder_builds_nothing() {
        let builder = QueryBuilder::new("UPDATE users SET ", ", ").add_param("bio", None);
        assert_eq!(builder.next_placeholder(), 1);
        assert!(builder.build().is_none());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
