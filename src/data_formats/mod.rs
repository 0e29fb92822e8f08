mod multipart;
mod request;
mod response;
mod wrapper;

pub use multipart::*;
pub use request::*;
pub use response::*;
pub use wrapper::*;

use serde::{Deserialize, Serialize};

pub const RECENT_POSTS_LIMIT: i64 = 20;
pub const INFINITE_POSTS_PAGE: i64 = 9;

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct ListUsersParams {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// `cursor` is the id of the last post the caller has already seen.
#[derive(Deserialize, Serialize, Debug)]
pub struct InfinitePostsParams {
    #[serde(default)]
    pub cursor: Option<i64>,
    #[serde(default = "get_default_page_size")]
    pub limit: i64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct SearchParams {
    #[serde(rename = "searchTerm", alias = "q")]
    pub search_term: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct AvatarParams {
    #[serde(default)]
    pub name: String,
}

fn get_default_page_size() -> i64 {
    INFINITE_POSTS_PAGE
}

/// Removes every space and splits on commas, dropping empty entries.
pub fn parse_tags(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(raw) => raw
            .replace(' ', "")
            .split(',')
            .filter(|tag| !tag.is_empty())
            .map(str::to_owned)
            .collect(),
        None => vec![],
    }
}
