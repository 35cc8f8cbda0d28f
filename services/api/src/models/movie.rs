//! Movie models for the API service

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Movie record as returned by the API, joined to its owner's display name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub year: i32,
    pub genre: Option<String>,
    pub poster: Option<String>,
    pub user_id: Option<i32>,
    pub created_by: Option<String>,
}

/// Payload for creating or replacing a movie
#[derive(Debug, Clone, Deserialize)]
pub struct MovieInput {
    pub title: String,
    pub year: i32,
    pub genre: Option<String>,
    pub poster: Option<String>,
}

/// Query parameters for the movie listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieQuery {
    /// Case-insensitive substring filter over title or genre
    pub search: Option<String>,
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
}

impl MovieQuery {
    /// Page number clamped to at least 1
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size clamped to [1, 100]
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }
}

/// Pagination metadata for the listing envelope
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    pub total: i64,
    pub page: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl ListMeta {
    /// Build the metadata for a page of `limit` items out of `total` matches
    pub fn new(total: i64, page: u32, limit: u32) -> Self {
        let total_pages = (total as u64).div_ceil(limit as u64) as u32;

        ListMeta {
            total,
            page,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// Response envelope for the movie listing
#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub data: Vec<Movie>,
    pub meta: ListMeta,
}
