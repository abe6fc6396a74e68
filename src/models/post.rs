//! Post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity written by a collaborator.
///
/// `created_at` is immutable and set on insert; `published_at` is mutable,
/// defaults to the creation time, and drives the descending sort order of
/// every listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Title
    pub title: String,
    /// Optional subtitle
    pub subtitle: Option<String>,
    /// Body text
    pub body: String,
    /// Image path relative to the media root; a shared placeholder is shown
    /// when absent
    pub image: Option<String>,
    /// Creation timestamp (immutable)
    pub created_at: DateTime<Utc>,
    /// Publication timestamp, drives sort order
    pub published_at: DateTime<Utc>,
    /// Whether the post is publicly visible
    pub active: bool,
    /// Owning category; null when the category was deleted
    pub category_id: Option<i64>,
    /// Owning author
    pub author_id: i64,
}

impl Post {
    /// Create a new Post owned by `author_id`. The ID is assigned by the
    /// database; `published_at` starts equal to `created_at`.
    pub fn new(author_id: i64, title: String, body: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title,
            subtitle: None,
            body,
            image: None,
            created_at: now,
            published_at: now,
            active: true,
            category_id: None,
            author_id,
        }
    }
}

/// Post joined with display metadata for templates
#[derive(Debug, Clone, Serialize)]
pub struct PostWithMeta {
    #[serde(flatten)]
    pub post: Post,
    /// Author username
    pub author_username: String,
    /// Category name, if any
    pub category_name: Option<String>,
}

/// Input for creating a post
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    pub title: String,
    pub subtitle: Option<String>,
    pub body: String,
    pub image: Option<String>,
    pub category_id: Option<i64>,
    pub active: bool,
    /// Publication time; defaults to now when absent
    pub published_at: Option<DateTime<Utc>>,
}

/// Input for updating a post. `created_at` and `author_id` never change.
#[derive(Debug, Clone)]
pub struct UpdatePostInput {
    pub title: String,
    pub subtitle: Option<String>,
    pub body: String,
    pub image: Option<String>,
    pub category_id: Option<i64>,
    pub active: bool,
    pub published_at: Option<DateTime<Utc>>,
}

/// A page of results plus pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if total == 0 {
            1
        } else {
            (total + page_size - 1) / page_size
        };
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}
