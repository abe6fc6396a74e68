//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity attached to a post.
///
/// Deleting the post or the author cascades to the comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier
    pub id: i64,
    /// Owning post
    pub post_id: i64,
    /// Owning author
    pub author_id: i64,
    /// Body text
    pub body: String,
    /// Creation timestamp (immutable)
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new Comment. The ID is assigned by the database.
    pub fn new(post_id: i64, author_id: i64, body: String) -> Self {
        Self {
            id: 0,
            post_id,
            author_id,
            body,
            created_at: Utc::now(),
        }
    }
}

/// Comment joined with the author's username for display
#[derive(Debug, Clone, Serialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_new() {
        let comment = Comment::new(3, 9, "Nice write-up".to_string());
        assert_eq!(comment.id, 0);
        assert_eq!(comment.post_id, 3);
        assert_eq!(comment.author_id, 9);
    }
}
