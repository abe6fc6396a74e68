//! Comment service

use crate::db::repositories::CommentRepository;
use crate::models::{Comment, CommentWithAuthor};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Comment not found
    #[error("Comment not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Comment>> {
        self.repo.get_by_id(id).await
    }

    /// A post's comments, newest first.
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
        self.repo.list_for_post(post_id).await
    }

    /// Create a comment by `author_id` on `post_id`.
    pub async fn create(
        &self,
        post_id: i64,
        author_id: i64,
        body: &str,
    ) -> Result<Comment, CommentServiceError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(CommentServiceError::ValidationError(
                "Comment must not be empty".to_string(),
            ));
        }

        let created = self
            .repo
            .create(&Comment::new(post_id, author_id, body.to_string()))
            .await
            .context("Failed to create comment")?;
        Ok(created)
    }

    /// Replace a comment's body.
    pub async fn update(&self, comment: &Comment, body: &str) -> Result<Comment, CommentServiceError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(CommentServiceError::ValidationError(
                "Comment must not be empty".to_string(),
            ));
        }

        let mut updated = comment.clone();
        updated.body = body.to_string();
        self.repo
            .update(&updated)
            .await
            .context("Failed to update comment")?;
        Ok(updated)
    }

    /// Delete a comment.
    pub async fn delete(&self, id: i64) -> Result<(), CommentServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to look up comment")?
            .ok_or(CommentServiceError::NotFound)?;

        self.repo
            .delete(id)
            .await
            .context("Failed to delete comment")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        PostRepository, SqlxCommentRepository, SqlxPostRepository, SqlxUserRepository,
        UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Post, User};
    use chrono::NaiveDate;

    async fn setup() -> (CommentService, i64, i64) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let users = SqlxUserRepository::new(pool.clone());
        let author = users
            .create(&User::new(
                "ana".to_string(),
                "ana@example.com".to_string(),
                "hash".to_string(),
                "Ana".to_string(),
                "García".to_string(),
                NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            ))
            .await
            .unwrap();

        let posts = SqlxPostRepository::new(pool.clone());
        let post = posts
            .create(&Post::new(author.id, "Post".to_string(), "Body".to_string()))
            .await
            .unwrap();

        (
            CommentService::new(SqlxCommentRepository::boxed(pool)),
            post.id,
            author.id,
        )
    }

    #[tokio::test]
    async fn test_create_trims_and_validates_body() {
        let (service, post_id, author_id) = setup().await;

        let comment = service.create(post_id, author_id, "  hi  ").await.unwrap();
        assert_eq!(comment.body, "hi");

        let err = service.create(post_id, author_id, "   ").await.unwrap_err();
        assert!(matches!(err, CommentServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_update_replaces_body() {
        let (service, post_id, author_id) = setup().await;
        let comment = service.create(post_id, author_id, "Typo").await.unwrap();

        let updated = service.update(&comment, "Fixed").await.unwrap();
        assert_eq!(updated.body, "Fixed");
        assert_eq!(updated.created_at, comment.created_at);
    }

    #[tokio::test]
    async fn test_delete_missing_returns_not_found() {
        let (service, _, _) = setup().await;
        let err = service.delete(999).await.unwrap_err();
        assert!(matches!(err, CommentServiceError::NotFound));
    }
}
