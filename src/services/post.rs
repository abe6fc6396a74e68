//! Post service
//!
//! Post CRUD plus media cleanup: deleting a post removes its stored image
//! file, and deleting an author's account removes the image of every post
//! about to cascade away. The shared placeholder image is never deleted.

use crate::config::MediaConfig;
use crate::db::repositories::PostRepository;
use crate::models::{CreatePostInput, PagedResult, Post, PostWithMeta, UpdatePostInput};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Post not found
    #[error("Post not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Post service
pub struct PostService {
    repo: Arc<dyn PostRepository>,
    media: MediaConfig,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>, media: MediaConfig) -> Self {
        Self { repo, media }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Post>> {
        self.repo.get_by_id(id).await
    }

    pub async fn get_with_meta(&self, id: i64) -> Result<Option<PostWithMeta>> {
        self.repo.get_with_meta(id).await
    }

    /// Active posts for the public front page, newest publication first.
    pub async fn list_active(&self, page: i64, page_size: i64) -> Result<PagedResult<PostWithMeta>> {
        let (items, total) = self.repo.list_active(page, page_size).await?;
        Ok(PagedResult::new(items, total, page, page_size))
    }

    /// All posts of one author for the management screen.
    pub async fn list_by_author(
        &self,
        author_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<PagedResult<PostWithMeta>> {
        let (items, total) = self.repo.list_by_author(author_id, page, page_size).await?;
        Ok(PagedResult::new(items, total, page, page_size))
    }

    /// Active posts of one category.
    pub async fn list_by_category(
        &self,
        category_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<PagedResult<PostWithMeta>> {
        let (items, total) = self
            .repo
            .list_by_category(category_id, page, page_size)
            .await?;
        Ok(PagedResult::new(items, total, page, page_size))
    }

    /// Create a post owned by `author_id`.
    pub async fn create(
        &self,
        author_id: i64,
        input: CreatePostInput,
    ) -> Result<Post, PostServiceError> {
        validate_text(&input.title, &input.body)?;

        let mut post = Post::new(author_id, input.title, input.body);
        post.subtitle = input.subtitle;
        post.image = input.image;
        post.category_id = input.category_id;
        post.active = input.active;
        if let Some(published_at) = input.published_at {
            post.published_at = published_at;
        }

        let created = self
            .repo
            .create(&post)
            .await
            .context("Failed to create post")?;
        tracing::info!(post = created.id, author = author_id, "created post");
        Ok(created)
    }

    /// Update a post in place. Creation time and author never change.
    pub async fn update(
        &self,
        post: &Post,
        input: UpdatePostInput,
    ) -> Result<Post, PostServiceError> {
        validate_text(&input.title, &input.body)?;

        let mut updated = post.clone();
        updated.title = input.title;
        updated.subtitle = input.subtitle;
        updated.body = input.body;
        updated.image = input.image;
        updated.category_id = input.category_id;
        updated.active = input.active;
        if let Some(published_at) = input.published_at {
            updated.published_at = published_at;
        }

        self.repo
            .update(&updated)
            .await
            .context("Failed to update post")?;
        Ok(updated)
    }

    /// Delete a post along with its stored image; comments cascade.
    pub async fn delete(&self, post: &Post) -> Result<(), PostServiceError> {
        self.repo
            .delete(post.id)
            .await
            .context("Failed to delete post")?;

        if let Some(image) = &post.image {
            self.remove_image(image).await;
        }
        tracing::info!(post = post.id, "deleted post");
        Ok(())
    }

    /// Remove the stored images of every post the author owns. Called
    /// right before an account deletion cascades the rows away.
    pub async fn purge_author_media(&self, author_id: i64) -> Result<()> {
        let images = self.repo.images_by_author(author_id).await?;
        for image in images {
            self.remove_image(&image).await;
        }
        Ok(())
    }

    /// Delete one stored image unless it is the shared placeholder.
    /// Missing files are logged, not raised: the row deletion has already
    /// happened and must stand.
    async fn remove_image(&self, image: &str) {
        if image == self.media.post_placeholder {
            return;
        }
        let path: PathBuf = [self.media.root.as_str(), image].iter().collect();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!("removed image {:?}", path),
            Err(e) => tracing::warn!("could not remove image {:?}: {}", path, e),
        }
    }
}

fn validate_text(title: &str, body: &str) -> Result<(), PostServiceError> {
    if title.trim().is_empty() {
        return Err(PostServiceError::ValidationError(
            "Title must not be empty".to_string(),
        ));
    }
    if body.trim().is_empty() {
        return Err(PostServiceError::ValidationError(
            "Body must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxPostRepository, SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::User;
    use chrono::NaiveDate;

    async fn setup(media_root: &str) -> (PostService, i64) {
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

        let media = MediaConfig {
            root: media_root.to_string(),
            ..MediaConfig::default()
        };
        (
            PostService::new(SqlxPostRepository::boxed(pool), media),
            author.id,
        )
    }

    fn input(title: &str) -> CreatePostInput {
        CreatePostInput {
            title: title.to_string(),
            subtitle: None,
            body: "Body".to_string(),
            image: None,
            category_id: None,
            active: true,
            published_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title_and_body() {
        let (service, author_id) = setup("media").await;

        let err = service.create(author_id, input("  ")).await.unwrap_err();
        assert!(matches!(err, PostServiceError::ValidationError(_)));

        let mut no_body = input("Title");
        no_body.body = String::new();
        let err = service.create(author_id, no_body).await.unwrap_err();
        assert!(matches!(err, PostServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_stored_image() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let (service, author_id) = setup(&root).await;

        std::fs::create_dir_all(dir.path().join("posts")).unwrap();
        let image_path = dir.path().join("posts/pic.png");
        std::fs::write(&image_path, b"png").unwrap();

        let mut with_image = input("Pic");
        with_image.image = Some("posts/pic.png".to_string());
        let post = service.create(author_id, with_image).await.unwrap();

        service.delete(&post).await.unwrap();
        assert!(!image_path.exists());
        assert!(service.get(post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_keeps_placeholder_image() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let (service, author_id) = setup(&root).await;

        std::fs::create_dir_all(dir.path().join("posts")).unwrap();
        let placeholder = dir.path().join("posts/post_default.png");
        std::fs::write(&placeholder, b"png").unwrap();

        let mut with_placeholder = input("Default");
        with_placeholder.image = Some("posts/post_default.png".to_string());
        let post = service.create(author_id, with_placeholder).await.unwrap();

        service.delete(&post).await.unwrap();
        assert!(placeholder.exists());
    }

    #[tokio::test]
    async fn test_purge_author_media_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let (service, author_id) = setup(&root).await;

        std::fs::create_dir_all(dir.path().join("posts")).unwrap();
        let image_path = dir.path().join("posts/mine.png");
        std::fs::write(&image_path, b"png").unwrap();

        let mut with_image = input("Mine");
        with_image.image = Some("posts/mine.png".to_string());
        service.create(author_id, with_image).await.unwrap();

        service.purge_author_media(author_id).await.unwrap();
        assert!(!image_path.exists());
    }

    #[tokio::test]
    async fn test_update_applies_published_at() {
        let (service, author_id) = setup("media").await;
        let post = service.create(author_id, input("Post")).await.unwrap();

        let later = post.published_at + chrono::Duration::days(3);
        let updated = service
            .update(
                &post,
                UpdatePostInput {
                    title: "Post".to_string(),
                    subtitle: Some("Sub".to_string()),
                    body: "Body".to_string(),
                    image: None,
                    category_id: None,
                    active: false,
                    published_at: Some(later),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.published_at, later);
        assert!(!updated.active);
        assert_eq!(updated.created_at, post.created_at);
        assert_eq!(updated.author_id, post.author_id);
    }
}
