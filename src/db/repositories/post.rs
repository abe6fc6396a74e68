//! Post repository
//!
//! All listings are ordered by `published_at` descending. Joined author
//! and category names are fetched in the same query so templates never
//! trigger per-row lookups.

use crate::models::{Post, PostWithMeta};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post
    async fn create(&self, post: &Post) -> Result<Post>;

    /// Get post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Get post by ID with author and category names
    async fn get_with_meta(&self, id: i64) -> Result<Option<PostWithMeta>>;

    /// List active posts, newest publication first
    async fn list_active(&self, page: i64, page_size: i64) -> Result<(Vec<PostWithMeta>, i64)>;

    /// List all posts of one author, newest publication first
    async fn list_by_author(
        &self,
        author_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<PostWithMeta>, i64)>;

    /// List active posts of one category, newest publication first
    async fn list_by_category(
        &self,
        category_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<PostWithMeta>, i64)>;

    /// Update a post; `created_at` and `author_id` are never touched
    async fn update(&self, post: &Post) -> Result<()>;

    /// Delete a post; comments cascade
    async fn delete(&self, id: i64) -> Result<()>;

    /// Image paths of every post owned by the author
    async fn images_by_author(&self, author_id: i64) -> Result<Vec<String>>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: SqlitePool,
}

impl SqlxPostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }

    async fn list_where(
        &self,
        condition: &str,
        bind: Option<i64>,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<PostWithMeta>, i64)> {
        let offset = (page - 1) * page_size;

        let count_sql = format!("SELECT COUNT(*) FROM posts p WHERE {}", condition);
        let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
        if let Some(value) = bind {
            count_query = count_query.bind(value);
        }
        let (total,) = count_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts")?;

        let list_sql = format!(
            r#"
            SELECT p.id, p.title, p.subtitle, p.body, p.image, p.created_at,
                   p.published_at, p.active, p.category_id, p.author_id,
                   u.username AS author_username, c.name AS category_name
            FROM posts p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE {}
            ORDER BY p.published_at DESC
            LIMIT ? OFFSET ?
            "#,
            condition
        );
        let mut list_query = sqlx::query(&list_sql);
        if let Some(value) = bind {
            list_query = list_query.bind(value);
        }
        let rows = list_query
            .bind(page_size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list posts")?;

        let posts = rows.iter().map(row_to_post_with_meta).collect();
        Ok((posts, total))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post) -> Result<Post> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts
                (title, subtitle, body, image, created_at, published_at,
                 active, category_id, author_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.title)
        .bind(&post.subtitle)
        .bind(&post.body)
        .bind(&post.image)
        .bind(post.created_at)
        .bind(post.published_at)
        .bind(post.active)
        .bind(post.category_id)
        .bind(post.author_id)
        .execute(&self.pool)
        .await
        .context("Failed to create post")?;

        let mut created = post.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, subtitle, body, image, created_at, published_at,
                   active, category_id, author_id
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get post by ID")?;

        Ok(row.map(|r| row_to_post(&r)))
    }

    async fn get_with_meta(&self, id: i64) -> Result<Option<PostWithMeta>> {
        let row = sqlx::query(
            r#"
            SELECT p.id, p.title, p.subtitle, p.body, p.image, p.created_at,
                   p.published_at, p.active, p.category_id, p.author_id,
                   u.username AS author_username, c.name AS category_name
            FROM posts p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get post with meta")?;

        Ok(row.as_ref().map(row_to_post_with_meta))
    }

    async fn list_active(&self, page: i64, page_size: i64) -> Result<(Vec<PostWithMeta>, i64)> {
        self.list_where("p.active = 1", None, page, page_size).await
    }

    async fn list_by_author(
        &self,
        author_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<PostWithMeta>, i64)> {
        self.list_where("p.author_id = ?", Some(author_id), page, page_size)
            .await
    }

    async fn list_by_category(
        &self,
        category_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<PostWithMeta>, i64)> {
        self.list_where(
            "p.active = 1 AND p.category_id = ?",
            Some(category_id),
            page,
            page_size,
        )
        .await
    }

    async fn update(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, subtitle = ?, body = ?, image = ?, published_at = ?,
                active = ?, category_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.subtitle)
        .bind(&post.body)
        .bind(&post.image)
        .bind(post.published_at)
        .bind(post.active)
        .bind(post.category_id)
        .bind(post.id)
        .execute(&self.pool)
        .await
        .context("Failed to update post")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete post")?;
        Ok(())
    }

    async fn images_by_author(&self, author_id: i64) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT image FROM posts WHERE author_id = ? AND image IS NOT NULL",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list author images")?;

        Ok(rows.into_iter().map(|(image,)| image).collect())
    }
}

fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        title: row.get("title"),
        subtitle: row.get("subtitle"),
        body: row.get("body"),
        image: row.get("image"),
        created_at: row.get("created_at"),
        published_at: row.get("published_at"),
        active: row.get("active"),
        category_id: row.get("category_id"),
        author_id: row.get("author_id"),
    }
}

fn row_to_post_with_meta(row: &sqlx::sqlite::SqliteRow) -> PostWithMeta {
    PostWithMeta {
        post: row_to_post(row),
        author_username: row.get("author_username"),
        category_name: row.get("category_name"),
    }
}
