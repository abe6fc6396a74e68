//! Category repository
//!
//! Deleting a category leaves its posts in place: the `posts.category_id`
//! foreign key is declared `ON DELETE SET NULL`, so the reference is
//! cleared by the database.

use crate::models::Category;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: &Category) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by name
    async fn get_by_name(&self, name: &str) -> Result<Option<Category>>;

    /// List all categories ordered by name
    async fn list(&self) -> Result<Vec<Category>>;

    /// Rename a category
    async fn update(&self, category: &Category) -> Result<()>;

    /// Delete a category; its posts keep existing with a null category
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: SqlitePool,
}

impl SqlxCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(&category.name)
            .execute(&self.pool)
            .await
            .context("Failed to create category")?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: category.name.clone(),
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get category by ID")?;

        Ok(row.map(|r| Category {
            id: r.get("id"),
            name: r.get("name"),
        }))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name FROM categories WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get category by name")?;

        Ok(row.map(|r| Category {
            id: r.get("id"),
            name: r.get("name"),
        }))
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list categories")?;

        Ok(rows
            .iter()
            .map(|r| Category {
                id: r.get("id"),
                name: r.get("name"),
            })
            .collect())
    }

    async fn update(&self, category: &Category) -> Result<()> {
        sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(&category.name)
            .bind(category.id)
            .execute(&self.pool)
            .await
            .context("Failed to update category")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete category")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxCategoryRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxCategoryRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_category() {
        let repo = setup().await;
        let created = repo.create(&Category::new("Science".to_string())).await.unwrap();
        assert!(created.id > 0);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Science");
        assert!(repo.get_by_name("Science").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let repo = setup().await;
        repo.create(&Category::new("Music".to_string())).await.unwrap();
        assert!(repo.create(&Category::new("Music".to_string())).await.is_err());
    }

    #[tokio::test]
    async fn test_list_ordered_by_name() {
        let repo = setup().await;
        repo.create(&Category::new("Travel".to_string())).await.unwrap();
        repo.create(&Category::new("Art".to_string())).await.unwrap();

        let categories = repo.list().await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Art");
        assert_eq!(categories[1].name, "Travel");
    }

    #[tokio::test]
    async fn test_update_renames_category() {
        let repo = setup().await;
        let mut category = repo.create(&Category::new("Old".to_string())).await.unwrap();
        category.name = "New".to_string();
        repo.update(&category).await.unwrap();

        let fetched = repo.get_by_id(category.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "New");
    }
}
