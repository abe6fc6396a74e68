//! Category service

use crate::db::repositories::CategoryRepository;
use crate::models::Category;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A category with this name already exists
    #[error("Category '{0}' already exists")]
    NameExists(String),

    /// Category not found
    #[error("Category not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category service
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        self.repo.list().await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Category>> {
        self.repo.get_by_id(id).await
    }

    /// Create a category with a unique, non-empty name.
    pub async fn create(&self, name: &str) -> Result<Category, CategoryServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CategoryServiceError::ValidationError(
                "Category name must not be empty".to_string(),
            ));
        }

        if self
            .repo
            .get_by_name(name)
            .await
            .context("Failed to check category name")?
            .is_some()
        {
            return Err(CategoryServiceError::NameExists(name.to_string()));
        }

        let created = self
            .repo
            .create(&Category::new(name.to_string()))
            .await
            .context("Failed to create category")?;
        Ok(created)
    }

    /// Rename a category, keeping names unique.
    pub async fn rename(&self, id: i64, name: &str) -> Result<Category, CategoryServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CategoryServiceError::ValidationError(
                "Category name must not be empty".to_string(),
            ));
        }

        let mut category = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to look up category")?
            .ok_or(CategoryServiceError::NotFound)?;

        if let Some(existing) = self
            .repo
            .get_by_name(name)
            .await
            .context("Failed to check category name")?
        {
            if existing.id != id {
                return Err(CategoryServiceError::NameExists(name.to_string()));
            }
        }

        category.name = name.to_string();
        self.repo
            .update(&category)
            .await
            .context("Failed to rename category")?;
        Ok(category)
    }

    /// Delete a category. Its posts survive with a null category reference.
    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        let category = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to look up category")?
            .ok_or(CategoryServiceError::NotFound)?;

        self.repo
            .delete(category.id)
            .await
            .context("Failed to delete category")?;
        tracing::info!(category = category.id, "deleted category {}", category.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxCategoryRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> CategoryService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        CategoryService::new(SqlxCategoryRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_create_trims_and_validates_name() {
        let service = setup().await;
        let category = service.create("  Science  ").await.unwrap();
        assert_eq!(category.name, "Science");

        let err = service.create("   ").await.unwrap_err();
        assert!(matches!(err, CategoryServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let service = setup().await;
        service.create("Music").await.unwrap();
        let err = service.create("Music").await.unwrap_err();
        assert!(matches!(err, CategoryServiceError::NameExists(_)));
    }

    #[tokio::test]
    async fn test_rename_keeps_names_unique() {
        let service = setup().await;
        let a = service.create("A").await.unwrap();
        service.create("B").await.unwrap();

        let err = service.rename(a.id, "B").await.unwrap_err();
        assert!(matches!(err, CategoryServiceError::NameExists(_)));

        // Renaming to its own name is fine
        let same = service.rename(a.id, "A").await.unwrap();
        assert_eq!(same.name, "A");
    }

    #[tokio::test]
    async fn test_delete_missing_returns_not_found() {
        let service = setup().await;
        let err = service.delete(42).await.unwrap_err();
        assert!(matches!(err, CategoryServiceError::NotFound));
    }
}
