//! User repository

use crate::models::{Role, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Update role and superuser flag
    async fn update_role(&self, id: i64, role: Role, is_superuser: bool) -> Result<()>;

    /// Delete a user
    async fn delete(&self, id: i64) -> Result<()>;

    /// List all users, ordered by first name descending
    async fn list(&self) -> Result<Vec<User>>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, \
     birth_date, role, is_superuser, avatar, created_at";

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users
                (username, email, password_hash, first_name, last_name,
                 birth_date, role, is_superuser, avatar, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.birth_date)
        .bind(user.role.to_string())
        .bind(user.is_superuser)
        .bind(&user.avatar)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        let mut created = user.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by ID")?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by username")?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by email")?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn update_role(&self, id: i64, role: Role, is_superuser: bool) -> Result<()> {
        sqlx::query("UPDATE users SET role = ?, is_superuser = ? WHERE id = ?")
            .bind(role.to_string())
            .bind(is_superuser)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update user role")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete user")?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY first_name DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list users")?;

        rows.iter().map(row_to_user).collect()
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = Role::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        birth_date: row.get("birth_date"),
        role,
        is_superuser: row.get("is_superuser"),
        avatar: row.get("avatar"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::NaiveDate;

    async fn setup() -> SqlxUserRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxUserRepository::new(pool)
    }

    fn sample(username: &str) -> User {
        User::new(
            username.to_string(),
            format!("{}@example.com", username),
            "hash".to_string(),
            "Test".to_string(),
            "User".to_string(),
            NaiveDate::from_ymd_opt(1995, 3, 14).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = setup().await;
        let created = repo.create(&sample("ana")).await.unwrap();
        assert!(created.id > 0);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.username, "ana");
        assert_eq!(fetched.role, Role::Member);
        assert!(!fetched.is_superuser);
        assert_eq!(
            fetched.birth_date,
            NaiveDate::from_ymd_opt(1995, 3, 14).unwrap()
        );
    }

    #[tokio::test]
    async fn test_get_by_username_and_email() {
        let repo = setup().await;
        repo.create(&sample("bruno")).await.unwrap();

        assert!(repo.get_by_username("bruno").await.unwrap().is_some());
        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
        assert!(repo
            .get_by_email("bruno@example.com")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = setup().await;
        repo.create(&sample("carla")).await.unwrap();
        assert!(repo.create(&sample("carla")).await.is_err());
    }

    #[tokio::test]
    async fn test_update_role() {
        let repo = setup().await;
        let user = repo.create(&sample("dario")).await.unwrap();

        repo.update_role(user.id, Role::Collaborator, true)
            .await
            .unwrap();
        let updated = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.role, Role::Collaborator);
        assert!(updated.is_superuser);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let repo = setup().await;
        let user = repo.create(&sample("elena")).await.unwrap();
        repo.delete(user.id).await.unwrap();
        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_first_name_descending() {
        let repo = setup().await;
        let mut a = sample("aaa");
        a.first_name = "Alba".to_string();
        let mut z = sample("zzz");
        z.first_name = "Zoe".to_string();
        repo.create(&a).await.unwrap();
        repo.create(&z).await.unwrap();

        let users = repo.list().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].first_name, "Zoe");
        assert_eq!(users[1].first_name, "Alba");
    }
}
