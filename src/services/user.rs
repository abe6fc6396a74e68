//! User service
//!
//! Registration, login/logout, session lifecycle, and the annotated
//! account list. Registration always creates a Member; the only path to a
//! superuser is the config bootstrap.

use crate::authz::{self, Action};
use crate::config::BootstrapConfig;
use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{RegisterInput, Role, Session, User};
use crate::services::password::{hash_password, verify_password};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Account not found
    #[error("Account not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Login credentials
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// One row of the account management list: the account plus whether the
/// requester may delete it. The flag comes from the same [`authz::permits`]
/// call the delete gate uses, so the two can never disagree.
#[derive(Debug, Clone, Serialize)]
pub struct AccountEntry {
    #[serde(flatten)]
    pub user: User,
    pub deletable: bool,
}

/// User service for accounts and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days,
        }
    }

    /// Register a new account. The role is always Member.
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        if input.username.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username must not be empty".to_string(),
            ));
        }
        if input.email.trim().is_empty() || !input.email.contains('@') {
            return Err(UserServiceError::ValidationError(
                "A valid email address is required".to_string(),
            ));
        }
        if input.password.len() < 8 {
            return Err(UserServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        let user = User::new(
            input.username,
            input.email,
            password_hash,
            input.first_name,
            input.last_name,
            input.birth_date,
        );

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        tracing::info!(user = created.id, "registered account {}", created.username);
        Ok(created)
    }

    /// Login with credentials, creating a new session on success.
    pub async fn login(&self, input: LoginInput) -> Result<Session, UserServiceError> {
        let user = self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to look up user")?
            .ok_or_else(|| {
                UserServiceError::AuthenticationError("Invalid username or password".to_string())
            })?;

        let valid = verify_password(&input.password, &user.password_hash)
            .context("Password verification failed")?;
        if !valid {
            return Err(UserServiceError::AuthenticationError(
                "Invalid username or password".to_string(),
            ));
        }

        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user.id,
            expires_at: Utc::now() + Duration::days(self.session_expiration_days),
            created_at: Utc::now(),
        };
        self.session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        tracing::info!(user = user.id, "login for {}", user.username);
        Ok(session)
    }

    /// Delete the session behind a token (logout). Unknown tokens are fine.
    pub async fn logout(&self, token: &str) -> Result<()> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")
    }

    /// Resolve a session token to its user.
    ///
    /// Expired sessions are deleted on sight and resolve to `None`.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>> {
        let Some(session) = self.session_repo.get(token).await? else {
            return Ok(None);
        };

        if session.is_expired() {
            self.session_repo.delete(token).await?;
            return Ok(None);
        }

        self.user_repo.get_by_id(session.user_id).await
    }

    /// Fetch an account by id.
    pub async fn get(&self, id: i64) -> Result<Option<User>> {
        self.user_repo.get_by_id(id).await
    }

    /// The account list shown to `requester`: every account except their
    /// own, annotated with deletion eligibility.
    pub async fn account_list(&self, requester: &User) -> Result<Vec<AccountEntry>> {
        let users = self.user_repo.list().await?;
        Ok(users
            .into_iter()
            .filter(|u| u.id != requester.id)
            .map(|user| {
                let deletable = authz::permits(requester, Action::DeleteAccount(&user));
                AccountEntry { user, deletable }
            })
            .collect())
    }

    /// Delete an account. Posts, comments, and sessions cascade.
    ///
    /// Eligibility is the handler's responsibility (gated through
    /// `Action::DeleteAccount` before this is called).
    pub async fn delete_account(&self, id: i64) -> Result<(), UserServiceError> {
        let user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to look up account")?
            .ok_or(UserServiceError::NotFound)?;

        self.user_repo
            .delete(user.id)
            .await
            .context("Failed to delete account")?;
        tracing::info!(user = user.id, "deleted account {}", user.username);
        Ok(())
    }

    /// Grant or revoke the Collaborator role.
    pub async fn set_collaborator(
        &self,
        id: i64,
        collaborator: bool,
    ) -> Result<(), UserServiceError> {
        let user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to look up account")?
            .ok_or(UserServiceError::NotFound)?;

        let role = if collaborator {
            Role::Collaborator
        } else {
            Role::Member
        };
        self.user_repo
            .update_role(user.id, role, user.is_superuser)
            .await
            .context("Failed to update role")?;
        Ok(())
    }

    /// Create the bootstrap superuser if the username is still free.
    pub async fn ensure_superuser(&self, bootstrap: &BootstrapConfig) -> Result<()> {
        if self
            .user_repo
            .get_by_username(&bootstrap.username)
            .await?
            .is_some()
        {
            return Ok(());
        }

        let password_hash =
            hash_password(&bootstrap.password).context("Failed to hash bootstrap password")?;
        let mut user = User::new(
            bootstrap.username.clone(),
            bootstrap.email.clone(),
            password_hash,
            String::new(),
            String::new(),
            chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
        );
        user.is_superuser = true;

        let created = self.user_repo.create(&user).await?;
        tracing::info!(user = created.id, "created bootstrap superuser");
        Ok(())
    }
}
