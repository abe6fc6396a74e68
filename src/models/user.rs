//! User model
//!
//! Accounts carry a [`Role`] (Member or Collaborator) and a separate
//! superuser flag. The role replaces the group-name string comparisons of
//! earlier revisions; every permission gate resolves through
//! [`crate::authz::permits`] instead of inspecting these fields directly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity representing a registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Birth date
    pub birth_date: NaiveDate,
    /// Account role
    pub role: Role,
    /// Superuser flag, orthogonal to the role
    pub is_superuser: bool,
    /// Avatar image path relative to the media root
    pub avatar: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The password must already be hashed; see
    /// `services::password::hash_password()`.
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        first_name: String,
        last_name: String,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            password_hash,
            first_name,
            last_name,
            birth_date,
            role: Role::Member,
            is_superuser: false,
            avatar: None,
            created_at: Utc::now(),
        }
    }

    /// Check if the account holds the Collaborator role.
    ///
    /// Note that a superuser is not implicitly a collaborator; content
    /// management gates check the role only.
    pub fn is_collaborator(&self) -> bool {
        self.role == Role::Collaborator
    }

    /// Full display name
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Account role.
///
/// - Member: default authenticated role, no management privileges beyond
///   own content
/// - Collaborator: may manage posts/categories and moderate any comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Default authenticated role
    #[default]
    Member,
    /// May manage content and moderate comments
    Collaborator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Member => write!(f, "member"),
            Role::Collaborator => write!(f, "collaborator"),
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "collaborator" => Ok(Role::Collaborator),
            _ => Err(anyhow::anyhow!("Invalid role: {}", s)),
        }
    }
}

/// Input for registering a new account (before password hashing)
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::new(
            "ana".to_string(),
            "ana@example.com".to_string(),
            "hash".to_string(),
            "Ana".to_string(),
            "García".to_string(),
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_user_new_defaults_to_member() {
        let user = sample_user();
        assert_eq!(user.id, 0);
        assert_eq!(user.role, Role::Member);
        assert!(!user.is_superuser);
        assert!(user.avatar.is_none());
    }

    #[test]
    fn test_is_collaborator_checks_role_only() {
        let mut user = sample_user();
        assert!(!user.is_collaborator());

        user.role = Role::Collaborator;
        assert!(user.is_collaborator());

        // A superuser without the role is not a collaborator
        user.role = Role::Member;
        user.is_superuser = true;
        assert!(!user.is_collaborator());
    }

    #[test]
    fn test_display_name() {
        let user = sample_user();
        assert_eq!(user.display_name(), "Ana García");
    }

    #[test]
    fn test_role_display_and_from_str() {
        assert_eq!(Role::Member.to_string(), "member");
        assert_eq!(Role::Collaborator.to_string(), "collaborator");
        assert_eq!(Role::from_str("member").unwrap(), Role::Member);
        assert_eq!(Role::from_str("COLLABORATOR").unwrap(), Role::Collaborator);
        assert!(Role::from_str("editor").is_err());
    }
}
