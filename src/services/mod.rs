//! Services layer - Business logic
//!
//! Services implement business rules on top of the repositories: input
//! validation, password handling, session lifecycle, and media cleanup.
//! Authorization is NOT decided here; handlers gate every request through
//! [`crate::authz`] before calling into a service.

pub mod category;
pub mod comment;
pub mod password;
pub mod post;
pub mod user;

pub use category::{CategoryService, CategoryServiceError};
pub use comment::{CommentService, CommentServiceError};
pub use password::{hash_password, verify_password};
pub use post::{PostService, PostServiceError};
pub use user::{AccountEntry, LoginInput, UserService, UserServiceError};
