//! Data models
//!
//! Database entities (User, Category, Post, Comment, Session) and the
//! input/output types used by services and handlers.

mod category;
mod comment;
mod post;
mod session;
mod user;

pub use category::Category;
pub use comment::{Comment, CommentWithAuthor};
pub use post::{CreatePostInput, PagedResult, Post, PostWithMeta, UpdatePostInput};
pub use session::Session;
pub use user::{RegisterInput, Role, User};
