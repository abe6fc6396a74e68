//! Database layer
//!
//! SQLite via sqlx: connection pool setup, embedded code-based migrations,
//! and one repository per entity.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
