//! Tintero - A small collaborative blog platform
//!
//! Collaborator users write posts organized by category, readers comment,
//! and an account panel lets collaborators and superusers moderate accounts.
//! The authorization rules live in [`authz`]; everything else is CRUD
//! plumbing around them.

pub mod authz;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod web;
