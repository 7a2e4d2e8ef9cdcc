//! # Todo Shared Library
//!
//! Domain types, authentication primitives and storage used by the Todo API
//! server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, JWT tokens, caller resolution and ownership checks
//! - `db`: PostgreSQL pool and embedded migrations
//! - `models`: Users, tasks and their input types
//! - `store`: Storage traits with PostgreSQL and in-memory backends
//! - `services`: User directory and owner-scoped task operations

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
