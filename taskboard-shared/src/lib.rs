//! # Taskboard Shared Library
//!
//! This crate contains the domain types, persistence layer and business rules
//! used by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, session tokens, access control
//! - `db`: PostgreSQL pool and migrations
//! - `models`: Database models and data structures
//! - `store`: Transactional persistence sessions (Postgres and in-memory)
//! - `services`: Project/task lifecycle rules, summaries, admin bootstrap

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
