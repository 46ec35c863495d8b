//! # Taskboard API Server Library
//!
//! HTTP surface of Taskboard: projects, tasks, comments, tools and
//! attachments behind bearer-token authentication.
//!
//! ## Modules
//!
//! - `app`: Application state, per-request session and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Json, Path and Query extractors rejecting with `ApiError`
//! - `middleware`: Response security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
