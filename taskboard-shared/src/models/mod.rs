/// Database models for Taskboard
///
/// This module contains all database models and their queries. Every query
/// takes a `&mut PgConnection`, so the same functions run inside a pooled
/// connection or an open transaction.
///
/// # Models
///
/// - `user`: Accounts, roles and credentials
/// - `project`: Projects with a scheduling window
/// - `task`: Tasks scheduled inside a project
/// - `comment`: Comments on tasks
/// - `tool`: Per-project tool tags
/// - `attachment`: Files attached to tasks
///
/// # Ownership
///
/// ```text
/// Project ──┬── Task ──┬── Comment
///           │          └── Attachment
///           └── Tool
/// ```
///
/// Deleting a parent removes everything below it.

pub mod attachment;
pub mod comment;
pub mod project;
pub mod task;
pub mod tool;
pub mod user;
