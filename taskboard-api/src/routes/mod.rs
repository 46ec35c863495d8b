/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and user administration
/// - `projects`: Projects, their tasks and task attachments
/// - `comments`: Task comments
/// - `summary`: Workload summaries
/// - `tools`: Project tools

pub mod auth;
pub mod comments;
pub mod health;
pub mod projects;
pub mod summary;
pub mod tools;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Body of endpoints that only confirm what they did
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Calendar date the date rules are evaluated against
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
