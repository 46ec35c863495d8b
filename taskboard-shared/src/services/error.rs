/// Error taxonomy shared by every service operation
///
/// Each variant corresponds to one kind of failure the HTTP layer maps to a
/// status code. Storage and hashing failures are internal and carry their
/// source error.

use crate::auth::authorization::AuthzError;
use crate::auth::jwt::JwtError;
use crate::auth::password::{PasswordError, WeakPassword};
use crate::store::StoreError;

use super::schedule::DateRangeError;

/// Service error
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input failed a business validation rule
    #[error("{0}")]
    Validation(String),

    /// Password rejected by the strength policy
    #[error(transparent)]
    WeakPassword(#[from] WeakPassword),

    /// Dates break a scheduling rule
    #[error(transparent)]
    InvalidDateRange(#[from] DateRangeError),

    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Credentials were rejected
    #[error("{0}")]
    Authentication(&'static str),

    /// Authenticated but not allowed
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    /// Attachment type outside the allow-list
    #[error("{0}")]
    UnsupportedMediaType(String),

    /// Write collides with existing data
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Returns true for failures caused by the server rather than the request
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ServiceError::Password(_) | ServiceError::Token(_) | ServiceError::Store(_)
        )
    }
}

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;
