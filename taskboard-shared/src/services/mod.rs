/// Business operations
///
/// Every operation takes an open [`Store`](crate::store::Store) session and,
/// where it is protected, the acting [`User`](crate::models::user::User).
/// Operations check authorization, existence and scheduling rules in a fixed
/// order and never commit; the caller commits the session once the operation
/// succeeds and drops it otherwise.
///
/// Operations that depend on the current date take `today` explicitly.

pub mod attachments;
pub mod bootstrap;
pub mod comments;
pub mod error;
pub mod projects;
pub mod schedule;
pub mod summary;
pub mod tasks;
pub mod tools;
pub mod users;

pub use error::{ServiceError, ServiceResult};
