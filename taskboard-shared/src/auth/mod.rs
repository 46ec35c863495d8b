/// Authentication and authorization utilities
///
/// This module provides the security primitives for Taskboard:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength policy
/// - [`jwt`]: Session token issuance and validation
/// - [`authorization`]: Capability sets and per-operation role checks
/// - [`middleware`]: Bearer token extraction and user resolution
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("LongEnough1!")?;
/// assert!(verify_password("LongEnough1!", &hash)?);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
