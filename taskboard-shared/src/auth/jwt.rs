/// Session token issuance and validation
///
/// Tokens are JWTs signed with HS256 (HMAC-SHA256) using the server's shared
/// secret. They carry the user's identity and role so clients can render
/// role-aware views, but the server always re-reads the user on each request
/// (see [`crate::auth::middleware::resolve_user`]).
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: Configurable TTL, 30 minutes by default
/// - **Validation**: Signature, expiry, not-before and issuer, with no leeway
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use taskboard_shared::auth::jwt::{issue_token, verify_token, Claims};
/// use taskboard_shared::models::user::{Role, User};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user = User {
///     id: Uuid::new_v4(),
///     username: "jane".to_string(),
///     email: "jane@example.com".to_string(),
///     password_hash: String::new(),
///     role: Role::Manager,
///     created_at: Utc::now(),
/// };
/// let secret = "your-secret-key-at-least-32-bytes-long";
///
/// let token = issue_token(&Claims::for_user(&user, Duration::minutes(30)), secret)?;
///
/// let claims = verify_token(&token, secret)?;
/// assert_eq!(claims.user_id, user.id);
/// assert_eq!(claims.role, Role::Manager);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{Role, User};

/// Issuer written into and required from every token
pub const ISSUER: &str = "taskboard";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature or claim validation failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is not a well-formed JWT or lacks required claims
    #[error("Invalid token format: {0}")]
    InvalidFormat(String),

    /// Token was issued by someone else
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// JWT claims
///
/// # Standard Claims
///
/// - `iss`: Issuer (always "taskboard")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `user_id`, `username`, `email`, `role`: identity of the session owner
///   at issue time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,

    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
}

impl Claims {
    /// Builds claims for `user`, valid from now for `ttl`
    pub fn for_user(user: &User, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
        }
    }
}

/// Signs claims into a token string
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and returns its claims
///
/// Verifies:
/// - Signature is valid for `secret`
/// - Token hasn't expired and is already valid (`nbf`)
/// - Issuer is "taskboard"
/// - All identity claims are present
///
/// # Errors
///
/// Returns `JwtError::Expired` for expired tokens, `JwtError::InvalidFormat`
/// for malformed tokens or missing claims, and `JwtError::ValidationError`
/// for bad signatures.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            JwtError::InvalidFormat(e.to_string())
        }
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
