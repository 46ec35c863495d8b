/// Bearer token authentication
///
/// Extracts the session token from the `Authorization: Bearer <token>`
/// header, validates it, and resolves it to a stored [`User`]. A token is
/// only as good as the account behind it: a validly signed token whose user
/// has since been deleted is rejected.
///
/// # Flow
///
/// ```text
/// Authorization header ─> bearer_token ─> verify_token ─> Claims
///                                                          │
///                                    Store::find_user <────┘
///                                          │
///                                          └─> User (or 401)
/// ```
///
/// # Example
///
/// ```no_run
/// use axum::http::HeaderMap;
/// use taskboard_shared::auth::middleware::{authenticate, resolve_claims};
/// use taskboard_shared::store::Store;
///
/// # async fn example(headers: HeaderMap, store: &mut dyn Store) -> Result<(), Box<dyn std::error::Error>> {
/// let claims = authenticate(&headers, "jwt-secret")?;
/// let user = resolve_claims(store, &claims).await?;
/// println!("Hello, {}!", user.username);
/// # Ok(())
/// # }
/// ```

use axum::http::{header, HeaderMap};

use super::jwt::{verify_token, Claims, JwtError};
use crate::models::user::User;
use crate::store::{Store, StoreError};

/// Message returned for every rejected or unresolvable token
pub const INVALID_CREDENTIALS: &str = "Could not validate credentials";

/// Error type for authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Not authenticated")]
    MissingCredentials,

    /// Authorization header is not a bearer token
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token failed validation
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),

    /// Token is valid but its user no longer exists
    #[error("Unknown user")]
    UnknownUser,

    /// User lookup failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Message safe to show to clients
    pub fn client_message(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "Not authenticated",
            AuthError::InvalidFormat(_) | AuthError::InvalidToken(_) | AuthError::UnknownUser => {
                INVALID_CREDENTIALS
            }
            AuthError::Store(_) => "An internal error occurred",
        }
    }
}

/// Extracts the raw token from an `Authorization: Bearer <token>` header
///
/// # Errors
///
/// Returns `AuthError::MissingCredentials` if there is no header and
/// `AuthError::InvalidFormat` if it is not a non-empty bearer token
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Header is not valid ASCII".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty bearer token".to_string()));
    }

    Ok(token)
}

/// Extracts and validates the bearer token in `headers`
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<Claims, AuthError> {
    let token = bearer_token(headers)?;
    Ok(verify_token(token, secret)?)
}

/// Loads the user named by validated claims
///
/// # Errors
///
/// Returns `AuthError::UnknownUser` if the account no longer exists
pub async fn resolve_claims(store: &mut dyn Store, claims: &Claims) -> Result<User, AuthError> {
    store
        .find_user(claims.user_id)
        .await?
        .ok_or(AuthError::UnknownUser)
}

/// Validates `token` and loads its user
pub async fn resolve_user(
    store: &mut dyn Store,
    token: &str,
    secret: &str,
) -> Result<User, AuthError> {
    let claims = verify_token(token, secret)?;
    resolve_claims(store, &claims).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use crate::auth::jwt::issue_token;
    use crate::models::user::{CreateUser, Role};
    use crate::store::{memory::MemoryDatabase, Database};
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            bearer_token(&headers_with("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidFormat(_))
        ));
        assert!(matches!(
            bearer_token(&headers_with("Bearer ")),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_user_round_trip() {
        let db = MemoryDatabase::new();
        let mut store = db.begin().await.unwrap();
        let user = store
            .create_user(CreateUser {
                username: "jane".to_string(),
                email: "jane@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: Role::Manager,
            })
            .await
            .unwrap();

        let token = issue_token(&Claims::for_user(&user, Duration::minutes(30)), SECRET).unwrap();
        let resolved = resolve_user(store.as_mut(), &token, SECRET).await.unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.role, Role::Manager);
    }

    #[tokio::test]
    async fn test_resolve_user_rejects_deleted_account() {
        let db = MemoryDatabase::new();
        let mut store = db.begin().await.unwrap();
        let user = store
            .create_user(CreateUser {
                username: "gone".to_string(),
                email: "gone@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: Role::Member,
            })
            .await
            .unwrap();
        let token = issue_token(&Claims::for_user(&user, Duration::minutes(30)), SECRET).unwrap();

        store.delete_user(user.id).await.unwrap();

        let err = resolve_user(store.as_mut(), &token, SECRET).await.unwrap_err();
        assert!(matches!(err, AuthError::UnknownUser));
        assert_eq!(err.client_message(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_resolve_user_rejects_expired_token() {
        let db = MemoryDatabase::new();
        let mut store = db.begin().await.unwrap();
        let user = store
            .create_user(CreateUser {
                username: "late".to_string(),
                email: "late@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: Role::Member,
            })
            .await
            .unwrap();
        let token = issue_token(&Claims::for_user(&user, Duration::seconds(-1)), SECRET).unwrap();

        let err = resolve_user(store.as_mut(), &token, SECRET).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(JwtError::Expired)));
    }
}
