/// Accounts: registration, login and administration
///
/// Registration always creates a `member`; roles only change through
/// [`change_role`]. Login failures never reveal whether the email exists.

use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, Operation};
use crate::auth::jwt::{issue_token, Claims};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::models::user::{CreateUser, Role, User};
use crate::store::{Store, StoreError};

/// Message for every rejected login
pub const LOGIN_FAILED: &str = "Wrong email or Password";

/// Message for a duplicate registration
pub const EMAIL_TAKEN: &str = "Email already exists";

/// Registration input, already validated for shape
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Creates a member account
///
/// # Errors
///
/// - `ServiceError::WeakPassword` if the password fails the strength policy
/// - `ServiceError::Conflict` if the email is already registered
pub async fn register(store: &mut dyn Store, registration: Registration) -> ServiceResult<User> {
    validate_password_strength(&registration.password)?;

    if store.find_user_by_email(&registration.email).await?.is_some() {
        return Err(ServiceError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let password_hash = hash_password(&registration.password)?;

    let user = store
        .create_user(CreateUser {
            username: registration.username,
            email: registration.email,
            password_hash,
            role: Role::Member,
        })
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation(_) => ServiceError::Conflict(EMAIL_TAKEN.to_string()),
            other => other.into(),
        })?;

    info!(user_id = %user.id, "User registered");
    Ok(user)
}

/// Checks credentials and issues a session token valid for `ttl`
///
/// # Errors
///
/// Returns `ServiceError::Authentication` with the same message whether the
/// email is unknown or the password is wrong
pub async fn login(
    store: &mut dyn Store,
    email: &str,
    password: &str,
    secret: &str,
    ttl: Duration,
) -> ServiceResult<String> {
    let Some(user) = store.find_user_by_email(email).await? else {
        return Err(ServiceError::Authentication(LOGIN_FAILED));
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "Login rejected: wrong password");
        return Err(ServiceError::Authentication(LOGIN_FAILED));
    }

    let token = issue_token(&Claims::for_user(&user, ttl), secret)?;
    info!(user_id = %user.id, "User logged in");
    Ok(token)
}

pub async fn list_users(store: &mut dyn Store, actor: &User) -> ServiceResult<Vec<User>> {
    authorize(actor, Operation::ListUsers)?;
    Ok(store.list_users().await?)
}

/// Sets the role of `user_id`
///
/// `role` is the raw requested name; anything other than `admin`,
/// `manager` or `member` is rejected after the user lookup.
pub async fn change_role(
    store: &mut dyn Store,
    actor: &User,
    user_id: Uuid,
    role: &str,
) -> ServiceResult<User> {
    authorize(actor, Operation::ChangeUserRole)?;

    if store.find_user(user_id).await?.is_none() {
        return Err(ServiceError::NotFound("User"));
    }

    let role = role
        .parse::<Role>()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;

    let user = store
        .set_user_role(user_id, role)
        .await?
        .ok_or(ServiceError::NotFound("User"))?;

    info!(actor_id = %actor.id, user_id = %user.id, role = %role, "User role changed");
    Ok(user)
}

/// Deletes `user_id` and returns the removed account
///
/// The target is looked up before the actor's role is checked.
pub async fn delete_user(store: &mut dyn Store, actor: &User, user_id: Uuid) -> ServiceResult<User> {
    let user = store
        .find_user(user_id)
        .await?
        .ok_or(ServiceError::NotFound("User"))?;

    authorize(actor, Operation::DeleteUser)?;

    store.delete_user(user_id).await?;
    info!(actor_id = %actor.id, user_id = %user_id, "User deleted");
    Ok(user)
}
