/// Admin bootstrap
///
/// Makes sure the configured administrator account exists every time the
/// server starts. Running it repeatedly with the same configuration leaves
/// exactly one matching admin.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::services::bootstrap::{ensure_admin, AdminConfig};
/// use taskboard_shared::store::memory::MemoryDatabase;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let db = MemoryDatabase::new();
/// let admin = AdminConfig {
///     username: "admin".to_string(),
///     email: "admin@example.com".to_string(),
///     password: "Sup3r$ecret".to_string(),
/// };
///
/// let outcome = ensure_admin(&db, &admin).await?;
/// println!("Admin bootstrap: {}", outcome);
/// # Ok(())
/// # }
/// ```

use std::fmt;

use tracing::info;

use super::ServiceResult;
use crate::auth::password::hash_password;
use crate::models::user::{CreateUser, Role};
use crate::store::Database;

/// Credentials of the bootstrap administrator
#[derive(Clone)]
pub struct AdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What [`ensure_admin`] had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// No account had the email; an admin was created
    Created,
    /// An account had the email with a lower role and was promoted
    Promoted,
    /// Nothing to do
    AlreadyAdmin,
}

impl fmt::Display for BootstrapOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BootstrapOutcome::Created => "created",
            BootstrapOutcome::Promoted => "promoted",
            BootstrapOutcome::AlreadyAdmin => "already admin",
        };
        f.write_str(s)
    }
}

/// Ensures the account with `config.email` exists and is an admin
///
/// An existing account keeps its username and password; only its role
/// changes. A new account gets the configured password, hashed but not
/// checked against the strength policy. Runs in one committed session.
pub async fn ensure_admin(db: &dyn Database, config: &AdminConfig) -> ServiceResult<BootstrapOutcome> {
    let mut store = db.begin().await?;

    let outcome = match store.find_user_by_email(&config.email).await? {
        Some(user) if user.role == Role::Admin => BootstrapOutcome::AlreadyAdmin,
        Some(user) => {
            store.set_user_role(user.id, Role::Admin).await?;
            BootstrapOutcome::Promoted
        }
        None => {
            let password_hash = hash_password(&config.password)?;
            store
                .create_user(CreateUser {
                    username: config.username.clone(),
                    email: config.email.clone(),
                    password_hash,
                    role: Role::Admin,
                })
                .await?;
            BootstrapOutcome::Created
        }
    };

    store.commit().await?;

    info!(email = %config.email, outcome = %outcome, "Admin bootstrap finished");
    Ok(outcome)
}
