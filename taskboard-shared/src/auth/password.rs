/// Password hashing and strength policy
///
/// Passwords are hashed with Argon2id and stored as PHC strings, so the
/// algorithm, parameters and salt travel with the hash.
///
/// # Security
///
/// - **Algorithm**: Argon2id
/// - **Memory**: 19 MiB (19456 KiB)
/// - **Iterations**: 2 passes
/// - **Parallelism**: 1 lane
/// - **Output**: 32-byte hash
///
/// These parameters keep a single verification around 100ms on commodity
/// server hardware.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("LongEnough1!")?;
///
/// assert!(verify_password("LongEnough1!", &hash)?);
/// assert!(!verify_password("wrong", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Minimum password length, counted in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Characters accepted as the required symbol
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*()-_=+[]{}|;:',.<>?/`~";

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// A password strength rule that was not satisfied
///
/// Rules are checked in declaration order and only the first failure is
/// reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WeakPassword {
    #[error("Password must be at least 8 characters long")]
    TooShort,

    #[error("Password must include at least one number")]
    MissingDigit,

    #[error("Password must include at least one uppercase letter")]
    MissingUppercase,

    #[error("Password must include at least one lowercase letter")]
    MissingLowercase,

    #[error("Password must include at least one special character")]
    MissingSymbol,
}

fn argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(19456)
        .t_cost(2)
        .p_cost(1)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password using Argon2id with a fresh random salt
///
/// # Returns
///
/// PHC string format hash, e.g.
/// ```text
/// $argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>
/// ```
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash
///
/// Parameters are read from the PHC string, so hashes produced with older
/// cost settings keep verifying.
///
/// # Returns
///
/// `Ok(true)` if the password matches, `Ok(false)` if it doesn't
///
/// # Errors
///
/// Returns an error if the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Validates password strength
///
/// Rules, checked in this order:
/// 1. At least 8 characters
/// 2. At least one ASCII digit `0-9`
/// 3. At least one uppercase letter
/// 4. At least one lowercase letter
/// 5. At least one symbol from [`PASSWORD_SYMBOLS`]
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{validate_password_strength, WeakPassword};
///
/// assert!(validate_password_strength("LongEnough1!").is_ok());
/// assert_eq!(validate_password_strength("Short1!"), Err(WeakPassword::TooShort));
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), WeakPassword> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(WeakPassword::TooShort);
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(WeakPassword::MissingDigit);
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(WeakPassword::MissingUppercase);
    }

    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(WeakPassword::MissingLowercase);
    }

    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err(WeakPassword::MissingSymbol);
    }

    Ok(())
}
