//! Password policy and Argon2id hashing.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::error::AuthError;

pub const MIN_PASSWORD_LEN: usize = 10;
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,<.>/?";

/// Checks length (in characters) and that every character class is present.
/// Returns `WeakPassword` naming the first rule that failed.
pub fn check_password_policy(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(format!(
            "must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let rules: [(&str, fn(char) -> bool); 4] = [
        ("an uppercase letter", char::is_uppercase),
        ("a lowercase letter", char::is_lowercase),
        ("a digit", char::is_numeric),
        ("a symbol", |c: char| PASSWORD_SYMBOLS.contains(c)),
    ];

    for (label, rule) in rules {
        if !password.chars().any(rule) {
            return Err(AuthError::WeakPassword(format!("must contain {label}")));
        }
    }

    Ok(())
}

/// Enforces the policy, then hashes into a salted PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    check_password_policy(password)?;

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Constant-time check of `password` against a stored PHC hash.
/// An unparsable hash is an error; a mismatch is `Ok(false)`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| AuthError::Hashing(format!("stored hash: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hashing(e.to_string())),
    }
}
