use thiserror::Error;

/// Failures raised by token validation, rotation, revocation and the
/// password policy. Route handlers map these onto HTTP rejections in
/// `crate::errors`.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed token, bad signature, or expired per the JWT `exp` check.
    #[error("Token signature or claims are invalid")]
    InvalidSignature,

    #[error("Expected a {expected} token, got {actual}")]
    WrongTokenType {
        expected: &'static str,
        actual: &'static str,
    },

    /// The token's `jti` has an active blacklist entry. Also covers replay
    /// of a refresh token that was already rotated out.
    #[error("Token has been revoked")]
    Revoked,

    #[error("Token is missing required claim '{0}'")]
    MissingClaims(&'static str),

    #[error("Password does not meet complexity requirements: {0}")]
    WeakPassword(String),

    #[error("Blacklist storage error: {0}")]
    Storage(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::Storage(e.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match e.kind() {
            ErrorKind::MissingRequiredClaim(claim) if claim == "exp" => {
                AuthError::MissingClaims("exp")
            }
            _ => AuthError::InvalidSignature,
        }
    }
}
