use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims carried by every token this service signs.
#[derive(Debug, Clone, Serialize)]
pub struct Claims {
    pub sub: String,
    pub jti: String,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
}

/// Wire shape used when decoding, so a verified token that lacks a claim is
/// reported as `MissingClaims` rather than a generic decode failure.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    pub sub: Option<String>,
    pub jti: Option<String>,
    pub token_type: Option<TokenType>,
    pub iat: Option<i64>,
    pub exp: Option<i64>,
}

impl TryFrom<RawClaims> for Claims {
    type Error = AuthError;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let sub = raw
            .sub
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingClaims("sub"))?;
        let jti = raw
            .jti
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingClaims("jti"))?;
        let token_type = raw.token_type.ok_or(AuthError::MissingClaims("token_type"))?;
        let exp = raw.exp.ok_or(AuthError::MissingClaims("exp"))?;

        let claims = Claims {
            sub,
            jti,
            token_type,
            iat: raw.iat.unwrap_or_default(),
            exp,
        };
        claims.expires_at()?;
        Ok(claims)
    }
}

impl Claims {
    /// `exp` as a timestamp. An `exp` chrono cannot represent is rejected
    /// like any other bad claim.
    pub fn expires_at(&self) -> Result<DateTime<Utc>, AuthError> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .ok_or(AuthError::InvalidSignature)
    }
}
