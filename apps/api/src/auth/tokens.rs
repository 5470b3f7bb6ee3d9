//! Token lifecycle: issue, validate, rotate and revoke HS256 bearer tokens.
//!
//! Tokens are self-contained. The only server-side state is the blacklist,
//! keyed by `jti`, which every validation consults after the signature and
//! expiry checks pass.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::blacklist::{BlacklistEntry, BlacklistStore};
use crate::auth::claims::{Claims, RawClaims, TokenType};
use crate::auth::error::AuthError;
use crate::config::Config;

/// Shortest HS256 secret accepted at startup.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// What a successful `validate` tells the caller about the token.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedToken {
    pub subject: String,
    pub jti: String,
    pub token_type: TokenType,
    pub expires_at: chrono::DateTime<Utc>,
}

pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
    blacklist: Arc<dyn BlacklistStore>,
}

impl TokenManager {
    pub fn new(
        secret: &[u8],
        access_ttl: Duration,
        refresh_ttl: Duration,
        blacklist: Arc<dyn BlacklistStore>,
    ) -> Result<Self, AuthError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::InvalidKey(format!(
                "HS256 secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
            blacklist,
        })
    }

    pub fn from_config(
        config: &Config,
        blacklist: Arc<dyn BlacklistStore>,
    ) -> Result<Self, AuthError> {
        Self::new(
            config.jwt_secret.as_bytes(),
            Duration::minutes(config.access_token_exp_minutes),
            Duration::days(config.refresh_token_exp_days),
            blacklist,
        )
    }

    pub fn issue_access_token(&self, subject: &str) -> Result<String, AuthError> {
        self.issue(subject, TokenType::Access, self.access_ttl)
    }

    pub fn issue_refresh_token(&self, subject: &str) -> Result<String, AuthError> {
        self.issue(subject, TokenType::Refresh, self.refresh_ttl)
    }

    pub fn issue_pair(&self, subject: &str) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(subject)?,
            refresh_token: self.issue_refresh_token(subject)?,
        })
    }

    fn issue(&self, subject: &str, token_type: TokenType, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            jti: Uuid::new_v4().to_string(),
            token_type,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidKey(format!("Encoding failed: {e}")))?;

        debug!(subject, jti = %claims.jti, %token_type, "issued token");
        Ok(token)
    }

    /// Signature, expiry and claim presence. No blacklist lookup.
    fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<RawClaims>(token, &self.decoding_key, &self.validation)?;
        Claims::try_from(data.claims)
    }

    /// Full validation: signature and expiry, then type, then blacklist.
    pub async fn validate(
        &self,
        token: &str,
        expected: TokenType,
    ) -> Result<ValidatedToken, AuthError> {
        let claims = self.decode(token)?;

        if claims.token_type != expected {
            return Err(AuthError::WrongTokenType {
                expected: expected.as_str(),
                actual: claims.token_type.as_str(),
            });
        }

        if self.blacklist.is_blacklisted(&claims.jti, Utc::now()).await? {
            debug!(jti = %claims.jti, "rejected blacklisted token");
            return Err(AuthError::Revoked);
        }

        Ok(ValidatedToken {
            expires_at: claims.expires_at()?,
            subject: claims.sub,
            jti: claims.jti,
            token_type: claims.token_type,
        })
    }

    /// Single-use refresh: the presented token is blacklisted before a new
    /// pair is issued. The blacklist insert is conditional, so of two
    /// concurrent rotations of the same token only one gets a new pair.
    pub async fn rotate_refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let old = self.validate(refresh_token, TokenType::Refresh).await?;

        let inserted = self
            .blacklist
            .insert_if_absent(BlacklistEntry {
                jti: old.jti.clone(),
                token_type: TokenType::Refresh,
                expires_at: old.expires_at,
                added_at: Utc::now(),
            })
            .await?;

        if !inserted {
            warn!(jti = %old.jti, subject = %old.subject, "refresh token replayed during rotation");
            return Err(AuthError::Revoked);
        }

        let pair = self.issue_pair(&old.subject)?;
        info!(subject = %old.subject, rotated_jti = %old.jti, "refresh token rotated");
        Ok(pair)
    }

    /// Blacklists `token` (access or refresh) until its own expiry.
    /// Revoking an already revoked token succeeds without a second entry.
    pub async fn revoke(&self, token: &str) -> Result<TokenType, AuthError> {
        let claims = self.decode(token)?;

        let inserted = self
            .blacklist
            .insert_if_absent(BlacklistEntry {
                jti: claims.jti.clone(),
                token_type: claims.token_type,
                expires_at: claims.expires_at()?,
                added_at: Utc::now(),
            })
            .await?;

        if inserted {
            info!(jti = %claims.jti, token_type = %claims.token_type, "token revoked");
        } else {
            debug!(jti = %claims.jti, "token already revoked");
        }
        Ok(claims.token_type)
    }

    pub async fn purge_expired_blacklist(&self) -> Result<u64, AuthError> {
        self.blacklist.purge_expired(Utc::now()).await
    }
}
