//! Axum route handlers for the Auth API.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::claims::TokenType;
use crate::auth::extractor::{AuthUser, BearerToken};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::tokens::TokenPair;
use crate::auth::users::{create_user, find_user_by_username};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

impl TokenResponse {
    fn bearer(pair: TokenPair, user_id: Option<Uuid>) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "bearer".to_string(),
            user_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurgeResponse {
    pub message: String,
    pub removed: u64,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub email: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if !is_plausible_email(&email) {
        return Err(AppError::Validation(format!("Invalid email address '{email}'")));
    }

    if find_user_by_username(&state.db, &username).await?.is_some() {
        return Err(AppError::Validation("Username already registered".into()));
    }

    // Argon2 blocks for tens of milliseconds; run it on the blocking pool.
    let password = req.password;
    let hashed = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(anyhow::Error::from)??;

    let user = create_user(&state.db, &username, &email, &hashed)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if duplicate {
                AppError::Validation("Username or email already registered".into())
            } else {
                AppError::Database(e)
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created".into(),
            user_id: user.id,
        }),
    ))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = find_user_by_username(&state.db, req.username.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    let hash = user.hashed_password.clone();
    let password = req.password;
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(anyhow::Error::from)??;
    if !matches {
        return Err(AppError::Unauthorized);
    }

    let pair = state.tokens.issue_pair(&user.username)?;
    Ok(Json(TokenResponse::bearer(pair, Some(user.id))))
}

/// POST /api/auth/refresh
///
/// The bearer token must be a refresh token. It is consumed: a second
/// refresh with the same token is rejected as revoked.
pub async fn handle_refresh(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<TokenResponse>, AppError> {
    let presented = state.tokens.validate(&token, TokenType::Refresh).await?;

    if find_user_by_username(&state.db, &presented.subject)
        .await?
        .is_none()
    {
        return Err(AppError::Unauthorized);
    }

    let pair = state.tokens.rotate_refresh(&token).await?;
    Ok(Json(TokenResponse::bearer(pair, None)))
}

/// POST /api/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<MessageResponse>, AppError> {
    let token_type = state.tokens.revoke(&token).await?;
    let label = match token_type {
        TokenType::Access => "Access",
        TokenType::Refresh => "Refresh",
    };
    Ok(Json(MessageResponse {
        message: format!("{label} token successfully blacklisted."),
    }))
}

/// POST /api/auth/clean-blacklist
pub async fn handle_clean_blacklist(
    State(state): State<AppState>,
) -> Result<Json<PurgeResponse>, AppError> {
    let removed = state.tokens.purge_expired_blacklist().await?;
    Ok(Json(PurgeResponse {
        message: "Expired blacklisted tokens cleaned up.".into(),
        removed,
    }))
}

/// GET /api/auth/me
pub async fn handle_me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        username: user.username,
        email: user.email,
    })
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plausible_email() {
        assert!(is_plausible_email("ada@example.com"));
        assert!(!is_plausible_email("ada.example.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("ada@localhost"));
        assert!(!is_plausible_email("ada@example."));
        assert!(!is_plausible_email("a da@example.com"));
    }
}
