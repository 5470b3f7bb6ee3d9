use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::auth::claims::TokenType;
use crate::auth::users::find_user_by_username;
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// Raw token from an `Authorization: Bearer <token>` header. Not validated.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let (scheme, token) = header.split_once(' ').ok_or(AppError::Unauthorized)?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        Ok(BearerToken(token.to_string()))
    }
}

/// The user behind a valid, non-revoked access token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let validated = state.tokens.validate(&token, TokenType::Access).await?;

        let user = find_user_by_username(&state.db, &validated.subject)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser(user))
    }
}
