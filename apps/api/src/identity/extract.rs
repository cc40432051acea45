use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, Identity};
use crate::errors::AppError;
use crate::state::AppState;

/// The caller behind `Authorization: Bearer <id token>`, resolved through the gateway.
/// Handlers taking this extractor are unreachable without a valid token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: Identity,
    pub id_token: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let identity = state.identity.resolve(token).await?;
        Ok(AuthUser {
            identity,
            id_token: token.to_string(),
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
