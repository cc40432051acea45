use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use super::extract::AuthUser;
use super::{AuthError, AuthProvider, AuthSession, Identity, ProviderCredential, SignInForm, SignUpForm};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ProviderSignInRequest {
    /// `google` or `github`.
    pub provider: String,
    #[serde(flatten)]
    pub credential: ProviderCredential,
}

/// POST /api/v1/auth/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(form): Json<SignInForm>,
) -> Result<Json<AuthSession>, AppError> {
    let session = state.context().sign_in(&form).await?;
    Ok(Json(session))
}

/// POST /api/v1/auth/sign-up
pub async fn handle_sign_up(
    State(state): State<AppState>,
    Json(form): Json<SignUpForm>,
) -> Result<(StatusCode, Json<AuthSession>), AppError> {
    let session = state.context().sign_up(&form).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/v1/auth/provider
pub async fn handle_provider_sign_in(
    State(state): State<AppState>,
    Json(req): Json<ProviderSignInRequest>,
) -> Result<Json<AuthSession>, AppError> {
    let provider = AuthProvider::parse(&req.provider).ok_or_else(|| {
        AuthError::ProviderFailed(format!("unsupported provider '{}'", req.provider))
    })?;
    let session = state
        .context()
        .sign_in_with_provider(provider, &req.credential)
        .await?;
    Ok(Json(session))
}

/// POST /api/v1/auth/sign-out
pub async fn handle_sign_out(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, AppError> {
    state
        .context_for(user.identity, Default::default())
        .sign_out(&user.id_token)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn handle_me(user: AuthUser) -> Json<Identity> {
    Json(user.identity)
}
