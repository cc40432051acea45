//! Identity Gateway — authentication is consumed, never implemented here.
//!
//! `IdentityGateway` is the seam; `IdentityToolkitClient` talks to the hosted
//! Identity Toolkit REST API, and tests swap in in-process fakes.
//! Each gateway call is exactly one attempt: failures surface as `AuthError` and
//! are never retried.

pub mod extract;
pub mod handlers;
pub mod signup;
pub mod toolkit;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use extract::AuthUser;
pub use signup::{SignInForm, SignUpForm};
pub use toolkit::IdentityToolkitClient;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// How the identity signed in, as shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AuthProvider {
    #[default]
    Email,
    Google,
    GitHub,
}

impl AuthProvider {
    /// Maps a provider id such as `google.com` or `password`; anything unrecognised is email.
    pub fn from_provider_id(provider_id: &str) -> AuthProvider {
        if provider_id.contains("google") {
            AuthProvider::Google
        } else if provider_id.contains("github") {
            AuthProvider::GitHub
        } else {
            AuthProvider::Email
        }
    }

    /// Provider id used for OAuth token exchange. `None` for email/password.
    pub fn provider_id(&self) -> Option<&'static str> {
        match self {
            AuthProvider::Email => None,
            AuthProvider::Google => Some("google.com"),
            AuthProvider::GitHub => Some("github.com"),
        }
    }

    pub fn parse(raw: &str) -> Option<AuthProvider> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "google" | "google.com" => Some(AuthProvider::Google),
            "github" | "github.com" => Some(AuthProvider::GitHub),
            _ => None,
        }
    }
}

/// The authenticated principal. `uid` is the namespace all of its documents live under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub provider: AuthProvider,
    pub created_at: Option<DateTime<Utc>>,
}

/// An identity plus the tokens that prove it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub identity: Identity,
    pub id_token: String,
    pub refresh_token: String,
    /// Lifetime of `id_token` in seconds, as reported by the provider.
    pub expires_in: Option<u64>,
}

/// OAuth credential obtained by the browser from the provider's consent flow.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredential {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
}

impl ProviderCredential {
    pub fn is_empty(&self) -> bool {
        self.access_token.as_deref().map_or(true, str::is_empty)
            && self.id_token.as_deref().map_or(true, str::is_empty)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailInUse,

    #[error("Password should be at least 6 characters")]
    WeakPassword,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Sign-in was cancelled")]
    ProviderCancelled,

    #[error("Provider sign-in failed: {0}")]
    ProviderFailed(String),

    #[error("Too many attempts, try again later")]
    TooManyAttempts,

    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Identity service unreachable: {0}")]
    Network(String),

    #[error("Identity service rejected the request: {0}")]
    Rejected(String),
}

impl AuthError {
    /// Errors caused by the caller's input rather than by the identity service.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AuthError::Network(_) | AuthError::Rejected(_))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gateway trait
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_in_with_provider(
        &self,
        provider: AuthProvider,
        credential: &ProviderCredential,
    ) -> Result<AuthSession, AuthError>;

    /// Ends the session. Tokens are bearer tokens, so this only has to make the caller forget them.
    async fn sign_out(&self, id_token: &str) -> Result<(), AuthError>;

    /// Resolves an id token to the identity it was issued for.
    async fn resolve(&self, id_token: &str) -> Result<Identity, AuthError>;

    async fn set_display_name(
        &self,
        id_token: &str,
        display_name: &str,
    ) -> Result<Identity, AuthError>;
}
