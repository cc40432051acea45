//! Explicit session context: who is signed in and which theme they prefer.
//!
//! Everything that needs identity or theme receives an `AppContext`; nothing reads
//! ambient state. Both values are a get-current / subscribe pair over `tokio::sync::watch`.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::identity::{
    AuthError, AuthProvider, AuthSession, Identity, IdentityGateway, ProviderCredential,
    SignInForm, SignUpForm,
};
use crate::render::Theme;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct AppContext {
    gateway: Arc<dyn IdentityGateway>,
    store: Arc<dyn DocumentStore>,
    identity: Arc<watch::Sender<Option<Identity>>>,
    theme: Arc<watch::Sender<Theme>>,
}

impl AppContext {
    /// A signed-out context.
    pub fn new(gateway: Arc<dyn IdentityGateway>, store: Arc<dyn DocumentStore>) -> Self {
        let (identity, _) = watch::channel(None);
        let (theme, _) = watch::channel(Theme::default());
        Self {
            gateway,
            store,
            identity: Arc::new(identity),
            theme: Arc::new(theme),
        }
    }

    /// A context already resolved to `identity`, e.g. from a bearer token.
    pub fn for_identity(
        gateway: Arc<dyn IdentityGateway>,
        store: Arc<dyn DocumentStore>,
        identity: Identity,
        theme: Theme,
    ) -> Self {
        let ctx = Self::new(gateway, store);
        ctx.identity.send_replace(Some(identity));
        ctx.theme.send_replace(theme);
        ctx
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    // ── Identity ────────────────────────────────────────────────────────────

    pub fn current_identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    /// Receives the current identity immediately and every change after it.
    #[allow(dead_code)]
    pub fn subscribe_identity(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }

    pub async fn sign_in(&self, form: &SignInForm) -> Result<AuthSession, AuthError> {
        let email = form.validate()?;
        let session = self
            .gateway
            .sign_in(email, &form.password)
            .await
            .map_err(|e| log_auth_failure("sign-in", e))?;
        self.publish(&session);
        Ok(session)
    }

    /// Creates the account, then applies the optional display name. A failed display-name
    /// update is logged and the new account is kept.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<AuthSession, AuthError> {
        let email = form.validate()?;
        let mut session = self
            .gateway
            .sign_up(email, &form.password)
            .await
            .map_err(|e| log_auth_failure("sign-up", e))?;

        if let Some(name) = form.display_name() {
            match self.gateway.set_display_name(&session.id_token, name).await {
                Ok(identity) => session.identity = identity,
                Err(e) => warn!("Account created but setting display name failed: {e}"),
            }
        }

        self.publish(&session);
        Ok(session)
    }

    pub async fn sign_in_with_provider(
        &self,
        provider: AuthProvider,
        credential: &ProviderCredential,
    ) -> Result<AuthSession, AuthError> {
        let session = self
            .gateway
            .sign_in_with_provider(provider, credential)
            .await
            .map_err(|e| log_auth_failure("provider sign-in", e))?;
        self.publish(&session);
        Ok(session)
    }

    pub async fn sign_out(&self, id_token: &str) -> Result<(), AuthError> {
        self.gateway.sign_out(id_token).await?;
        self.identity.send_replace(None);
        Ok(())
    }

    /// Re-establishes the identity behind a stored token.
    #[allow(dead_code)]
    pub async fn restore(&self, id_token: &str) -> Result<Identity, AuthError> {
        let identity = self.gateway.resolve(id_token).await?;
        self.identity.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    fn publish(&self, session: &AuthSession) {
        info!(
            "Signed in {} via {:?}",
            session.identity.uid, session.identity.provider
        );
        self.identity.send_replace(Some(session.identity.clone()));
    }

    // ── Theme ───────────────────────────────────────────────────────────────

    pub fn theme(&self) -> Theme {
        *self.theme.borrow()
    }

    #[allow(dead_code)]
    pub fn subscribe_theme(&self) -> watch::Receiver<Theme> {
        self.theme.subscribe()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.theme.send_replace(theme);
    }

    #[allow(dead_code)]
    pub fn toggle_theme(&self) -> Theme {
        let next = self.theme().toggled();
        self.set_theme(next);
        next
    }
}

fn log_auth_failure(action: &str, e: AuthError) -> AuthError {
    if e.is_client_error() {
        warn!("{action} rejected: {e}");
    } else {
        tracing::error!("{action} failed: {e}");
    }
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::fakes::FakeIdentityGateway;
    use crate::store::MemoryDocumentStore;

    fn make_ctx() -> AppContext {
        AppContext::new(
            Arc::new(FakeIdentityGateway::with_account("ada@example.com", "secret1", "u1")),
            Arc::new(MemoryDocumentStore::new()),
        )
    }

    fn sign_in_form(password: &str) -> SignInForm {
        SignInForm {
            email: "ada@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_identity_changes_are_published() {
        let ctx = make_ctx();
        let mut rx = ctx.subscribe_identity();
        assert!(rx.borrow().is_none());

        ctx.sign_in(&sign_in_form("secret1")).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().map(|i| i.uid.as_str()), Some("u1"));
        assert_eq!(ctx.current_identity().unwrap().uid, "u1");

        ctx.sign_out("token-u1").await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }

    #[tokio::test]
    async fn test_failed_sign_in_leaves_identity_unset() {
        let ctx = make_ctx();
        let err = ctx.sign_in(&sign_in_form("wrong")).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert!(ctx.current_identity().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_applies_display_name() {
        let ctx = make_ctx();
        let form = SignUpForm {
            email: "grace@example.com".to_string(),
            password: "cobol60".to_string(),
            confirm_password: "cobol60".to_string(),
            display_name: Some("Grace".to_string()),
        };
        let session = ctx.sign_up(&form).await.unwrap();
        assert_eq!(session.identity.display_name.as_deref(), Some("Grace"));
        assert_eq!(
            ctx.current_identity().unwrap().display_name.as_deref(),
            Some("Grace")
        );
    }

    #[tokio::test]
    async fn test_sign_up_mismatch_never_reaches_gateway() {
        let ctx = make_ctx();
        let form = SignUpForm {
            email: "grace@example.com".to_string(),
            password: "cobol60".to_string(),
            confirm_password: "cobol61".to_string(),
            display_name: None,
        };
        assert_eq!(ctx.sign_up(&form).await.unwrap_err(), AuthError::PasswordMismatch);
        let err = ctx
            .sign_in(&SignInForm {
                email: "grace@example.com".to_string(),
                password: "cobol60".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_provider_sign_in_sets_provider() {
        let ctx = make_ctx();
        let credential = ProviderCredential {
            access_token: Some("gh-token".to_string()),
            id_token: None,
        };
        let session = ctx
            .sign_in_with_provider(AuthProvider::GitHub, &credential)
            .await
            .unwrap();
        assert_eq!(session.identity.provider, AuthProvider::GitHub);

        let cancelled = ctx
            .sign_in_with_provider(AuthProvider::Google, &ProviderCredential::default())
            .await
            .unwrap_err();
        assert_eq!(cancelled, AuthError::ProviderCancelled);
    }

    #[tokio::test]
    async fn test_restore_from_token() {
        let ctx = make_ctx();
        assert_eq!(ctx.restore("token-u1").await.unwrap().uid, "u1");
        assert!(ctx.current_identity().is_some());
        assert_eq!(ctx.restore("bogus").await.unwrap_err(), AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn test_theme_pair() {
        let ctx = make_ctx();
        let mut rx = ctx.subscribe_theme();
        assert_eq!(ctx.theme(), Theme::Light);
        assert_eq!(ctx.toggle_theme(), Theme::Dark);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Theme::Dark);
    }
}
