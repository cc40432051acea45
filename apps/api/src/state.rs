use std::sync::Arc;

use crate::config::Config;
use crate::export::ExportPipeline;
use crate::identity::{Identity, IdentityGateway};
use crate::render::Theme;
use crate::session::AppContext;
use crate::store::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Identity Toolkit client in production, a fake in tests.
    pub identity: Arc<dyn IdentityGateway>,
    /// Postgres when `DATABASE_URL` is set, otherwise in-process memory.
    pub store: Arc<dyn DocumentStore>,
    pub export: ExportPipeline,
}

impl AppState {
    /// A signed-out session context.
    pub fn context(&self) -> AppContext {
        AppContext::new(Arc::clone(&self.identity), Arc::clone(&self.store))
    }

    /// A session context for a request whose bearer token resolved to `identity`.
    pub fn context_for(&self, identity: Identity, theme: Theme) -> AppContext {
        AppContext::for_identity(
            Arc::clone(&self.identity),
            Arc::clone(&self.store),
            identity,
            theme,
        )
    }
}
