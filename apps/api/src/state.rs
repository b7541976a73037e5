use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::jwt::JwtAuth;
use crate::config::Config;
use crate::llm_client::TextCompleter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Completion provider. `LlmClient` in production, scripted in tests.
    pub llm: Arc<dyn TextCompleter>,
    pub config: Config,
    pub jwt: Arc<JwtAuth>,
}
