/// Factory: build `AuthGate` from application `Config`.
use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;

use crate::config::Config;
use crate::repos::account_repo::PgAccountStore;
use crate::services::auth::session::{CacheSessionStore, SessionStore};
use crate::services::auth::{AuthGate, TokenService};
use crate::services::cache::{MemoryCacheClient, ValkeyClient, client::ttl_seconds};

pub async fn build_auth_gate(config: &Config, db: PgPool) -> Result<AuthGate> {
    let ttl = ttl_seconds(config.session_ttl_seconds);

    let sessions: Arc<dyn SessionStore> = match config.redis_url.as_deref() {
        Some(url) => {
            let store = CacheSessionStore::new(ValkeyClient::new(url).await?, ttl);
            tracing::info!(backend = store.backend_name(), "session store ready");
            Arc::new(store)
        }
        None => {
            if config.app_env.is_production() {
                anyhow::bail!("REDIS_URL is required in production");
            }
            let store = CacheSessionStore::new(MemoryCacheClient::new(), ttl);
            tracing::warn!(
                backend = store.backend_name(),
                "REDIS_URL not set; sessions are kept in process memory"
            );
            Arc::new(store)
        }
    };

    let tokens = TokenService::new(config.jwt_secret.as_deref(), config.token_ttl_seconds);
    if !tokens.is_configured() {
        tracing::error!("JWT_SECRET not set; bearer tokens cannot be issued or verified");
    }

    Ok(AuthGate::new(
        Arc::new(PgAccountStore::new(db)),
        sessions,
        tokens,
    ))
}
