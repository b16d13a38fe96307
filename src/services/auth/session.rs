//! Server-side admin sessions.
//!
//! - The browser holds an opaque random id (cookie); the store holds a JSON record.
//! - Storage key is `session:<sha256(id)>`, so a leaked store dump does not leak usable cookies.
//! - Every successful load pushes the expiry forward (sliding TTL).
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{future::Future, pin::Pin, time::Duration};
use thiserror::Error;

use crate::services::auth::identity::Identity;
use crate::services::cache::{CacheClient, CacheError};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("session record encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("random source failure")]
    Random,
    #[error("session id collision")]
    Collision,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub authenticated: bool,
    pub user: Option<Identity>,
    pub token: Option<String>,
    pub created_at: i64,
}

impl std::fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecord")
            .field("authenticated", &self.authenticated)
            .field("user", &self.user.as_ref().map(|u| &u.username))
            .field("token", &self.token.is_some())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Per-request view of the caller's session, inserted into request extensions
/// by the `load_session` middleware.
#[derive(Debug, Clone, Default)]
pub struct SessionCtx {
    pub id: Option<String>,
    pub record: Option<SessionRecord>,
}

impl SessionCtx {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.record
            .as_ref()
            .is_some_and(|r| r.authenticated && r.user.is_some())
    }
}

pub trait SessionStore: Send + Sync {
    fn ttl(&self) -> Duration;

    // Persist a new record and return the freshly generated session id.
    fn create<'a>(
        &'a self,
        record: &'a SessionRecord,
    ) -> BoxFuture<'a, Result<String, SessionError>>;

    // Ok(None) => unknown / expired id
    fn load<'a>(
        &'a self,
        session_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<SessionRecord>, SessionError>>;

    // Idempotent.
    fn destroy<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, Result<(), SessionError>>;
}

#[derive(Clone)]
pub struct CacheSessionStore<C: CacheClient> {
    cache: C,
    ttl: Duration,
}

impl<C: CacheClient> CacheSessionStore<C> {
    pub fn new(cache: C, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }
}

pub fn generate_session_id() -> Result<String, SessionError> {
    // 32 bytes of entropy -> URL-safe base64 without padding.
    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes).map_err(|_| SessionError::Random)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn storage_key(session_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(session_id.as_bytes());
    format!("session:{}", URL_SAFE_NO_PAD.encode(hasher.finalize()))
}

impl<C: CacheClient> SessionStore for CacheSessionStore<C> {
    fn ttl(&self) -> Duration {
        self.ttl
    }

    fn create<'a>(
        &'a self,
        record: &'a SessionRecord,
    ) -> BoxFuture<'a, Result<String, SessionError>> {
        Box::pin(async move {
            let value = serde_json::to_string(record)?;
            let session_id = generate_session_id()?;
            let stored = self
                .cache
                .set_if_absent_with_ttl(&storage_key(&session_id), &value, self.ttl)
                .await?;
            if !stored {
                return Err(SessionError::Collision);
            }
            Ok(session_id)
        })
    }

    fn load<'a>(
        &'a self,
        session_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<SessionRecord>, SessionError>> {
        Box::pin(async move {
            let raw = self
                .cache
                .get_and_touch(&storage_key(session_id), self.ttl)
                .await?;
            match raw {
                Some(s) => Ok(Some(serde_json::from_str(&s)?)),
                None => Ok(None),
            }
        })
    }

    fn destroy<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, Result<(), SessionError>> {
        Box::pin(async move {
            self.cache.del(&storage_key(session_id)).await?;
            Ok(())
        })
    }
}
