//! Auth gate: resolves "who is calling" from a session or a bearer token.
//!
//! Handlers never look at cookies or tokens themselves. The middleware calls
//! one of the `authenticate_*` operations and hands the resulting `Identity`
//! downstream.
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::repos::error::RepoError;
use crate::services::auth::account::AccountStore;
use crate::services::auth::identity::{Identity, NewAccount, Role};
use crate::services::auth::password;
use crate::services::auth::session::{SessionCtx, SessionRecord, SessionStore};
use crate::services::auth::token::{TokenError, TokenService};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("inactive account")]
    InactiveAccount,
    #[error("unauthorized")]
    Unauthorized,
    #[error("account already exists")]
    AccountExists,
    #[error("internal auth failure")]
    Internal,
}

/// Which mechanism authenticated the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChannel {
    Session,
    Token,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub identity: Identity,
    pub token: String,
    pub session_id: String,
}

#[derive(Clone)]
pub struct AuthGate {
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<dyn SessionStore>,
    tokens: TokenService,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("tokens", &self.tokens)
            .finish()
    }
}

fn now() -> i64 {
    Utc::now().timestamp()
}

impl AuthGate {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        sessions: Arc<dyn SessionStore>,
        tokens: TokenService,
    ) -> Self {
        Self {
            accounts,
            sessions,
            tokens,
        }
    }

    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    /// Pure lookup: the session must carry the authenticated flag and an identity.
    pub fn authenticate_by_session(&self, session: &SessionCtx) -> Option<Identity> {
        if !session.is_authenticated() {
            return None;
        }
        session.record.as_ref().and_then(|r| r.user.clone())
    }

    pub async fn authenticate_by_token(&self, token: &str) -> Result<Identity, AuthError> {
        self.authenticate_by_token_at(token, now()).await
    }

    pub async fn authenticate_by_token_at(
        &self,
        token: &str,
        now: i64,
    ) -> Result<Identity, AuthError> {
        let claims = self.tokens.verify(token, now).map_err(|e| {
            match &e {
                TokenError::MissingSecret => {
                    error!("bearer token presented but no signing secret is configured")
                }
                other => debug!(error = %other, "bearer token rejected"),
            }
            AuthError::InvalidToken
        })?;

        let account = self
            .accounts
            .find_by_id(claims.sub)
            .await
            .map_err(|e| {
                warn!(error = ?e, "account lookup failed during token authentication");
                AuthError::Unauthorized
            })?
            .ok_or_else(|| {
                debug!(sub = %claims.sub, "token subject no longer exists");
                AuthError::InvalidToken
            })?;

        if !account.is_active {
            info!(sub = %claims.sub, "token presented for inactive account");
            return Err(AuthError::InactiveAccount);
        }

        Ok(account.identity())
    }

    /// Session first, bearer token second. Any failure collapses into `Unauthorized`.
    pub async fn authenticate_hybrid(
        &self,
        session: &SessionCtx,
        bearer: Option<&str>,
    ) -> Result<(Identity, AuthChannel), AuthError> {
        if let Some(identity) = self.authenticate_by_session(session) {
            return Ok((identity, AuthChannel::Session));
        }

        let Some(token) = bearer else {
            return Err(AuthError::Unauthorized);
        };

        match self.authenticate_by_token(token).await {
            Ok(identity) => Ok((identity, AuthChannel::Token)),
            Err(e) => {
                debug!(error = %e, "hybrid authentication: token path failed");
                Err(AuthError::Unauthorized)
            }
        }
    }

    /// Unknown account, wrong password and inactive account all fail the same way.
    pub async fn login(&self, login: &str, plaintext: &str) -> Result<LoginOutcome, AuthError> {
        let login = login.trim();
        let plaintext = plaintext.trim();
        if login.is_empty() || plaintext.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let account = self
            .accounts
            .find_by_username_or_email(login)
            .await
            .map_err(|e| {
                error!(error = ?e, "account lookup failed during login");
                AuthError::Internal
            })?;

        let Some(account) = account else {
            password::verify_dummy(plaintext);
            warn!("failed login attempt");
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify(plaintext, &account.password_hash) || !account.is_active {
            warn!(user_id = %account.id, "failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let identity = account.identity();
        let issued_at = now();
        let token = self.tokens.sign(&identity, issued_at).map_err(|e| {
            error!(error = %e, "cannot mint bearer token at login");
            AuthError::Internal
        })?;

        let record = SessionRecord {
            authenticated: true,
            user: Some(identity.clone()),
            token: Some(token.clone()),
            created_at: issued_at,
        };
        let session_id = self.sessions.create(&record).await.map_err(|e| {
            error!(error = %e, "cannot create session at login");
            AuthError::Internal
        })?;

        info!(user_id = %identity.id, username = %identity.username, "login succeeded");

        Ok(LoginOutcome {
            identity,
            token,
            session_id,
        })
    }

    /// Destroys the session if there is one. Store failures are logged, not surfaced.
    pub async fn logout(&self, session: &SessionCtx) {
        let Some(session_id) = session.id.as_deref() else {
            return;
        };
        let username = session
            .record
            .as_ref()
            .and_then(|r| r.user.as_ref())
            .map(|u| u.username.as_str())
            .unwrap_or("unknown");

        if let Err(e) = self.sessions.destroy(session_id).await {
            error!(error = %e, "failed to destroy session");
        }
        info!(username = %username, "logged out");
    }

    /// Creates an admin account and mints a token for it.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        plaintext: &str,
    ) -> Result<(Identity, String), AuthError> {
        let username = username.trim();
        let email = email.trim().to_lowercase();
        let plaintext = plaintext.trim();

        for login in [username, email.as_str()] {
            let existing = self
                .accounts
                .find_by_username_or_email(login)
                .await
                .map_err(|e| {
                    error!(error = ?e, "account lookup failed during registration");
                    AuthError::Internal
                })?;
            if existing.is_some() {
                warn!(username = %username, "registration failed: account exists");
                return Err(AuthError::AccountExists);
            }
        }

        let password_hash = password::hash(plaintext).map_err(|e| {
            error!(error = %e, "password hashing failed");
            AuthError::Internal
        })?;

        let account = self
            .accounts
            .create(&NewAccount {
                username: username.to_string(),
                email,
                password_hash,
                role: Role::Admin,
            })
            .await
            .map_err(|e| match e {
                RepoError::Conflict => AuthError::AccountExists,
                RepoError::Db(err) => {
                    error!(error = %err, "account insert failed");
                    AuthError::Internal
                }
            })?;

        let identity = account.identity();
        let token = self.tokens.sign(&identity, now()).map_err(|e| {
            error!(error = %e, "cannot mint bearer token at registration");
            AuthError::Internal
        })?;

        info!(user_id = %identity.id, username = %identity.username, "account registered");
        Ok((identity, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::account::testing::InMemoryAccountStore;
    use crate::services::auth::session::CacheSessionStore;
    use crate::services::cache::MemoryCacheClient;
    use std::time::Duration;

    fn gate_with(accounts: InMemoryAccountStore, secret: Option<&str>) -> AuthGate {
        let sessions = CacheSessionStore::new(MemoryCacheClient::new(), Duration::from_secs(600));
        AuthGate::new(
            Arc::new(accounts),
            Arc::new(sessions),
            TokenService::new(secret, 3600),
        )
    }

    fn setup() -> (AuthGate, InMemoryAccountStore, uuid::Uuid) {
        let (accounts, id) = InMemoryAccountStore::with_admin("admin", "Admin@Example.com", "pw");
        (gate_with(accounts.clone(), Some("secret")), accounts, id)
    }

    async fn session_ctx(gate: &AuthGate, session_id: &str) -> SessionCtx {
        SessionCtx {
            id: Some(session_id.to_string()),
            record: gate.sessions().load(session_id).await.unwrap(),
        }
    }

    #[tokio::test]
    async fn login_by_username_yields_token_and_session() {
        let (gate, _, id) = setup();
        let out = gate.login("admin", "pw").await.unwrap();
        assert_eq!(out.identity.id, id);

        let ctx = session_ctx(&gate, &out.session_id).await;
        assert_eq!(gate.authenticate_by_session(&ctx).unwrap().id, id);
        assert_eq!(gate.authenticate_by_token(&out.token).await.unwrap().id, id);
    }

    #[tokio::test]
    async fn login_by_email_is_case_insensitive_and_trimmed() {
        let (gate, _, id) = setup();
        let out = gate.login("  ADMIN@example.COM ", " pw ").await.unwrap();
        assert_eq!(out.identity.id, id);
    }

    #[tokio::test]
    async fn unknown_account_and_wrong_password_fail_identically() {
        let (gate, _, _) = setup();
        let a = gate.login("nobody", "pw").await.unwrap_err();
        let b = gate.login("admin", "nope").await.unwrap_err();
        assert!(matches!(a, AuthError::InvalidCredentials));
        assert!(matches!(b, AuthError::InvalidCredentials));
        assert_eq!(a.to_string(), b.to_string());
    }

    #[tokio::test]
    async fn inactive_account_cannot_log_in() {
        let (gate, accounts, id) = setup();
        accounts.set_active(id, false);
        assert!(matches!(
            gate.login("admin", "pw").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn deactivation_revokes_token() {
        let (gate, accounts, id) = setup();
        let out = gate.login("admin", "pw").await.unwrap();
        accounts.set_active(id, false);
        assert!(matches!(
            gate.authenticate_by_token(&out.token).await,
            Err(AuthError::InactiveAccount)
        ));
    }

    #[tokio::test]
    async fn deleted_account_token_is_invalid() {
        let (gate, accounts, id) = setup();
        let out = gate.login("admin", "pw").await.unwrap();
        accounts.remove(id);
        assert!(matches!(
            gate.authenticate_by_token(&out.token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn store_failure_on_token_path_is_unauthorized() {
        let (gate, accounts, _) = setup();
        let out = gate.login("admin", "pw").await.unwrap();
        accounts.fail_lookups();
        assert!(matches!(
            gate.authenticate_by_token(&out.token).await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn token_expires_at_boundary() {
        let (gate, _, _) = setup();
        let out = gate.login("admin", "pw").await.unwrap();
        let iat = gate.tokens.verify(&out.token, 0).unwrap().iat;
        assert!(gate.authenticate_by_token_at(&out.token, iat + 3599).await.is_ok());
        assert!(matches!(
            gate.authenticate_by_token_at(&out.token, iat + 3600).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn hybrid_prefers_session_then_token() {
        let (gate, _, id) = setup();
        let out = gate.login("admin", "pw").await.unwrap();

        let ctx = session_ctx(&gate, &out.session_id).await;
        let (who, channel) = gate.authenticate_hybrid(&ctx, None).await.unwrap();
        assert_eq!((who.id, channel), (id, AuthChannel::Session));

        let anon = SessionCtx::anonymous();
        let (who, channel) = gate
            .authenticate_hybrid(&anon, Some(&out.token))
            .await
            .unwrap();
        assert_eq!((who.id, channel), (id, AuthChannel::Token));

        assert!(matches!(
            gate.authenticate_hybrid(&anon, None).await,
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            gate.authenticate_hybrid(&anon, Some("garbage")).await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let (gate, _, _) = setup();
        let out = gate.login("admin", "pw").await.unwrap();
        let ctx = session_ctx(&gate, &out.session_id).await;

        gate.logout(&ctx).await;
        gate.logout(&ctx).await;
        gate.logout(&SessionCtx::anonymous()).await;

        let after = session_ctx(&gate, &out.session_id).await;
        assert!(gate.authenticate_by_session(&after).is_none());
    }

    #[tokio::test]
    async fn missing_secret_fails_closed() {
        let (accounts, _) = InMemoryAccountStore::with_admin("admin", "a@b.c", "pw");
        let gate = gate_with(accounts, None);
        assert!(matches!(
            gate.login("admin", "pw").await,
            Err(AuthError::Internal)
        ));
        assert!(matches!(
            gate.authenticate_by_token("a.b.c").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn register_rejects_duplicates() {
        let (gate, _, _) = setup();
        assert!(matches!(
            gate.register("admin", "other@example.com", "pw").await,
            Err(AuthError::AccountExists)
        ));
        assert!(matches!(
            gate.register("other", "admin@example.com", "pw").await,
            Err(AuthError::AccountExists)
        ));
        let (identity, token) = gate.register("new", "New@Example.com", "pw").await.unwrap();
        assert_eq!(identity.email, "new@example.com");
        assert_eq!(gate.authenticate_by_token(&token).await.unwrap().id, identity.id);
    }
}
