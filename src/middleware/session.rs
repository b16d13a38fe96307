//! Session loading (runs for every request).
//!
//! Reads the session cookie, loads the record, and inserts a per-request
//! `SessionCtx` into extensions. A store failure is logged and treated as
//! "no session"; it never fails the request.
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::services::auth::SessionCtx;
use crate::state::AppState;

pub async fn load_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = match jar.get(&state.config.session_cookie_name) {
        Some(cookie) if !cookie.value().is_empty() => {
            let sid = cookie.value().to_string();
            match state.auth.sessions().load(&sid).await {
                Ok(Some(record)) => SessionCtx {
                    id: Some(sid),
                    record: Some(record),
                },
                Ok(None) => SessionCtx::anonymous(),
                Err(e) => {
                    tracing::warn!(error = %e, "session load failed; continuing anonymously");
                    SessionCtx::anonymous()
                }
            }
        }
        _ => SessionCtx::anonymous(),
    };

    req.extensions_mut().insert(ctx);
    next.run(req).await
}

/// Lives as long as the server-side record's TTL.
pub fn session_cookie(state: &AppState, session_id: String) -> Cookie<'static> {
    let max_age = time::Duration::try_from(state.auth.sessions().ttl())
        .unwrap_or(time::Duration::MAX);

    Cookie::build((state.config.session_cookie_name.clone(), session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.app_env.is_production())
        .max_age(max_age)
        .build()
}

pub fn clear_session_cookie(state: &AppState, jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(state.config.session_cookie_name.clone()).path("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::account::testing::InMemoryAccountStore;
    use crate::state::testing::{test_config, test_state};

    #[tokio::test]
    async fn cookie_outlives_the_browser_for_the_session_ttl() {
        let state = test_state(InMemoryAccountStore::default(), test_config());
        let cookie = session_cookie(&state, "abc".into());
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(state.config.session_ttl_seconds as i64))
        );
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert!(cookie.to_string().contains("Max-Age=600"));
    }
}
