//! Auth guards. The router installs exactly one of these per protected route group.
//!
//! - `require_session`: admin pages; anonymous browsers go to `/admin/login`
//! - `require_token`: machine API; always 401 JSON on failure
//! - `require_hybrid`: session first, bearer token second; 401 JSON or redirect by `Accept`
//!
//! On success an `AuthCtx` is inserted into request extensions.
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::extractors::AuthCtx;
use crate::api::negotiate::{ResponseFormat, redirect};
use crate::error::AppError;
use crate::services::auth::{AuthChannel, SessionCtx};
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/admin/login";

/// `Authorization: Bearer <token>`; scheme is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn session_of(req: &Request) -> SessionCtx {
    req.extensions()
        .get::<SessionCtx>()
        .cloned()
        .unwrap_or_default()
}

fn deny(format: ResponseFormat) -> Response {
    match format {
        ResponseFormat::Json => AppError::Unauthorized.into_response(),
        ResponseFormat::Html => redirect(LOGIN_PATH, None),
    }
}

pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = session_of(&req);
    let Some(identity) = state.auth.authenticate_by_session(&session) else {
        tracing::debug!(path = %req.uri().path(), "no authenticated session");
        return deny(ResponseFormat::from_headers(req.headers()));
    };

    req.extensions_mut()
        .insert(AuthCtx::new(identity, AuthChannel::Session));
    next.run(req).await
}

pub async fn require_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or(AppError::Unauthorized)?;
    let identity = state.auth.authenticate_by_token(token).await?;

    req.extensions_mut()
        .insert(AuthCtx::new(identity, AuthChannel::Token));
    Ok(next.run(req).await)
}

pub async fn require_hybrid(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = session_of(&req);
    let result = state
        .auth
        .authenticate_hybrid(&session, bearer_token(req.headers()))
        .await;

    match result {
        Ok((identity, channel)) => {
            req.extensions_mut().insert(AuthCtx::new(identity, channel));
            next.run(req).await
        }
        Err(_) => deny(ResponseFormat::from_headers(req.headers())),
    }
}
