use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::services::auth::SessionCtx;

/// The caller's session as loaded by `middleware::session::load_session`.
/// Anonymous when the middleware did not run or found nothing.
pub struct CurrentSession(pub SessionCtx);

impl<S: Send + Sync> FromRequestParts<S> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession(
            parts
                .extensions
                .get::<SessionCtx>()
                .cloned()
                .unwrap_or_default(),
        ))
    }
}
