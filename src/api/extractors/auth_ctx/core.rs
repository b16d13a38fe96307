use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

use super::AuthCtx;

/// Handler-side access to `AuthCtx`.
/// The guard middleware must have inserted it; otherwise the route is misconfigured
/// and the caller gets a 401 rather than anonymous access.
pub struct AuthCtxExtractor(pub AuthCtx);

impl<S: Send + Sync> FromRequestParts<S> for AuthCtxExtractor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or(AppError::Unauthorized)
    }
}
