/*
 * Responsibility
 * - Decide per request whether the caller wants JSON or a browser redirect
 * - Build `303 See Other` redirects carrying `success` / `error` query parameters
 * - Render mutation results either way
 */
use std::convert::Infallible;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Html,
}

impl ResponseFormat {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let accepts_json = headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains("application/json"));

        let xhr = headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));

        if accepts_json || xhr {
            Self::Json
        } else {
            Self::Html
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ResponseFormat {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// `303 See Other` to `path`, optionally with one query parameter.
pub fn redirect(path: &str, query: Option<(&str, &str)>) -> Response {
    let location = match query {
        Some((k, v)) => {
            let qs = url::form_urlencoded::Serializer::new(String::new())
                .append_pair(k, v)
                .finish();
            format!("{path}?{qs}")
        }
        None => path.to_string(),
    };

    match HeaderValue::from_str(&location) {
        Ok(v) => (StatusCode::SEE_OTHER, [(header::LOCATION, v)]).into_response(),
        Err(_) => {
            tracing::error!(location = %location, "redirect target is not a valid header value");
            AppError::Internal.into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Render the outcome of an admin mutation.
///
/// JSON callers get `status` + body (or the error body). Browsers are sent back
/// to `back_to` with `?success=<success>` or `?error=<message>`.
pub fn respond<T: Serialize>(
    format: ResponseFormat,
    back_to: &str,
    success: &str,
    status: StatusCode,
    result: Result<T, AppError>,
) -> Response {
    match (format, result) {
        (ResponseFormat::Json, Ok(body)) => (status, Json(body)).into_response(),
        (ResponseFormat::Json, Err(e)) => e.into_response(),
        (ResponseFormat::Html, Ok(_)) => redirect(back_to, Some(("success", success))),
        (ResponseFormat::Html, Err(e)) => {
            if matches!(e, AppError::Internal) {
                tracing::error!(path = %back_to, "mutation failed");
            }
            redirect(back_to, Some(("error", &e.public_message())))
        }
    }
}
