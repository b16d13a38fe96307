/*
 * Responsibility
 * - Application-wide AppError
 * - IntoResponse (HTTP status / JSON error body)
 * - Uniform conversion from repo / id codec / auth / upload errors
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::AuthError;
use crate::services::id_codec::IdCodecError;
use crate::services::upload::UploadError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("{code}: {message}")]
    Conflict { code: &'static str, message: String },
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("account is inactive")]
    InactiveAccount,
    #[error("request body is too large")]
    PayloadTooLarge,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized
            | AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::InactiveAccount => StatusCode::UNAUTHORIZED,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to a browser user (redirect `?error=`).
    pub fn public_message(&self) -> String {
        match self {
            AppError::BadRequest { message, .. } | AppError::Conflict { message, .. } => {
                message.clone()
            }
            AppError::NotFound { resource } => format!("{resource} not found"),
            AppError::InvalidCredentials => "Invalid credentials".into(),
            AppError::Internal => "An error occurred".into(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            AppError::BadRequest { code, message } => (code, message),
            AppError::NotFound { resource } => ("NOT_FOUND", format!("{resource} not found.")),
            AppError::Conflict { code, message } => (code, message),
            AppError::Unauthorized => ("UNAUTHORIZED", "authentication required".into()),
            AppError::InvalidCredentials => ("INVALID_CREDENTIALS", "invalid credentials".into()),
            AppError::InvalidToken => ("INVALID_TOKEN", "invalid or expired token".into()),
            AppError::InactiveAccount => ("INACTIVE_ACCOUNT", "account is inactive".into()),
            AppError::PayloadTooLarge => ("PAYLOAD_TOO_LARGE", "request body is too large".into()),
            AppError::Internal => ("INTERNAL_SERVER_ERROR", "internal server error".into()),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::conflict("CONFLICT", "already exists"),
            RepoError::Db(err) => {
                tracing::error!(error = %err, "database error");
                AppError::Internal
            }
        }
    }
}

impl From<IdCodecError> for AppError {
    fn from(e: IdCodecError) -> Self {
        match e {
            // Client supplied a malformed public id (e.g. /api/services/{id})
            IdCodecError::DecodeInvalidFormat | IdCodecError::DecodeOutOfRange => {
                AppError::bad_request("INVALID_PUBLIC_ID", "invalid id")
            }
            // Server-side config / programming errors
            IdCodecError::InvalidMinLength { .. }
            | IdCodecError::Sqids(_)
            | IdCodecError::NegativeId { .. } => AppError::Internal,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::InvalidToken => AppError::InvalidToken,
            AuthError::InactiveAccount => AppError::InactiveAccount,
            AuthError::Unauthorized => AppError::Unauthorized,
            AuthError::AccountExists => AppError::bad_request("ACCOUNT_EXISTS", "User already exists"),
            AuthError::Internal => AppError::Internal,
        }
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Io(err) => {
                tracing::error!(error = %err, "upload storage failure");
                AppError::Internal
            }
            other => AppError::bad_request("INVALID_UPLOAD", other.to_string()),
        }
    }
}
