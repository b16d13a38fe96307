/*
 * Responsibility
 * - Request DTOs (lenient: JSON / urlencoded / multipart all deserialize the same way)
 * - Response DTOs (camelCase, public ids only; internal BIGSERIAL ids never leave the server)
 */
pub mod auth;
pub mod contacts;
pub mod education;
pub mod experience;
pub mod home;
pub mod personal_info;
pub mod portfolio;
pub mod services;
pub mod skills;
pub mod testimonials;

use crate::error::AppError;
use crate::services::id_codec::IdCodec;

pub fn invalid(message: &'static str) -> AppError {
    AppError::bad_request("VALIDATION_ERROR", message)
}

pub(crate) fn required(value: Option<String>, message: &'static str) -> Result<String, &'static str> {
    value.ok_or(message)
}

/// Loose shape check: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Row -> response conversion; needs the codec for the public id.
pub trait FromRecord<R>: Sized {
    fn from_record(codec: &IdCodec, row: R) -> Result<Self, AppError>;
}

pub fn from_records<R, T: FromRecord<R>>(codec: &IdCodec, rows: Vec<R>) -> Result<Vec<T>, AppError> {
    rows.into_iter().map(|r| T::from_record(codec, r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_email("a@b.co"));
        assert!(is_email("first.last+tag@mail.example.org"));
        assert!(!is_email("a@b"));
        assert!(!is_email("@b.co"));
        assert!(!is_email("a b@c.co"));
        assert!(!is_email("a@@b.co"));
        assert!(!is_email("a@.co"));
        assert!(!is_email("plain"));
    }
}
