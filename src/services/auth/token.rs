use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::services::auth::identity::{Identity, Role};

/// Bearer token payload. Everything needed to describe an identity without a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing secret is not configured")]
    MissingSecret,
    #[error("token expired")]
    Expired,
    #[error("token invalid: {0}")]
    Invalid(String),
    #[error("token signing failed: {0}")]
    Sign(String),
}

#[derive(Clone)]
struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// HS256 signer/verifier with a shared secret.
///
/// Without a secret the service fails closed: `sign` and `verify` both error.
#[derive(Clone)]
pub struct TokenService {
    keys: Option<Keys>,
    ttl_seconds: u64,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("configured", &self.keys.is_some())
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: Option<&str>, ttl_seconds: u64) -> Self {
        let keys = secret.map(|s| Keys {
            encoding: EncodingKey::from_secret(s.as_bytes()),
            decoding: DecodingKey::from_secret(s.as_bytes()),
        });
        Self { keys, ttl_seconds }
    }

    pub fn is_configured(&self) -> bool {
        self.keys.is_some()
    }


    pub fn sign(&self, identity: &Identity, now: i64) -> Result<String, TokenError> {
        let keys = self.keys.as_ref().ok_or(TokenError::MissingSecret)?;

        let ttl = i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: identity.id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            role: identity.role,
            iat: now,
            exp: now.saturating_add(ttl),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &keys.encoding)
            .map_err(|e| TokenError::Sign(e.to_string()))
    }

    /// Signature first, then expiry against `now`. A token is dead from `exp` onward.
    pub fn verify(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let keys = self.keys.as_ref().ok_or(TokenError::MissingSecret)?;

        let mut validation = Validation::new(Algorithm::HS256);
        // exp is compared against the caller's clock below
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<Claims>(token, &keys.decoding, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        if now >= data.claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            username: "admin".into(),
            email: "admin@example.com".into(),
            role: Role::Admin,
            is_active: true,
        }
    }

    #[test]
    fn valid_until_exactly_expiry() {
        let svc = TokenService::new(Some("test-secret"), 100);
        let id = identity();
        let token = svc.sign(&id, 1_000).unwrap();

        let claims = svc.verify(&token, 1_000).unwrap();
        assert_eq!(claims.sub, id.id);
        assert_eq!(claims.exp, 1_100);
        assert!(svc.verify(&token, 1_099).is_ok());
        assert!(matches!(svc.verify(&token, 1_100), Err(TokenError::Expired)));
        assert!(matches!(svc.verify(&token, 5_000), Err(TokenError::Expired)));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let a = TokenService::new(Some("secret-a"), 60);
        let b = TokenService::new(Some("secret-b"), 60);
        let token = a.sign(&identity(), 0).unwrap();
        assert!(matches!(b.verify(&token, 1), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let svc = TokenService::new(Some("secret"), 60);
        let token = svc.sign(&identity(), 0).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let other = svc.sign(&identity(), 0).unwrap();
        let other_payload = other.split('.').nth(1).unwrap().to_string();
        parts[1] = &other_payload;
        let forged = parts.join(".");
        assert!(matches!(svc.verify(&forged, 1), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_invalid() {
        let svc = TokenService::new(Some("secret"), 60);
        assert!(matches!(svc.verify("abc", 0), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn missing_secret_fails_closed() {
        let svc = TokenService::new(None, 60);
        assert!(!svc.is_configured());
        assert!(matches!(svc.sign(&identity(), 0), Err(TokenError::MissingSecret)));
        assert!(matches!(svc.verify("x.y.z", 0), Err(TokenError::MissingSecret)));
    }
}
