use serde::{Deserialize, Serialize};

use super::is_email;
use crate::api::de::trimmed;
use crate::services::auth::Identity;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    #[serde(default, deserialize_with = "trimmed")]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    /// `(login, password)`; the password is not trimmed here, the gate does that.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref()?;
        let password = self.password.as_deref().filter(|p| !p.trim().is_empty())?;
        Some((username, password))
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(&str, &str, &str), &'static str> {
        let (Some(username), Some(email), Some(password)) = (
            self.username.as_deref(),
            self.email.as_deref(),
            self.password.as_deref(),
        ) else {
            return Err("Username, email, and password are required");
        };
        if !is_email(email) {
            return Err("email is not a valid address");
        }
        if password.trim().chars().count() < MIN_PASSWORD_LEN {
            return Err("password must be at least 8 characters");
        }
        Ok((username, email, password))
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub message: &'static str,
    pub token: String,
    pub user: Identity,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginPageQuery {
    #[serde(default, deserialize_with = "trimmed")]
    pub error: Option<String>,
}

/// View-model of the login page.
#[derive(Debug, Serialize)]
pub struct LoginPage {
    pub title: &'static str,
    pub error: Option<String>,
}
