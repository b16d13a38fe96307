/*
 * Responsibility
 * - Load environment variables / settings (DATABASE_URL, REDIS_URL, CORS, auth, uploads)
 * - Validate values (missing required ones abort startup)
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::services::upload::LARGEST_FORM_BYTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    // None -> in-process session store (development only)
    pub redis_url: Option<String>,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub sqids_min_length: usize,
    pub sqids_alphabet: String,

    // None -> every token is rejected and none can be minted
    pub jwt_secret: Option<String>,
    pub token_ttl_seconds: u64,

    pub session_ttl_seconds: u64,
    pub session_cookie_name: String,

    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,

    pub allow_registration: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // database_url / redis_url may carry credentials, jwt_secret is a key
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("redis", &self.redis_url.is_some())
            .field("jwt_secret", &self.jwt_secret.is_some())
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("upload_dir", &self.upload_dir)
            .field("allow_registration", &self.allow_registration)
            .finish()
    }
}

fn env_flag(key: &str) -> bool {
    matches!(
        std::env::var(key)
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
            .as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let redis_url = non_empty_env("REDIS_URL");

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let sqids_min_length = std::env::var("SQIDS_MIN_LENGTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10);

        let sqids_alphabet = std::env::var("SQIDS_ALPHABET").unwrap_or_else(|_| {
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".to_string()
        });

        let jwt_secret = non_empty_env("JWT_SECRET");

        let token_ttl_seconds = std::env::var("TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(86_400); // 24h

        let session_ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(1_209_600); // 14 days

        let session_cookie_name =
            non_empty_env("SESSION_COOKIE_NAME").unwrap_or_else(|| "sid".to_string());

        let upload_dir = PathBuf::from(
            non_empty_env("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()),
        );

        // upload bytes per request; the default fits the portfolio form with a full gallery
        let max_upload_bytes = std::env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(LARGEST_FORM_BYTES);

        if token_ttl_seconds == 0 {
            return Err(ConfigError::Invalid("TOKEN_TTL_SECONDS"));
        }
        if session_ttl_seconds == 0 {
            return Err(ConfigError::Invalid("SESSION_TTL_SECONDS"));
        }

        Ok(Self {
            addr,
            database_url,
            database_max_connections,
            redis_url,
            app_env,
            cors_allowed_origins,
            sqids_min_length,
            sqids_alphabet,
            jwt_secret,
            token_ttl_seconds,
            session_ttl_seconds,
            session_cookie_name,
            upload_dir,
            max_upload_bytes,
            allow_registration: env_flag("ALLOW_REGISTRATION"),
        })
    }
}
