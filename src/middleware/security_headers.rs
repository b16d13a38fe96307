//! Security response headers. Handlers may override any of them.

use axum::Router;
use axum::http::header::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::Config;

const BASE_HEADERS: &[(&str, &str)] = &[
    ("x-frame-options", "DENY"),
    ("content-security-policy", "frame-ancestors 'none'"),
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    (
        "permissions-policy",
        "camera=(), microphone=(), geolocation=()",
    ),
];

const HSTS: (&str, &str) = ("strict-transport-security", "max-age=31536000; includeSubDomains");

fn headers_for(config: &Config) -> Vec<(&'static str, &'static str)> {
    let mut headers = BASE_HEADERS.to_vec();
    if config.app_env.is_production() {
        headers.push(HSTS);
    }
    headers
}

pub fn apply(router: Router, config: &Config) -> Router {
    headers_for(config)
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppEnv;
    use crate::state::testing::test_config;

    #[test]
    fn hsts_only_in_production() {
        let mut config = test_config();
        assert!(!headers_for(&config).contains(&HSTS));

        config.app_env = AppEnv::Production;
        assert!(headers_for(&config).contains(&HSTS));
    }
}
