/*
 * Responsibility
 * - Load Config -> build shared services -> assemble the Router -> axum::serve()
 * - Process-wide tracing subscriber and panic hook
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{Router, middleware::from_fn_with_state};
use sqlx::postgres::PgPoolOptions;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware::{cors, http, security_headers, session::load_session};
use crate::services::{auth::build_auth_gate, id_codec::IdCodec, upload::UploadStore};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins, e.g. RUST_LOG=info,portfolio_cms=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash loudly; production: default hook, keep serving
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(env = ?config.app_env, addr = %config.addr, "starting portfolio-cms");

    let state = build_state(config).await?;
    let app = build_router(state.clone(), &state.config);

    let listener = tokio::net::TcpListener::bind(state.config.addr)
        .await
        .with_context(|| format!("cannot bind {}", state.config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("cannot connect to DATABASE_URL")?;

    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)?;
    let auth = build_auth_gate(&config, db.clone()).await?;

    let uploads = UploadStore::new(config.upload_dir.clone());
    uploads
        .ensure_dirs()
        .await
        .with_context(|| format!("cannot create upload dirs under {}", config.upload_dir.display()))?;

    Ok(AppState::new(db, id_codec, auth, uploads, Arc::new(config)))
}

pub(crate) fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::routes(state.clone())
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(from_fn_with_state(state.clone(), load_session))
        .with_state(state);

    let router = security_headers::apply(router, config);
    let router = cors::apply(router, config);
    http::apply(router, config)
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::services::auth::account::testing::InMemoryAccountStore;
    use crate::state::testing::{test_config, test_state};

    fn app_with(accounts: InMemoryAccountStore, config: Config) -> Router {
        let state = test_state(accounts, config);
        let config = state.config.clone();
        build_router(state, &config)
    }

    fn admin_app() -> (Router, InMemoryAccountStore, uuid::Uuid) {
        let (accounts, id) = InMemoryAccountStore::with_admin("admin", "admin@example.com", "s3cret-pw");
        (app_with(accounts.clone(), test_config()), accounts, id)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn get_json(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(res: axum::response::Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(res: &axum::response::Response) -> &str {
        res.headers()[header::LOCATION].to_str().unwrap()
    }

    /// `name=value` part of the Set-Cookie header.
    fn session_cookie_pair(res: &axum::response::Response) -> String {
        let raw = res.headers()[header::SET_COOKIE].to_str().unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    async fn login(app: &Router) -> (String, String) {
        let res = app
            .clone()
            .oneshot(post_json(
                "/api/login",
                json!({"username": "admin", "password": "s3cret-pw"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = session_cookie_pair(&res);
        let body = json_body(res).await;
        (body["token"].as_str().unwrap().to_string(), cookie)
    }

    #[tokio::test]
    async fn health_is_public_and_carries_security_headers() {
        let (app, _, _) = admin_app();
        let res = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["x-content-type-options"], "nosniff");
        assert!(res.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn hybrid_route_without_credentials_depends_on_accept() {
        let (app, _, _) = admin_app();

        let res = app.clone().oneshot(get_json("/api/contacts")).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(res).await["error"]["code"], "UNAUTHORIZED");

        let res = app.oneshot(get("/api/contacts")).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/admin/login");
    }

    #[tokio::test]
    async fn admin_pages_redirect_anonymous_browsers() {
        let (app, _, _) = admin_app();
        let res = app.oneshot(get("/admin/services")).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/admin/login");
    }

    #[tokio::test]
    async fn login_yields_token_and_session() {
        let (app, _, _) = admin_app();
        let (token, cookie) = login(&app).await;
        assert!(!token.is_empty());
        assert!(cookie.starts_with("sid="));

        // the login page bounces an authenticated browser to the dashboard
        let req = Request::builder()
            .uri("/admin/login")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/admin/dashboard");
    }

    #[tokio::test]
    async fn failed_browser_login_redirects_with_generic_error() {
        let (app, _, _) = admin_app();
        for password in ["wrong", ""] {
            let req = Request::builder()
                .method("POST")
                .uri("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!("username=admin&password={password}")))
                .unwrap();
            let res = app.clone().oneshot(req).await.unwrap();
            assert_eq!(res.status(), StatusCode::SEE_OTHER);
            assert!(location(&res).starts_with("/admin/login?error="));
            assert!(!res.headers().contains_key(header::SET_COOKIE));
        }
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let (app, _, _) = admin_app();
        let a = app
            .clone()
            .oneshot(post_json("/api/login", json!({"username": "ghost", "password": "x"})))
            .await
            .unwrap();
        let b = app
            .oneshot(post_json("/api/login", json!({"username": "admin", "password": "x"})))
            .await
            .unwrap();
        assert_eq!(a.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(a.status(), b.status());
        assert_eq!(json_body(a).await, json_body(b).await);
    }

    #[tokio::test]
    async fn token_route_rejects_deactivated_account() {
        let (app, accounts, id) = admin_app();
        let (token, _) = login(&app).await;

        accounts.set_active(id, false);
        let req = Request::builder()
            .uri("/api/dashboard")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(res).await["error"]["code"], "INACTIVE_ACCOUNT");

        // token routes never redirect, even for browsers
        let res = app.oneshot(get("/api/dashboard")).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_public_id_is_a_bad_request() {
        let (app, _, _) = admin_app();
        let (token, _) = login(&app).await;
        let req = Request::builder()
            .method("DELETE")
            .uri("/api/services/not-a-real-id!")
            .header(header::ACCEPT, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["error"]["code"], "INVALID_PUBLIC_ID");
    }

    #[tokio::test]
    async fn logout_destroys_the_session() {
        let (app, _, _) = admin_app();
        let (_, cookie) = login(&app).await;

        let req = Request::builder()
            .uri("/admin/logout")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/admin/login");

        // replaying the old cookie no longer authenticates
        let req = Request::builder()
            .uri("/admin/login")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn registration_is_hidden_unless_enabled() {
        let (app, _, _) = admin_app();
        let body = json!({"username": "new", "email": "new@example.com", "password": "long enough"});
        let res = app.oneshot(post_json("/api/register", body.clone())).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let mut config = test_config();
        config.allow_registration = true;
        let app = app_with(InMemoryAccountStore::default(), config);
        let res = app.clone().oneshot(post_json("/api/register", body.clone())).await.unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert!(json_body(res).await["token"].is_string());

        let res = app.oneshot(post_json("/api/register", body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_root_points_to_login() {
        let (app, _, _) = admin_app();
        let res = app.oneshot(get("/admin")).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/admin/login");
    }
}
