/*
 * Responsibility
 * - Admin login page, login (session cookie + bearer token), logout, registration
 * - /api/login and /api/register always answer JSON; the admin routes negotiate
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::api::dto::auth::{LoginPage, LoginPageQuery, LoginRequest, RegisterRequest, TokenResponse};
use crate::api::dto::invalid;
use crate::api::extractors::CurrentSession;
use crate::api::negotiate::{ResponseFormat, redirect};
use crate::api::payload::Payload;
use crate::error::AppError;
use crate::middleware::auth::LOGIN_PATH;
use crate::middleware::session::{clear_session_cookie, session_cookie};
use crate::services::auth::AuthError;
use crate::state::AppState;

pub const DASHBOARD_PATH: &str = "/admin/dashboard";
const MISSING_CREDENTIALS: &str = "Username and password are required";

pub async fn admin_root() -> Response {
    redirect(LOGIN_PATH, None)
}

pub async fn login_page(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<LoginPageQuery>,
) -> Response {
    if state.auth.authenticate_by_session(&session).is_some() {
        return redirect(DASHBOARD_PATH, None);
    }
    Json(LoginPage {
        title: "Admin Login",
        error: query.error,
    })
    .into_response()
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    perform_login(&state, jar, format, payload).await
}

pub async fn api_login(State(state): State<AppState>, jar: CookieJar, payload: Payload) -> Response {
    perform_login(&state, jar, ResponseFormat::Json, payload).await
}

async fn perform_login(
    state: &AppState,
    jar: CookieJar,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let req = match payload.parse::<LoginRequest>() {
        Ok(req) => req,
        Err(e) => return login_failed(format, e, MISSING_CREDENTIALS),
    };
    let Some((username, password)) = req.credentials() else {
        return login_failed(format, invalid(MISSING_CREDENTIALS), MISSING_CREDENTIALS);
    };

    let outcome = match state.auth.login(username, password).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let message = match e {
                AuthError::Internal => "An error occurred",
                _ => "Invalid credentials",
            };
            return login_failed(format, e.into(), message);
        }
    };

    let jar = jar.add(session_cookie(state, outcome.session_id));
    match format {
        ResponseFormat::Json => (
            jar,
            Json(TokenResponse {
                message: "Login successful",
                token: outcome.token,
                user: outcome.identity,
            }),
        )
            .into_response(),
        ResponseFormat::Html => (jar, redirect(DASHBOARD_PATH, None)).into_response(),
    }
}

fn login_failed(format: ResponseFormat, error: AppError, message: &str) -> Response {
    match format {
        ResponseFormat::Json => error.into_response(),
        ResponseFormat::Html => redirect(LOGIN_PATH, Some(("error", message))),
    }
}

pub async fn logout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    jar: CookieJar,
) -> Response {
    state.auth.logout(&session).await;
    (clear_session_cookie(&state, jar), redirect(LOGIN_PATH, None)).into_response()
}

pub async fn register(
    State(state): State<AppState>,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    perform_register(&state, format, payload).await
}

pub async fn api_register(State(state): State<AppState>, payload: Payload) -> Response {
    perform_register(&state, ResponseFormat::Json, payload).await
}

async fn perform_register(state: &AppState, format: ResponseFormat, payload: Payload) -> Response {
    if !state.config.allow_registration {
        return AppError::not_found("Page").into_response();
    }

    let result = async {
        let req: RegisterRequest = payload.parse()?;
        let (username, email, password) = req.validate().map_err(invalid)?;
        let (identity, token) = state.auth.register(username, email, password).await?;
        Ok::<_, AppError>(TokenResponse {
            message: "User registered successfully",
            token,
            user: identity,
        })
    }
    .await;

    match (format, result) {
        (ResponseFormat::Json, Ok(body)) => (StatusCode::CREATED, Json(body)).into_response(),
        (ResponseFormat::Json, Err(e)) => e.into_response(),
        (ResponseFormat::Html, Ok(_)) => redirect(LOGIN_PATH, Some(("success", "registered"))),
        (ResponseFormat::Html, Err(e)) => redirect(LOGIN_PATH, Some(("error", &e.public_message()))),
    }
}
