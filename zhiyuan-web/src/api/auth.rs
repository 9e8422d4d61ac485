//! Account endpoints and session middleware
//!
//! Sessions travel in an HttpOnly cookie holding an opaque token; the
//! middleware resolves the token to a `User` and stores it in request
//! extensions for handlers. No credential material ever leaves the
//! database layer unhashed.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use zhiyuan_common::auth::{generate_salt, hash_password, verify_password};
use zhiyuan_common::db::{setting_i64, User};
use zhiyuan_common::validate;

use crate::db::{is_unique_violation, sessions, users};
use crate::{api::ApiError, AppState};

/// Session cookie name
pub const SESSION_COOKIE: &str = "zhiyuan_session";

/// Fallback session lifetime when the setting is unreadable
const DEFAULT_SESSION_TIMEOUT_SECS: i64 = 2_592_000;

// ========================================
// Cookie helpers
// ========================================

fn session_cookie(token: &str, max_age_seconds: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    )
}

fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Extract the session token from a Cookie header, if present
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

// ========================================
// Middleware
// ========================================

/// Require a valid session; stores the resolved `User` in extensions
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized("login required".to_string()))?;

    let user = sessions::find_user_by_token(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("session expired or invalid".to_string()))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Require the admin role; must run inside `require_session`
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized("login required".to_string()))?;

    if !user.is_admin() {
        return Err(ApiError::Forbidden("admin privileges required".to_string()));
    }

    Ok(next.run(request).await)
}

// ========================================
// Handlers
// ========================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<User>, ApiError> {
    let username = req.username.trim();
    let email = req.email.trim();

    if !validate::is_valid_username(username) {
        return Err(ApiError::BadRequest(
            "username must be 3-20 characters: letters, digits, underscore".to_string(),
        ));
    }
    if !validate::is_valid_email(email) {
        return Err(ApiError::BadRequest("invalid email address".to_string()));
    }
    if !validate::is_valid_password(&req.password) {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {} characters",
            validate::MIN_PASSWORD_LEN
        )));
    }

    let salt = generate_salt();
    let hash = hash_password(&salt, &req.password);

    match users::create_user(&state.db, username, email, &hash, &salt).await {
        Ok(user) => {
            info!("registered user '{}'", user.username);
            Ok(Json(user))
        }
        Err(zhiyuan_common::Error::Database(e)) if is_unique_violation(&e) => Err(
            ApiError::Conflict("username or email already taken".to_string()),
        ),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/auth/login
///
/// On success sets the session cookie and returns the account.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let credentials = users::find_credentials(&state.db, req.username.trim()).await?;

    // Same response for unknown user and wrong password
    let credentials = credentials
        .filter(|c| verify_password(&c.password_salt, &req.password, &c.password_hash))
        .ok_or_else(|| ApiError::Unauthorized("invalid username or password".to_string()))?;

    let timeout = setting_i64(
        &state.db,
        "session_timeout_seconds",
        DEFAULT_SESSION_TIMEOUT_SECS,
    )
    .await?;
    let token = sessions::create_session(&state.db, &credentials.guid, timeout).await?;

    info!("user '{}' logged in", credentials.username);

    let body = Json(json!({
        "guid": credentials.guid,
        "username": credentials.username,
        "role": credentials.role,
    }));

    Ok((
        [(header::SET_COOKIE, session_cookie(&token, timeout))],
        body,
    )
        .into_response())
}

/// POST /api/auth/logout
///
/// Deletes the server-side session and clears the cookie.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(token) = extract_session_token(&headers) {
        sessions::delete_session(&state.db, &token).await?;
    }

    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(json!({ "status": "logged out" })),
    )
        .into_response())
}
