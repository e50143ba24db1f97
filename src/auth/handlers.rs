//! Authentication handlers for register, login, logout, and the current user.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use super::middleware::AuthContext;
use super::models::User;
use crate::error::AuthError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// POST /api/auth/register - Create account and set the session cookie
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(form) = body?;
    let session = state.auth.register(&form.email, &form.password, &form.name)?;

    Ok((
        StatusCode::CREATED,
        state.transport.attach(jar, session.token),
        Json(UserResponse { user: session.user }),
    ))
}

/// POST /api/auth/login - Check credentials and set the session cookie
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(form) = body?;
    let session = state.auth.login(&form.email, &form.password)?;

    Ok((
        state.transport.attach(jar, session.token),
        Json(UserResponse { user: session.user }),
    ))
}

/// POST /api/auth/logout - Clear the session cookie.
///
/// Tokens are stateless, so there is nothing server side to delete and this
/// always succeeds.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    tracing::info!("Session cleared");
    (
        state.transport.clear(jar),
        Json(MessageResponse {
            message: "Logged out",
        }),
    )
}

/// GET /api/auth/me - Current user's profile
pub async fn me(
    State(state): State<AppState>,
    context: AuthContext,
) -> Result<Json<UserResponse>, AuthError> {
    let user = state.auth.me(context.user_id)?;
    Ok(Json(UserResponse { user }))
}
