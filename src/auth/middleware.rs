//! Authentication gate and extractor.
//!
//! Token lookup order: session cookie, then `Authorization: Bearer`.
//! - no token: 401
//! - expired or forged token: 403, and the session cookie is cleared
//! - valid token: an [`AuthContext`] is handed to the downstream handler

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::error::AuthError;
use crate::state::AppState;

/// Authenticated request context.
/// Add this as a handler parameter to require authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i64,
    pub email: String,
}

/// Verify the request's session token. Pure: signature check and clock comparison.
fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<AuthContext, Response> {
    let jar = CookieJar::from_headers(headers);

    let Some(token) = state.transport.extract(&jar, headers) else {
        return Err(AuthError::Unauthorized.into_response());
    };

    let claims = match state.auth.tokens().verify(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Rejected session token: {}", e);
            return Err(reject_stale(state, jar));
        }
    };

    let Some(user_id) = claims.user_id() else {
        tracing::warn!("Session token with non-numeric subject");
        return Err(reject_stale(state, jar));
    };

    Ok(AuthContext {
        user_id,
        email: claims.email,
    })
}

/// 403 that also expires the session cookie
fn reject_stale(state: &AppState, jar: CookieJar) -> Response {
    (state.transport.clear(jar), AuthError::Forbidden).into_response()
}

/// Route layer protecting everything beneath it.
///
/// ```ignore
/// Router::new()
///     .route("/private", get(handler))
///     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth))
/// ```
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match authenticate(request.headers(), &state) {
        Ok(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(rejection) => rejection,
    }
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already verified by require_auth
        if let Some(context) = parts.extensions.get::<AuthContext>() {
            return Ok(context.clone());
        }
        authenticate(&parts.headers, state)
    }
}
