use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::{self, require_auth};
use crate::state::AppState;

/// Full application router
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/me", get(auth::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .merge(protected);

    Router::new()
        .nest("/api/auth", auth_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
