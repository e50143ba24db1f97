use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth_gate::{auth, config::Config, routes, state::AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_gate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // No fallback secret: refuse to start without configuration
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!("Loaded configuration: {:?}", config);

    let auth_db = match auth::db::init_auth_db(&config.database_path) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(
                "Failed to initialize database {}: {}",
                config.database_path.display(),
                e
            );
            std::process::exit(1);
        }
    };
    let users = Arc::new(auth::SqliteUserRepository::new(auth_db));

    let state = match AppState::from_config(&config.auth, users) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize auth service: {}", e);
            std::process::exit(1);
        }
    };

    let app = routes::app(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

    tracing::info!("Server running on http://{}", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
