//! Application state passed to all handlers.

use std::sync::Arc;

use crate::auth::repository::UserRepository;
use crate::auth::service::{AuthService, SetupError};
use crate::auth::transport::SessionTransport;
use crate::config::AuthConfig;

/// Built once at startup; read-only afterwards
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub transport: SessionTransport,
}

impl AppState {
    pub fn new(auth: AuthService, transport: SessionTransport) -> Self {
        Self {
            auth: Arc::new(auth),
            transport,
        }
    }

    pub fn from_config(config: &AuthConfig, users: Arc<dyn UserRepository>) -> Result<Self, SetupError> {
        Ok(Self::new(
            AuthService::from_config(config, users)?,
            SessionTransport::from_config(config),
        ))
    }
}
