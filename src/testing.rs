//! Test utilities for database and service setup.
//!
//! Reuses the authoritative schema initialization so tests never carry their
//! own copy of the users table.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use crate::auth::db::{self as auth_db, AuthDb};
use crate::auth::repository::SqliteUserRepository;
use crate::auth::service::AuthService;
use crate::config::AuthConfig;
use crate::state::AppState;

/// Signing secret used by every test environment
pub const TEST_SECRET: &str = "test-secret-do-not-use-in-production";

/// Auth configuration with a cheap Argon2 cost so tests stay fast
pub fn test_config() -> AuthConfig {
    AuthConfig {
        hash_memory_kib: 1024,
        hash_iterations: 1,
        ..AuthConfig::new(TEST_SECRET)
    }
}

/// Test environment with a file-backed auth.db in a temporary directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    temp: TempDir,
    pub db: AuthDb,
    pub config: AuthConfig,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AuthConfig) -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let db = auth_db::init_auth_db(&temp.path().join("auth.db"))?;

        Ok(Self {
            temp,
            db,
            config,
        })
    }

    /// Root of the temporary data directory
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn repo(&self) -> SqliteUserRepository {
        SqliteUserRepository::new(self.db.clone())
    }

    pub fn service(&self) -> AuthService {
        AuthService::from_config(&self.config, Arc::new(self.repo()))
            .expect("test service config is valid")
    }

    pub fn state(&self) -> AppState {
        AppState::from_config(&self.config, Arc::new(self.repo()))
            .expect("test service config is valid")
    }
}
