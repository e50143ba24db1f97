//! Project path functions - single source of truth for file locations.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//!
//! This allows running multiple isolated server instances side by side:
//! ```bash
//! DATA_DIR=data/test/a PORT=5002 JWT_SECRET=... cargo run
//! ```

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// Credential database path
pub fn auth_db_path() -> String {
    format!("{}/auth.db", data_dir())
}

/// Optional TOML configuration file, resolved relative to the working directory
pub const CONFIG_FILE: &str = "config.toml";
