//! Application configuration.
//!
//! All values are resolved once at startup into a [`Config`] that is passed down
//! explicitly. Priority for every key: config.toml > environment (.env included) >
//! built-in default. The signing secret has no default: loading fails without it.

use axum_extra::extract::cookie::SameSite;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::paths;

// ==================== Defaults ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 5001;

/// Session token (and cookie) lifetime in hours
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

/// Session cookie name
pub const DEFAULT_COOKIE_NAME: &str = "token";

/// Minimum password length when the strength policy is enforced
pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 6;

/// Argon2 memory cost in KiB (OWASP baseline for Argon2id)
pub const DEFAULT_HASH_MEMORY_KIB: u32 = 19_456;

/// Argon2 iteration count
pub const DEFAULT_HASH_ITERATIONS: u32 = 2;

/// Argon2 lanes
pub const DEFAULT_HASH_PARALLELISM: u32 = 1;

// ==================== Errors ====================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is not set; refusing to start without a signing secret")]
    MissingSecret,

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ==================== config.toml structure ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub auth: Option<AuthSection>,
    pub database: Option<DatabaseSection>,
    pub server: Option<ServerSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthSection {
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: Option<i64>,
    pub cookie_name: Option<String>,
    pub cookie_secure: Option<bool>,
    pub cookie_same_site: Option<String>,
    pub password_policy: Option<bool>,
    pub password_min_length: Option<usize>,
    pub hash_memory_kib: Option<u32>,
    pub hash_iterations: Option<u32>,
    pub hash_parallelism: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DatabaseSection {
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Read config.toml if present. A missing file is an empty configuration.
pub fn read_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };
    tracing::info!("Using configuration from {}", path.display());
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

// ==================== Resolved configuration ====================

/// Authentication settings shared by the token service, hasher and cookie transport.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    pub password_policy: bool,
    pub password_min_length: usize,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
    pub hash_parallelism: u32,
}

impl AuthConfig {
    /// Defaults for everything except the secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_secure: false,
            cookie_same_site: SameSite::Lax,
            password_policy: true,
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
            hash_memory_kib: DEFAULT_HASH_MEMORY_KIB,
            hash_iterations: DEFAULT_HASH_ITERATIONS,
            hash_parallelism: DEFAULT_HASH_PARALLELISM,
        }
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .field("password_policy", &self.password_policy)
            .field("password_min_length", &self.password_min_length)
            .field("hash_memory_kib", &self.hash_memory_kib)
            .field("hash_iterations", &self.hash_iterations)
            .field("hash_parallelism", &self.hash_parallelism)
            .finish()
    }
}

/// Everything the binary needs at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load from .env, config.toml and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let file = read_config_file(Path::new(paths::CONFIG_FILE))?;
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup.
    pub fn from_sources<F>(file: FileConfig, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_file = file.auth.unwrap_or_default();
        let server_file = file.server.unwrap_or_default();
        let database_file = file.database.unwrap_or_default();

        let jwt_secret = auth_file
            .jwt_secret
            .or_else(|| env("JWT_SECRET"))
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let mut auth = AuthConfig::new(jwt_secret);

        if let Some(hours) = resolve(auth_file.token_ttl_hours, env("TOKEN_TTL_HOURS"), "TOKEN_TTL_HOURS", |s| {
            s.parse::<i64>().ok().filter(|h| valid_ttl_hours(*h))
        })? {
            auth.token_ttl_hours = hours;
        }
        if !valid_ttl_hours(auth.token_ttl_hours) {
            return Err(ConfigError::InvalidValue {
                key: "TOKEN_TTL_HOURS",
                value: auth.token_ttl_hours.to_string(),
            });
        }

        if let Some(name) = resolve(auth_file.cookie_name, env("COOKIE_NAME"), "COOKIE_NAME", |s| {
            (!s.is_empty()).then(|| s.to_string())
        })? {
            auth.cookie_name = name;
        }

        let production = env("APP_ENV").is_some_and(|v| v.trim().eq_ignore_ascii_case("production"));
        auth.cookie_secure = resolve(auth_file.cookie_secure, env("COOKIE_SECURE"), "COOKIE_SECURE", parse_bool)?
            .unwrap_or(production);

        let same_site = match auth_file.cookie_same_site {
            Some(raw) => Some(parse_same_site(&raw).ok_or(ConfigError::InvalidValue {
                key: "COOKIE_SAME_SITE",
                value: raw,
            })?),
            None => resolve(None, env("COOKIE_SAME_SITE"), "COOKIE_SAME_SITE", parse_same_site)?,
        };
        if let Some(same_site) = same_site {
            auth.cookie_same_site = same_site;
        }

        if let Some(enabled) = resolve(auth_file.password_policy, env("PASSWORD_POLICY"), "PASSWORD_POLICY", parse_bool)? {
            auth.password_policy = enabled;
        }
        if let Some(len) = resolve(
            auth_file.password_min_length,
            env("PASSWORD_MIN_LENGTH"),
            "PASSWORD_MIN_LENGTH",
            |s| s.parse().ok(),
        )? {
            auth.password_min_length = len;
        }

        if let Some(m) = resolve(auth_file.hash_memory_kib, env("HASH_MEMORY_KIB"), "HASH_MEMORY_KIB", |s| s.parse().ok())? {
            auth.hash_memory_kib = m;
        }
        if let Some(t) = resolve(auth_file.hash_iterations, env("HASH_ITERATIONS"), "HASH_ITERATIONS", |s| s.parse().ok())? {
            auth.hash_iterations = t;
        }
        if let Some(p) = resolve(auth_file.hash_parallelism, env("HASH_PARALLELISM"), "HASH_PARALLELISM", |s| s.parse().ok())? {
            auth.hash_parallelism = p;
        }

        let database_path = database_file
            .path
            .or_else(|| env("DATABASE_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(paths::auth_db_path()));

        let host = server_file
            .host
            .or_else(|| env("HOST"))
            .unwrap_or_else(|| SERVER_ADDR.to_string());
        let port = resolve(server_file.port, env("PORT"), "PORT", |s| s.parse().ok())?.unwrap_or(SERVER_PORT);

        Ok(Self {
            auth,
            database_path,
            host,
            port,
        })
    }

    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// File value wins; otherwise parse the environment value if one is set.
fn resolve<T>(
    file_value: Option<T>,
    env_value: Option<String>,
    key: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError> {
    if file_value.is_some() {
        return Ok(file_value);
    }
    match env_value {
        Some(raw) => parse(raw.trim())
            .map(Some)
            .ok_or(ConfigError::InvalidValue { key, value: raw }),
        None => Ok(None),
    }
}

fn valid_ttl_hours(hours: i64) -> bool {
    (1..=MAX_TOKEN_TTL_HOURS).contains(&hours)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.trim().to_ascii_lowercase().as_str() {
        "lax" => Some(SameSite::Lax),
        "strict" => Some(SameSite::Strict),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_secret_fails() {
        let err = Config::from_sources(FileConfig::default(), env_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret));
    }

    #[test]
    fn test_blank_secret_fails() {
        let err = Config::from_sources(FileConfig::default(), env_from(&[("JWT_SECRET", "   ")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret));
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_sources(FileConfig::default(), env_from(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.auth.cookie_name, "token");
        assert!(!config.auth.cookie_secure);
        assert_eq!(config.auth.cookie_same_site, SameSite::Lax);
        assert!(config.auth.password_policy);
        assert_eq!(config.port, SERVER_PORT);
        assert!(config.database_path.ends_with("auth.db"));
    }

    #[test]
    fn test_production_enables_secure_cookie() {
        let config = Config::from_sources(
            FileConfig::default(),
            env_from(&[("JWT_SECRET", "s"), ("APP_ENV", "production")]),
        )
        .unwrap();
        assert!(config.auth.cookie_secure);

        // Explicit setting wins over the environment name
        let config = Config::from_sources(
            FileConfig::default(),
            env_from(&[("JWT_SECRET", "s"), ("APP_ENV", "production"), ("COOKIE_SECURE", "false")]),
        )
        .unwrap();
        assert!(!config.auth.cookie_secure);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_sources(
            FileConfig::default(),
            env_from(&[
                ("JWT_SECRET", "s"),
                ("TOKEN_TTL_HOURS", "2"),
                ("COOKIE_NAME", "jwt"),
                ("COOKIE_SAME_SITE", "Strict"),
                ("PASSWORD_POLICY", "off"),
                ("PORT", "8080"),
            ]),
        )
        .unwrap();
        assert_eq!(config.auth.token_ttl_hours, 2);
        assert_eq!(config.auth.token_ttl(), chrono::Duration::hours(2));
        assert_eq!(config.auth.cookie_name, "jwt");
        assert_eq!(config.auth.cookie_same_site, SameSite::Strict);
        assert!(!config.auth.password_policy);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_file_takes_priority_over_env() {
        let file: FileConfig = toml::from_str(
            r#"
            [auth]
            jwt_secret = "from-file"
            token_ttl_hours = 12

            [database]
            path = "/tmp/custom.db"
            "#,
        )
        .unwrap();
        let config = Config::from_sources(
            file,
            env_from(&[("JWT_SECRET", "from-env"), ("TOKEN_TTL_HOURS", "48")]),
        )
        .unwrap();
        assert_eq!(config.auth.jwt_secret, "from-file");
        assert_eq!(config.auth.token_ttl_hours, 12);
        assert_eq!(config.database_path, PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_sources(
            FileConfig::default(),
            env_from(&[("JWT_SECRET", "s"), ("TOKEN_TTL_HOURS", "soon")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "TOKEN_TTL_HOURS", .. }));

        let err = Config::from_sources(
            FileConfig::default(),
            env_from(&[("JWT_SECRET", "s"), ("TOKEN_TTL_HOURS", "0")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = Config::from_sources(
            FileConfig::default(),
            env_from(&[("JWT_SECRET", "s"), ("COOKIE_SAME_SITE", "none")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "COOKIE_SAME_SITE", .. }));
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        let err = Config::from_sources(
            FileConfig::default(),
            env_from(&[("JWT_SECRET", "s"), ("TOKEN_TTL_HOURS", "9000000000000000")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "TOKEN_TTL_HOURS", .. }));

        let file: FileConfig = toml::from_str(
            r#"
            [auth]
            jwt_secret = "s"
            token_ttl_hours = 9000000000000000
            "#,
        )
        .unwrap();
        let err = Config::from_sources(file, env_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "TOKEN_TTL_HOURS", .. }));

        let max = MAX_TOKEN_TTL_HOURS.to_string();
        let config = Config::from_sources(
            FileConfig::default(),
            env_from(&[("JWT_SECRET", "s"), ("TOKEN_TTL_HOURS", max.as_str())]),
        )
        .unwrap();
        assert_eq!(config.auth.token_ttl(), chrono::Duration::hours(MAX_TOKEN_TTL_HOURS));
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let file = read_config_file(&dir.path().join("config.toml")).unwrap();
        assert!(file.auth.is_none());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let auth = AuthConfig::new("do-not-print");
        let rendered = format!("{:?}", auth);
        assert!(!rendered.contains("do-not-print"));
        assert!(rendered.contains("redacted"));
    }
}
