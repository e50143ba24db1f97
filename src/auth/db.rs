//! Credential database operations (users table).
//!
//! ## Migration System
//!
//! Version-gated migrations. Each migration:
//! 1. Checks if the current schema version is less than the target version
//! 2. Runs its SQL
//! 3. Records the new version in the `db_version` table
//!
//! Migrations only run once - the version check ensures idempotency.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::models::{Credential, NewCredential, Role};

/// Current schema version for auth.db
/// Increment this when adding a new migration
pub const AUTH_DB_VERSION: i32 = 2;

/// Shared credential database connection
pub type AuthDb = Arc<Mutex<Connection>>;

/// Open (creating if needed) the credential database and bring its schema up to date
pub fn init_auth_db(path: &Path) -> Result<AuthDb> {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!("Could not create database directory {}: {}", parent.display(), e);
        }
    }

    let conn = Connection::open(path)?;
    init_auth_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Initialize the auth database schema with version-gated migrations
pub fn init_auth_schema(conn: &Connection) -> Result<()> {
    // Bootstrap: ensure db_version table exists (needed to check version)
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS db_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL,
            description TEXT
        );
        "#,
    )?;

    let current_version = get_schema_version(conn)?;
    tracing::debug!("auth.db schema version: {}", current_version);

    if current_version < 1 {
        migrate_v0_to_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v1_to_v2(conn)?;
    }

    Ok(())
}

// ============================================================
// VERSION-GATED MIGRATIONS
// ============================================================

/// v0→v1: Create users table
fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v0→v1: Create users table");

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password_hash TEXT NOT NULL,
            name TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            created_at TEXT NOT NULL
        );
        "#,
    )?;

    record_version(conn, 1, "Create users table")?;
    Ok(())
}

/// v1→v2: Track last successful login
fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v1→v2: Add last_login_at");

    add_column_if_missing(conn, "users", "last_login_at", "TEXT")?;

    record_version(conn, 2, "Add last_login_at to users")?;
    Ok(())
}

// ============================================================
// MIGRATION HELPERS
// ============================================================

/// Record a schema version after successful migration
fn record_version(conn: &Connection, version: i32, description: &str) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO db_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        params![version, now, description],
    )?;
    tracing::info!("Recorded schema version {} - {}", version, description);
    Ok(())
}

/// Get current schema version (0 if no versions recorded)
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM db_version",
        [],
        |row| row.get(0),
    )
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    conn.prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
        .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(
    conn: &Connection,
    table: &str,
    column: &str,
    column_def: &str,
) -> Result<()> {
    if !column_exists(conn, table, column) {
        conn.execute(
            &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
            [],
        )?;
    }
    Ok(())
}

// ============================================================
// USERS
// ============================================================

fn row_to_credential(row: &Row<'_>) -> Result<Credential> {
    let role: Option<String> = row.get(4)?;
    Ok(Credential {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        role: Role::from_db(role.as_deref()),
    })
}

/// Create a new user, returns the user ID
pub fn create_user(conn: &Connection, user: &NewCredential) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO users (email, password_hash, name, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user.email, user.password_hash, user.name, user.role.as_str(), now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get user by email (case-insensitive)
pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<Credential>> {
    conn.query_row(
        "SELECT id, email, password_hash, name, role FROM users WHERE email = ?1",
        params![email],
        row_to_credential,
    )
    .optional()
}

/// Get user by ID
pub fn get_user_by_id(conn: &Connection, user_id: i64) -> Result<Option<Credential>> {
    conn.query_row(
        "SELECT id, email, password_hash, name, role FROM users WHERE id = ?1",
        params![user_id],
        row_to_credential,
    )
    .optional()
}

/// Update user's last login timestamp
pub fn update_last_login(conn: &Connection, user_id: i64) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE users SET last_login_at = ?1 WHERE id = ?2",
        params![now, user_id],
    )?;
    Ok(())
}

/// True when the error is the users.email unique constraint firing
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
