//! User repository contract and its SQLite implementation.

use std::sync::MutexGuard;

use rusqlite::Connection;

use super::db::{self as auth_db, AuthDb};
use super::models::{Credential, NewCredential};

/// Errors that can occur in repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Database unavailable")]
    Unavailable,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Narrow read/write contract the auth core needs from user storage.
///
/// Implementations must enforce email uniqueness themselves and report a
/// violation as [`RepositoryError::DuplicateEmail`].
pub trait UserRepository: Send + Sync {
    fn find_by_email(&self, email: &str) -> Result<Option<Credential>, RepositoryError>;

    fn find_by_id(&self, id: i64) -> Result<Option<Credential>, RepositoryError>;

    fn insert(&self, user: NewCredential) -> Result<Credential, RepositoryError>;

    fn record_login(&self, id: i64) -> Result<(), RepositoryError>;
}

/// SQLite-backed repository over a shared connection
#[derive(Clone)]
pub struct SqliteUserRepository {
    db: AuthDb,
}

impl SqliteUserRepository {
    pub fn new(db: AuthDb) -> Self {
        Self { db }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.db.lock().map_err(|_| {
            tracing::error!("Auth database mutex poisoned - a thread panicked while holding the lock");
            RepositoryError::Unavailable
        })
    }
}

impl UserRepository for SqliteUserRepository {
    fn find_by_email(&self, email: &str) -> Result<Option<Credential>, RepositoryError> {
        let conn = self.conn()?;
        Ok(auth_db::get_user_by_email(&conn, email)?)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Credential>, RepositoryError> {
        let conn = self.conn()?;
        Ok(auth_db::get_user_by_id(&conn, id)?)
    }

    fn insert(&self, user: NewCredential) -> Result<Credential, RepositoryError> {
        let conn = self.conn()?;
        let id = auth_db::create_user(&conn, &user).map_err(|e| {
            if auth_db::is_unique_violation(&e) {
                RepositoryError::DuplicateEmail
            } else {
                RepositoryError::Database(e)
            }
        })?;

        Ok(Credential {
            id,
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            role: user.role,
        })
    }

    fn record_login(&self, id: i64) -> Result<(), RepositoryError> {
        let conn = self.conn()?;
        Ok(auth_db::update_last_login(&conn, id)?)
    }
}
