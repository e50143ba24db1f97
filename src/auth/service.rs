//! Registration and login orchestration.

use std::sync::Arc;

use super::models::{NewCredential, Role, User};
use super::password::{CredentialHasher, HashError};
use super::repository::UserRepository;
use super::token::{TokenError, TokenService};
use super::validation::{require, validate_email, validate_name, PasswordPolicy};
use crate::config::AuthConfig;
use crate::error::AuthError;

/// Errors building the service from configuration
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("token service: {0}")]
    Token(#[from] TokenError),
    #[error("password hasher: {0}")]
    Hasher(#[from] HashError),
}

/// A freshly authenticated user and the token to hand back to them
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: CredentialHasher,
    tokens: TokenService,
    policy: PasswordPolicy,
    /// Verified against when the email is unknown, so both login failures cost a hash
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: CredentialHasher,
        tokens: TokenService,
        policy: PasswordPolicy,
    ) -> Result<Self, HashError> {
        let dummy_hash = hasher.hash("dummy-password-for-unknown-users")?;
        Ok(Self {
            users,
            hasher,
            tokens,
            policy,
            dummy_hash,
        })
    }

    pub fn from_config(config: &AuthConfig, users: Arc<dyn UserRepository>) -> Result<Self, SetupError> {
        let hasher = CredentialHasher::from_config(config)?;
        let tokens = TokenService::from_config(config)?;
        Ok(Self::new(users, hasher, tokens, PasswordPolicy::from_config(config))?)
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    fn start_session(&self, user: User) -> Result<Session, AuthError> {
        let token = self.tokens.issue(&user.id.to_string(), &user.email)?;
        Ok(Session { user, token })
    }

    /// Create an account and sign it in.
    pub fn register(&self, email: &str, password: &str, name: &str) -> Result<Session, AuthError> {
        let email = email.trim();
        let name = name.trim();

        validate_email(email)?;
        require("Password", password)?;
        validate_name(name)?;
        self.policy.check(password)?;

        if self.users.find_by_email(email)?.is_some() {
            tracing::info!("Registration rejected: email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash(password)?;

        // A concurrent registration can still win the insert; the repository
        // reports that as DuplicateEmail.
        let credential = self.users.insert(NewCredential {
            email: email.to_string(),
            password_hash,
            name: name.to_string(),
            role: Role::User,
        })?;

        tracing::info!("User registered: id={}", credential.id);
        self.start_session(User::from(&credential))
    }

    /// Check credentials and sign in.
    ///
    /// Unknown email and wrong password are the same `InvalidCredentials`.
    pub fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim();
        require("Email", email)?;
        require("Password", password)?;

        let Some(credential) = self.users.find_by_email(email)? else {
            self.hasher.verify(password, &self.dummy_hash)?;
            tracing::warn!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &credential.password_hash)? {
            tracing::warn!("Login failed: wrong password for user {}", credential.id);
            return Err(AuthError::InvalidCredentials);
        }

        // Update last login time (log but don't fail on error)
        if let Err(e) = self.users.record_login(credential.id) {
            tracing::warn!("Failed to update last login for user {}: {}", credential.id, e);
        }

        tracing::info!("User {} logged in", credential.id);
        self.start_session(User::from(&credential))
    }

    /// Current profile for an authenticated user ID
    pub fn me(&self, user_id: i64) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)?
            .map(|credential| User::from(&credential))
            .ok_or(AuthError::UserNotFound)
    }
}
