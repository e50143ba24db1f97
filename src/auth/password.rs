//! Argon2id password hashing.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;

use crate::config::AuthConfig;

/// Password hashing errors
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("invalid Argon2 parameters: {0}")]
    InvalidParams(argon2::Error),
    #[error("password hashing failed: {0}")]
    HashingFailed(argon2::password_hash::Error),
    #[error("stored hash is malformed: {0}")]
    InvalidHash(argon2::password_hash::Error),
}

/// Salted, tunable-cost password hasher.
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, HashError> {
        let params =
            Params::new(memory_kib, iterations, parallelism, None).map_err(HashError::InvalidParams)?;
        Ok(Self { params })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, HashError> {
        Self::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
        )
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password into a PHC string with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(HashError::HashingFailed)?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// Uses the parameters encoded in the stored hash, so raising the cost later
    /// keeps old hashes verifiable. Mismatch is `Ok(false)`; only a malformed hash
    /// or a primitive failure is an error.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(stored_hash).map_err(HashError::InvalidHash)?;
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashError::HashingFailed(e)),
        }
    }
}
