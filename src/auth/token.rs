//! Signed session tokens (JWT, HS256).
//!
//! Tokens are stateless: nothing is stored server side, so expiry is the only
//! way a token stops being valid short of the client discarding it.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// Identity claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    /// Issued at, seconds since the epoch
    pub iat: i64,
    /// Expiration, seconds since the epoch
    pub exp: i64,
}

impl Claims {
    /// Subject parsed back into a user ID
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token signature invalid")]
    InvalidSignature,
    #[error("signing secret is empty")]
    MissingSecret,
    #[error("token encoding failed: {0}")]
    Encoding(jsonwebtoken::errors::Error),
}

/// Issues and verifies session tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.trim().is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, TokenError> {
        Self::new(&config.jwt_secret, config.token_ttl())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject`, valid for the configured lifetime from now
    pub fn issue(&self, subject: &str, email: &str) -> Result<String, TokenError> {
        self.issue_at(subject, email, Utc::now())
    }

    /// Issue a token as if it had been issued at `issued_at`
    pub fn issue_at(
        &self,
        subject: &str,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            email: email.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }

    /// Check signature and expiry, returning the embedded claims.
    ///
    /// The signature is checked before expiry, so a forged token reports
    /// `InvalidSignature` even when its `exp` is also in the past.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::InvalidSignature,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(secret, Duration::hours(24)).unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service("test-secret");
        let token = tokens.issue("42", "a@x.com").unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_other_secret_is_invalid_signature() {
        let token = service("secret-one").issue("1", "a@x.com").unwrap();
        assert!(matches!(
            service("secret-two").verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service("test-secret");
        let issued = Utc::now() - Duration::hours(25);
        let token = tokens.issue_at("1", "a@x.com", issued).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_token_just_inside_lifetime_is_valid() {
        let tokens = service("test-secret");
        let issued = Utc::now() - Duration::hours(23);
        let token = tokens.issue_at("1", "a@x.com", issued).unwrap();
        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn test_expired_token_from_other_secret_is_invalid_signature() {
        let issued = Utc::now() - Duration::hours(48);
        let token = service("secret-one").issue_at("1", "a@x.com", issued).unwrap();
        assert!(matches!(
            service("secret-two").verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_tampered_and_garbage_tokens() {
        let tokens = service("test-secret");
        let token = tokens.issue("1", "a@x.com").unwrap();

        // Swap the payload for one claiming a different subject
        let other = tokens.issue("2", "b@x.com").unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);
        assert!(matches!(tokens.verify(&forged), Err(TokenError::InvalidSignature)));

        assert!(matches!(tokens.verify("not-a-token"), Err(TokenError::InvalidSignature)));
        assert!(matches!(tokens.verify(""), Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            TokenService::new("", Duration::hours(1)),
            Err(TokenError::MissingSecret)
        ));
        assert!(matches!(
            TokenService::new("   ", Duration::hours(1)),
            Err(TokenError::MissingSecret)
        ));
    }

    #[test]
    fn test_non_numeric_subject() {
        let tokens = service("test-secret");
        let token = tokens.issue("not-an-id", "a@x.com").unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user_id(), None);
    }
}
