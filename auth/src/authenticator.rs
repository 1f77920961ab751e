use chrono::Duration;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;

/// Bearer token issuer and verifier.
///
/// Binds a subject identity into a signed, time-limited token and resolves
/// tokens back to that subject.
pub struct Authenticator {
    jwt_handler: JwtHandler,
    token_ttl: Duration,
}

impl Authenticator {
    pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 60 * 60;

    /// Create a new authenticator with the default one hour token lifetime.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    ///
    /// # Returns
    /// Configured Authenticator instance
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            jwt_handler: JwtHandler::new(jwt_secret),
            token_ttl: Duration::seconds(Self::DEFAULT_TOKEN_TTL_SECONDS),
        }
    }

    /// Override the token lifetime.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Issue a signed token for a subject.
    ///
    /// # Arguments
    /// * `subject` - Identity to bind (the user id)
    ///
    /// # Returns
    /// JWT token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_token(&self, subject: impl ToString) -> Result<String, JwtError> {
        let claims = Claims::for_subject(subject, self.token_ttl);
        self.jwt_handler.encode(&claims)
    }

    /// Validate a token and return the subject it binds.
    ///
    /// # Errors
    /// * `Malformed` - Input is not a JWT
    /// * `TokenExpired` - Token lifetime has elapsed
    /// * `InvalidToken` - Signature mismatch or missing claims
    pub fn verify_token(&self, token: &str) -> Result<String, JwtError> {
        self.jwt_handler.decode(token).map(|claims| claims.sub)
    }
}
