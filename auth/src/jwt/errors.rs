use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    /// Input is not structurally a JWT (segments, base64 or JSON payload).
    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token is expired")]
    TokenExpired,

    /// Signature mismatch, tampering, or a missing required claim.
    #[error("Token is invalid: {0}")]
    InvalidToken(String),
}
