use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for CPF validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CpfError {
    #[error("CPF must have exactly 11 digits, got {actual}")]
    InvalidLength { actual: usize },

    #[error("CPF contains invalid characters")]
    InvalidCharacters,

    #[error("CPF is not valid")]
    InvalidCheckDigits,
}

/// Error for bounded text fields (names, address parts)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TextFieldError {
    #[error("{field} is required")]
    Empty { field: &'static str },

    #[error("{field} length must be between {min} and {max} characters, got {actual}")]
    OutOfRange {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },
}

/// Error for password policy failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password length must be between {min} and {max} characters, got {actual}")]
    InvalidLength {
        min: usize,
        max: usize,
        actual: usize,
    },
}

/// Error for birthdate parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BirthdateError {
    #[error("Birthdate must be a valid ISO8601 date: {0}")]
    InvalidFormat(String),
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid CPF: {0}")]
    InvalidCpf(#[from] CpfError),

    #[error("Invalid field: {0}")]
    InvalidField(#[from] TextFieldError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordPolicyError),

    #[error("Invalid birthdate: {0}")]
    InvalidBirthdate(#[from] BirthdateError),

    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    // Domain-level errors
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("User not found with CPF: {0}")]
    NotFoundByCpf(String),

    #[error("Actual user not provided: {0}")]
    ActorNotFound(String),

    #[error("CPF already exists: {0}")]
    CpfAlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        UserError::Unknown(err.to_string())
    }
}
