use std::fmt;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::BirthdateError;
use crate::user::errors::CpfError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::TextFieldError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// `password_hash` always holds an Argon2 PHC digest, never plaintext.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub cpf: Cpf,
    pub name: PersonName,
    pub birthdate: DateTime<Utc>,
    pub password_hash: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<String>,
    pub address: Option<Address>,
}

impl User {
    /// Apply a merge-write: every `Some` field replaces the stored value.
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(cpf) = changes.cpf {
            self.cpf = cpf;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(birthdate) = changes.birthdate {
            self.birthdate = birthdate;
        }
        if let Some(password_hash) = changes.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(address) = changes.address {
            self.address = Some(address);
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(updated_at) = changes.updated_at {
            self.updated_at = updated_at;
        }
        if let Some(updated_by) = changes.updated_by {
            self.updated_by = Some(updated_by);
        }
        if let Some(removed_at) = changes.removed_at {
            self.removed_at = Some(removed_at);
        }
        if let Some(removed_by) = changes.removed_by {
            self.removed_by = Some(removed_by);
        }
    }
}

/// Record lifecycle state. `Removed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserStatus {
    #[default]
    Active,
    Removed,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Brazilian natural-person identifier.
///
/// Stored as 11 bare digits. Dots and dashes of the printed form
/// (`529.982.247-25`) are accepted on input and stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
    const LENGTH: usize = 11;

    /// Create a validated CPF.
    ///
    /// # Errors
    /// * `InvalidCharacters` - Contains anything but digits, `.` and `-`
    /// * `InvalidLength` - Not exactly 11 digits
    /// * `InvalidCheckDigits` - Check digits do not match, or all digits equal
    pub fn new(cpf: String) -> Result<Self, CpfError> {
        if !cpf
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '-')
        {
            return Err(CpfError::InvalidCharacters);
        }

        let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
        if digits.len() != Self::LENGTH {
            return Err(CpfError::InvalidLength {
                actual: digits.len(),
            });
        }

        if digits.iter().all(|d| *d == digits[0]) {
            return Err(CpfError::InvalidCheckDigits);
        }

        if Self::check_digit(&digits[..9]) != digits[9]
            || Self::check_digit(&digits[..10]) != digits[10]
        {
            return Err(CpfError::InvalidCheckDigits);
        }

        Ok(Self(digits.iter().map(|d| d.to_string()).collect()))
    }

    /// Modulo-11 check digit over a 9 or 10 digit prefix.
    fn check_digit(prefix: &[u32]) -> u32 {
        let weight_start = prefix.len() as u32 + 1;
        let sum: u32 = prefix
            .iter()
            .enumerate()
            .map(|(i, d)| d * (weight_start - i as u32))
            .sum();

        match (sum * 10) % 11 {
            10 => 0,
            digit => digit,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Person display name, 3 to 64 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 64;

    pub fn new(name: String) -> Result<Self, TextFieldError> {
        bounded_text("name", name, Self::MIN_LENGTH, Self::MAX_LENGTH).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password accepted at the boundary, before hashing.
///
/// Never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(String);

impl PlainPassword {
    const MIN_LENGTH: usize = 8;
    const MAX_LENGTH: usize = 64;

    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&length) {
            return Err(PasswordPolicyError::InvalidLength {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword(***)")
    }
}

/// Postal address owned by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl Address {
    /// Create a validated address.
    ///
    /// # Errors
    /// * `Empty` / `OutOfRange` - A field is missing or violates its length bounds
    pub fn new(
        street: String,
        number: String,
        complement: Option<String>,
        neighborhood: String,
        city: String,
        state: String,
        zip_code: String,
    ) -> Result<Self, TextFieldError> {
        Ok(Self {
            street: bounded_text("street", street, 6, 128)?,
            number: bounded_text("number", number, 1, 6)?,
            complement: complement
                .map(|c| bounded_text("complement", c, 4, 24))
                .transpose()?,
            neighborhood: bounded_text("neighborhood", neighborhood, 6, 48)?,
            city: bounded_text("city", city, 8, 48)?,
            state: bounded_text("state", state, 4, 48)?,
            zip_code: bounded_text("zipCode", zip_code, 8, 8)?,
        })
    }
}

fn bounded_text(
    field: &'static str,
    value: String,
    min: usize,
    max: usize,
) -> Result<String, TextFieldError> {
    if value.trim().is_empty() {
        return Err(TextFieldError::Empty { field });
    }

    let actual = value.chars().count();
    if actual < min || actual > max {
        return Err(TextFieldError::OutOfRange {
            field,
            min,
            max,
            actual,
        });
    }

    Ok(value)
}

/// Parse an ISO-8601 birthdate, either a calendar date (`1999-06-28`) or a
/// full RFC 3339 timestamp. Calendar dates are taken as midnight UTC.
///
/// # Errors
/// * `InvalidFormat` - Neither form parses
pub fn parse_birthdate(raw: &str) -> Result<DateTime<Utc>, BirthdateError> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| BirthdateError::InvalidFormat(raw.to_string()))
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterUserCommand {
    pub cpf: Cpf,
    pub name: PersonName,
    pub birthdate: DateTime<Utc>,
    pub password: PlainPassword,
    pub address: Option<Address>,
}

/// Command to update an existing user with optional validated fields.
///
/// Only provided fields will be updated. Audit fields are not part of the
/// command; the service stamps them.
#[derive(Debug, Default)]
pub struct UpdateUserCommand {
    pub cpf: Option<Cpf>,
    pub name: Option<PersonName>,
    pub birthdate: Option<DateTime<Utc>>,
    pub password: Option<PlainPassword>,
    pub address: Option<Address>,
}

/// Partial field set handed to the repository for a merge-write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub cpf: Option<Cpf>,
    pub name: Option<PersonName>,
    pub birthdate: Option<DateTime<Utc>>,
    pub password_hash: Option<String>,
    pub address: Option<Address>,
    pub status: Option<UserStatus>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<String>,
}
