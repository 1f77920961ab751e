//! Argon2id password digests in PHC string format.

mod argon2;
mod errors;

pub use self::argon2::HashCost;
pub use self::argon2::PasswordHasher;
pub use errors::PasswordError;
