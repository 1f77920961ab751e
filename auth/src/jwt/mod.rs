//! HS256 bearer tokens carrying a subject, an issue time and an expiry.

mod claims;
mod errors;
mod handler;

pub use claims::Claims;
pub use errors::JwtError;
pub use handler::JwtHandler;
