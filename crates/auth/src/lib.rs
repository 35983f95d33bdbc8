//! Authentication primitives for JamTracker.
//!
//! This crate provides:
//! - Argon2id password hashing and verification
//! - Stateless HS256 session tokens (JWT) embedding the user id

mod error;
mod jwt;
mod password;

pub use error::*;
pub use jwt::*;
pub use password::*;

/// Default session lifetime in hours (7 days).
pub const DEFAULT_JWT_EXPIRATION_HOURS: u64 = 24 * 7;

/// Default JWT issuer.
pub const DEFAULT_JWT_ISSUER: &str = "jamtracker";
