//! Request middleware and extractors.

mod auth;
mod json;

pub use auth::*;
pub use json::*;
