//! Domain services behind the HTTP handlers.
//!
//! Every operation fails fast in the same order: input parsing and
//! validation, then existence of referenced records, then uniqueness, and
//! only then the write.

pub mod account;
pub mod attendance;
pub mod catalog;
pub mod shows;
pub mod validation;
