//! HTTP protocol definitions for the JamTracker API.
//!
//! This crate defines the JSON bodies exchanged between clients and the
//! JamTracker server, including the error envelope shared by every failing
//! response.

mod error;
mod requests;
mod responses;

pub use error::*;
pub use requests::*;
pub use responses::*;
