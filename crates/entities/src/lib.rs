//! Core entity definitions for JamTracker.
//!
//! This crate defines the data types shared across the JamTracker service
//! (users, bands, venues, shows and attendance records) together with the
//! text normalization and date parsing rules that every entry point applies
//! before touching storage.

mod attendance;
mod band;
pub mod normalize;
mod show;
pub mod show_date;
mod user;
mod venue;

pub use attendance::*;
pub use band::*;
pub use show::*;
pub use show_date::{ShowDateError, calendar_date, parse_date_filter, parse_show_date};
pub use user::*;
pub use venue::*;
