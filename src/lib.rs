//! parceldesk: profile, support and previous-bookings views of a parcel
//! management system, as a library with a CLI and a terminal UI on top.

pub mod config;
pub mod errors;
pub mod export;
pub mod feedback;
pub mod listing;
pub mod mock;
pub mod models;
pub mod profile;
pub mod storage;
pub mod tui;

pub use errors::{ParcelError, Result};
