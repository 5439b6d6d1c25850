//! Screen modules for the parceldesk TUI

pub mod bookings;
pub mod profile;
pub mod support;

pub use bookings::BookingsScreen;
pub use profile::ProfileScreen;
pub use support::SupportScreen;
