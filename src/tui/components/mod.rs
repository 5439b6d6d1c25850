//! Reusable UI components for the parceldesk TUI

pub mod booking_table;
pub mod feedback_modal;

pub use booking_table::{BookingTable, BookingTableConfig};
pub use feedback_modal::render_feedback_modal;
