use clap::{Parser, Subcommand};
use chrono::NaiveDate;

#[derive(Parser)]
#[command(name = "parceldesk")]
#[command(about = "Parcel management front end: profile, support contact and previous bookings")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Key-value store path (overrides PARCELDESK_STORE_PATH)
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Seed for the mock booking dataset (overrides PARCELDESK_MOCK_SEED)
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Number of mock bookings to generate (overrides PARCELDESK_MOCK_BOOKINGS)
    #[arg(long, global = true)]
    pub bookings: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the stored user profile
    Profile {
        /// Store raw user data (JSON) before displaying it
        #[arg(long)]
        set: Option<String>,

        /// Remove the stored user data
        #[arg(long, conflicts_with = "set")]
        clear: bool,
    },

    /// Show support contact information
    Support,

    /// List previous bookings with optional filters
    Bookings {
        /// Booking id substring (case-insensitive)
        #[arg(short, long)]
        id: Option<String>,

        /// Exact booking date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Status (pending, in-transit, delivered, cancelled)
        #[arg(short, long)]
        status: Option<String>,

        /// Page to show (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Bookings per page (overrides PARCELDESK_PAGE_SIZE)
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Export the full booking collection
    Export {
        /// Export format (xlsx, pdf, csv, all)
        #[arg(short, long, default_value = "all")]
        format: String,

        /// Output directory (overrides PARCELDESK_EXPORT_DIR)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Rate a booking through the simulated feedback workflow
    Feedback {
        /// Booking id to rate
        #[arg(short, long)]
        booking: String,

        /// Star rating 1-5
        #[arg(short, long, default_value = "0")]
        rating: u8,

        /// Free-text suggestion
        #[arg(short, long, default_value = "")]
        note: String,

        /// Submit the same feedback a second time to exercise the duplicate guard
        #[arg(long)]
        twice: bool,
    },

    /// Launch the terminal UI
    Tui,
}
