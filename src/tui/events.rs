//! Events reported back to the TUI loop by background tasks

use crate::feedback::{FeedbackRequest, SubmissionOutcome};

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The submitter answered a feedback request
    FeedbackResolved {
        request: FeedbackRequest,
        outcome: SubmissionOutcome,
    },
    /// Success message has been shown long enough
    FeedbackDismiss { booking_id: String },
}
