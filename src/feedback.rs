//! Star-rating feedback workflow for previous bookings
//!
//! The modal is a small state machine:
//!
//! ```text
//! Closed --open--> Open --begin_submit--> Submitting --Accepted--> Succeeded --dismiss--> Closed
//!                   ^                          |
//!                   +--------Rejected----------+
//! ```
//!
//! Validation failures leave the phase untouched and only set the error
//! message. The network round trip sits behind [`FeedbackSubmitter`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Booking, FeedbackMark};

pub const MAX_RATING: u8 = 5;
pub const SUCCESS_MESSAGE: &str = "Feedback submitted successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackPhase {
    Closed,
    Open,
    Submitting,
    Succeeded,
}

/// Payload handed to the submitter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub booking_id: String,
    pub customer_id: String,
    pub rating: u8,
    pub feedback_suggestion: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Accepted,
    Rejected(String),
}

/// Local validation failures. `Display` is the message shown in the modal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedbackError {
    #[error("No booking selected for feedback.")]
    NotOpen,

    #[error("Please select a star rating.")]
    MissingRating,

    #[error("Rating must be between 1 and 5 stars (got {0}).")]
    InvalidRating(u8),

    #[error("Booking {0} is no longer available.")]
    BookingNotFound(String),

    #[error("Feedback already submitted for this booking.")]
    AlreadySubmitted,
}

/// Capability to deliver feedback somewhere.
#[async_trait]
pub trait FeedbackSubmitter: Send + Sync {
    async fn submit(&self, request: &FeedbackRequest) -> SubmissionOutcome;
}

/// Stand-in for a backend call: waits a fixed latency and accepts.
#[derive(Debug, Clone)]
pub struct SimulatedSubmitter {
    pub latency: Duration,
}

impl SimulatedSubmitter {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SimulatedSubmitter {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

#[async_trait]
impl FeedbackSubmitter for SimulatedSubmitter {
    async fn submit(&self, request: &FeedbackRequest) -> SubmissionOutcome {
        tokio::time::sleep(self.latency).await;
        info!(
            "Simulated backend accepted feedback for {} ({} stars)",
            request.booking_id, request.rating
        );
        SubmissionOutcome::Accepted
    }
}

/// Modal state for one feedback entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackModal {
    pub phase: FeedbackPhase,
    pub selected: Option<String>,
    pub rating: u8,
    pub suggestion: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl Default for FeedbackModal {
    fn default() -> Self {
        Self {
            phase: FeedbackPhase::Closed,
            selected: None,
            rating: 0,
            suggestion: String::new(),
            error: None,
            success: None,
        }
    }
}

impl FeedbackModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.phase != FeedbackPhase::Closed
    }

    /// Pin `booking` and reset the form.
    pub fn open(&mut self, booking: &Booking) {
        self.phase = FeedbackPhase::Open;
        self.selected = Some(booking.booking_id.clone());
        self.rating = 0;
        self.suggestion.clear();
        self.error = None;
        self.success = None;
    }

    pub fn close(&mut self) {
        self.phase = FeedbackPhase::Closed;
        self.selected = None;
    }

    /// Set the star rating; 0 clears it.
    pub fn set_rating(&mut self, rating: u8) -> Result<(), FeedbackError> {
        if self.phase != FeedbackPhase::Open {
            return Err(FeedbackError::NotOpen);
        }
        if rating > MAX_RATING {
            return Err(FeedbackError::InvalidRating(rating));
        }
        self.rating = rating;
        Ok(())
    }

    pub fn set_suggestion(&mut self, text: &str) {
        if self.phase == FeedbackPhase::Open {
            self.suggestion = text.to_string();
        }
    }

    pub fn push_suggestion_char(&mut self, c: char) {
        if self.phase == FeedbackPhase::Open {
            self.suggestion.push(c);
        }
    }

    pub fn pop_suggestion_char(&mut self) {
        if self.phase == FeedbackPhase::Open {
            self.suggestion.pop();
        }
    }

    /// Validate the form and move to `Submitting`.
    ///
    /// On error the phase is unchanged and the message is stored in `error`.
    pub fn begin_submit(&mut self, bookings: &[Booking]) -> Result<FeedbackRequest, FeedbackError> {
        let result = self.validate(bookings);
        match result {
            Ok(_) => {
                self.error = None;
                self.phase = FeedbackPhase::Submitting;
            }
            Err(ref e) => {
                warn!("Feedback rejected locally: {}", e);
                self.error = Some(e.to_string());
            }
        }
        result
    }

    fn validate(&self, bookings: &[Booking]) -> Result<FeedbackRequest, FeedbackError> {
        let booking_id = match (&self.phase, &self.selected) {
            (FeedbackPhase::Open, Some(id)) => id,
            _ => return Err(FeedbackError::NotOpen),
        };

        if self.rating == 0 {
            return Err(FeedbackError::MissingRating);
        }

        let booking = bookings
            .iter()
            .find(|b| &b.booking_id == booking_id)
            .ok_or_else(|| FeedbackError::BookingNotFound(booking_id.clone()))?;

        let request = FeedbackRequest {
            booking_id: booking.booking_id.clone(),
            customer_id: booking.customer_id.clone(),
            rating: self.rating,
            feedback_suggestion: self.suggestion.clone(),
        };
        // every attempt that reaches a booking is logged, duplicates included
        info!("Sending feedback: {:?}", request);

        if booking.has_feedback() {
            return Err(FeedbackError::AlreadySubmitted);
        }
        Ok(request)
    }

    /// Apply the submitter's answer for `request`.
    ///
    /// An accepted submission always marks the booking, even if the modal
    /// was dismissed while the call was in flight.
    pub fn complete(&mut self, request: &FeedbackRequest, outcome: &SubmissionOutcome, bookings: &mut [Booking]) {
        let still_showing = self.phase == FeedbackPhase::Submitting
            && self.selected.as_deref() == Some(request.booking_id.as_str());

        match outcome {
            SubmissionOutcome::Accepted => {
                if let Some(booking) = bookings.iter_mut().find(|b| b.booking_id == request.booking_id) {
                    booking.feedback = FeedbackMark::Submitted;
                }
                info!("Feedback recorded for {}", request.booking_id);
                if still_showing {
                    self.phase = FeedbackPhase::Succeeded;
                    self.success = Some(SUCCESS_MESSAGE.to_string());
                }
            }
            SubmissionOutcome::Rejected(reason) => {
                warn!("Feedback for {} rejected: {}", request.booking_id, reason);
                if still_showing {
                    self.phase = FeedbackPhase::Open;
                    self.error = Some(reason.clone());
                }
            }
        }
    }

    /// Auto-dismiss after success, only if the modal still shows that result.
    pub fn dismiss_if_current(&mut self, booking_id: &str) -> bool {
        if self.phase == FeedbackPhase::Succeeded && self.selected.as_deref() == Some(booking_id) {
            self.close();
            true
        } else {
            false
        }
    }
}

/// Run the whole submission: validate, await the submitter, record the
/// outcome and, on success, close the modal after `dismiss_after`.
pub async fn submit_and_dismiss(
    modal: &mut FeedbackModal,
    bookings: &mut [Booking],
    submitter: &dyn FeedbackSubmitter,
    dismiss_after: Duration,
) -> Result<SubmissionOutcome, FeedbackError> {
    let request = modal.begin_submit(bookings)?;
    let outcome = submitter.submit(&request).await;
    modal.complete(&request, &outcome, bookings);

    if outcome == SubmissionOutcome::Accepted {
        tokio::time::sleep(dismiss_after).await;
        modal.dismiss_if_current(&request.booking_id);
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::generate_with_seed;
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};

    struct RejectingSubmitter;

    #[async_trait]
    impl FeedbackSubmitter for RejectingSubmitter {
        async fn submit(&self, _request: &FeedbackRequest) -> SubmissionOutcome {
            SubmissionOutcome::Rejected("Service unavailable".to_string())
        }
    }

    fn bookings() -> Vec<Booking> {
        generate_with_seed(10, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(), Some(5))
    }

    fn instant() -> SimulatedSubmitter {
        SimulatedSubmitter::new(Duration::ZERO)
    }

    #[test]
    fn test_open_resets_form() {
        let bookings = bookings();
        let mut modal = FeedbackModal::new();
        modal.open(&bookings[0]);
        modal.set_rating(4).unwrap();
        modal.set_suggestion("faster please");
        modal.error = Some("old".to_string());

        modal.open(&bookings[1]);
        assert_eq!(modal.phase, FeedbackPhase::Open);
        assert_eq!(modal.selected.as_deref(), Some("BK-2025002"));
        assert_eq!(modal.rating, 0);
        assert!(modal.suggestion.is_empty());
        assert_eq!(modal.error, None);
        assert_eq!(modal.success, None);
    }

    #[test]
    fn test_missing_rating_is_rejected() {
        let bookings = bookings();
        let mut modal = FeedbackModal::new();
        modal.open(&bookings[0]);

        let err = modal.begin_submit(&bookings).unwrap_err();
        assert_eq!(err, FeedbackError::MissingRating);
        assert_eq!(modal.error.as_deref(), Some("Please select a star rating."));
        assert_eq!(modal.phase, FeedbackPhase::Open);
        assert!(!bookings[0].has_feedback());
    }

    #[test]
    fn test_rating_bounds() {
        let bookings = bookings();
        let mut modal = FeedbackModal::new();
        assert_eq!(modal.set_rating(3), Err(FeedbackError::NotOpen));
        modal.open(&bookings[0]);
        assert_eq!(modal.set_rating(6), Err(FeedbackError::InvalidRating(6)));
        modal.set_rating(5).unwrap();
        assert_eq!(modal.rating, 5);
    }

    #[test]
    fn test_begin_submit_builds_request() {
        let bookings = bookings();
        let mut modal = FeedbackModal::new();
        modal.open(&bookings[2]);
        modal.set_rating(3).unwrap();
        modal.set_suggestion("call before delivery");

        let request = modal.begin_submit(&bookings).unwrap();
        assert_eq!(request.booking_id, "BK-2025003");
        assert_eq!(request.customer_id, "CUST-1003");
        assert_eq!(request.rating, 3);
        assert_eq!(request.feedback_suggestion, "call before delivery");
        assert_eq!(modal.phase, FeedbackPhase::Submitting);

        // a second attempt while in flight is refused
        assert_eq!(modal.begin_submit(&bookings), Err(FeedbackError::NotOpen));
    }

    #[tokio::test]
    async fn test_second_submission_is_duplicate() {
        let mut bookings = bookings();
        let mut modal = FeedbackModal::new();
        let submitter = instant();

        modal.open(&bookings[0].clone());
        modal.set_rating(5).unwrap();
        let outcome = submit_and_dismiss(&mut modal, &mut bookings, &submitter, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(outcome, SubmissionOutcome::Accepted);
        assert!(bookings[0].has_feedback());
        assert_eq!(modal.phase, FeedbackPhase::Closed);
        assert_eq!(modal.selected, None);

        modal.open(&bookings[0].clone());
        modal.set_rating(2).unwrap();
        let err = submit_and_dismiss(&mut modal, &mut bookings, &submitter, Duration::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err, FeedbackError::AlreadySubmitted);
        assert_eq!(
            modal.error.as_deref(),
            Some("Feedback already submitted for this booking.")
        );
        assert_eq!(modal.phase, FeedbackPhase::Open);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_duplicate_attempt_is_logged() {
        let mut bookings = bookings();
        bookings[3].feedback = FeedbackMark::Submitted;
        let mut modal = FeedbackModal::new();
        modal.open(&bookings[3].clone());
        modal.set_rating(3).unwrap();

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let result = tracing::subscriber::with_default(subscriber, || modal.begin_submit(&bookings));

        assert_eq!(result, Err(FeedbackError::AlreadySubmitted));
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Sending feedback"));
        assert!(output.contains(&bookings[3].booking_id));
    }

    #[test]
    fn test_success_message_before_dismiss() {
        let mut bookings = bookings();
        let mut modal = FeedbackModal::new();
        modal.open(&bookings[1].clone());
        modal.set_rating(4).unwrap();
        let request = modal.begin_submit(&bookings).unwrap();

        modal.complete(&request, &SubmissionOutcome::Accepted, &mut bookings);
        assert_eq!(modal.phase, FeedbackPhase::Succeeded);
        assert_eq!(modal.success.as_deref(), Some(SUCCESS_MESSAGE));
        assert!(bookings[1].has_feedback());

        assert!(!modal.dismiss_if_current("BK-2025009"));
        assert!(modal.dismiss_if_current("BK-2025002"));
        assert!(!modal.is_open());
    }

    #[tokio::test]
    async fn test_rejection_returns_to_open() {
        let mut bookings = bookings();
        let mut modal = FeedbackModal::new();
        modal.open(&bookings[3].clone());
        modal.set_rating(1).unwrap();

        let outcome = submit_and_dismiss(&mut modal, &mut bookings, &RejectingSubmitter, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(outcome, SubmissionOutcome::Rejected("Service unavailable".to_string()));
        assert_eq!(modal.phase, FeedbackPhase::Open);
        assert_eq!(modal.error.as_deref(), Some("Service unavailable"));
        assert!(!bookings[3].has_feedback());
    }

    #[test]
    fn test_completion_after_close_still_marks_booking() {
        let mut bookings = bookings();
        let mut modal = FeedbackModal::new();
        modal.open(&bookings[4].clone());
        modal.set_rating(5).unwrap();
        let request = modal.begin_submit(&bookings).unwrap();
        modal.close();

        modal.complete(&request, &SubmissionOutcome::Accepted, &mut bookings);
        assert!(bookings[4].has_feedback());
        assert_eq!(modal.phase, FeedbackPhase::Closed);
        assert_eq!(modal.success, None);
    }
}
