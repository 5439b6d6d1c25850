//! Synthetic booking data for the previous-bookings view

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::models::{Booking, BookingStatus, FeedbackMark};

/// Earliest date a generated booking can carry.
pub fn earliest_booking_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Generate `count` bookings dated between 2024-01-01 and `today`.
pub fn generate_bookings<R: Rng>(count: usize, today: NaiveDate, rng: &mut R) -> Vec<Booking> {
    let start = earliest_booking_date();
    let span_days = (today - start).num_days().max(0);

    let bookings: Vec<Booking> = (1..=count)
        .map(|i| Booking {
            customer_id: format!("CUST-{}", 1000 + i),
            booking_id: format!("BK-{}", 2025000 + i),
            booking_date: start + Duration::days(rng.random_range(0..=span_days)),
            receiver_name: format!("Receiver {}", i),
            delivered_address: format!("{} Main St, City {}", i, i),
            amount: rng.random_range(50..550),
            status: BookingStatus::ALL[rng.random_range(0..BookingStatus::ALL.len())],
            feedback: FeedbackMark::NotSubmitted,
        })
        .collect();

    debug!("Generated {} mock bookings up to {}", bookings.len(), today);
    bookings
}

/// Generate bookings from a fixed seed, or from OS entropy when none is given.
pub fn generate_with_seed(count: usize, today: NaiveDate, seed: Option<u64>) -> Vec<Booking> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    generate_bookings(count, today, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    #[test]
    fn test_generated_records_follow_naming() {
        let bookings = generate_with_seed(50, today(), Some(7));
        assert_eq!(bookings.len(), 50);
        assert_eq!(bookings[0].customer_id, "CUST-1001");
        assert_eq!(bookings[0].booking_id, "BK-2025001");
        assert_eq!(bookings[49].booking_id, "BK-2025050");
        assert_eq!(bookings[9].delivered_address, "10 Main St, City 10");
        assert_eq!(bookings[9].receiver_name, "Receiver 10");
    }

    #[test]
    fn test_generated_values_stay_in_range() {
        let bookings = generate_with_seed(200, today(), Some(42));
        for booking in &bookings {
            assert!((50..=549).contains(&booking.amount));
            assert!(booking.booking_date >= earliest_booking_date());
            assert!(booking.booking_date <= today());
            assert_eq!(booking.feedback, FeedbackMark::NotSubmitted);
        }
        let ids: HashSet<_> = bookings.iter().map(|b| b.booking_id.as_str()).collect();
        assert_eq!(ids.len(), bookings.len());
    }

    #[test]
    fn test_same_seed_same_dataset() {
        assert_eq!(generate_with_seed(10, today(), Some(3)), generate_with_seed(10, today(), Some(3)));
    }

    #[test]
    fn test_today_before_start_pins_dates() {
        let early = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        let bookings = generate_with_seed(5, early, Some(1));
        assert!(bookings.iter().all(|b| b.booking_date == earliest_booking_date()));
    }
}
