use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One parcel shipment entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub customer_id: String,
    pub booking_id: String,
    pub booking_date: NaiveDate,
    pub receiver_name: String,
    pub delivered_address: String,
    pub amount: u32,
    pub status: BookingStatus,
    #[serde(rename = "hasFeedback", default)]
    pub feedback: FeedbackMark,
}

impl Booking {
    pub fn has_feedback(&self) -> bool {
        self.feedback.is_submitted()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    #[serde(rename = "In Transit")]
    InTransit,
    Delivered,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::InTransit,
        BookingStatus::Delivered,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::InTransit => "In Transit",
            BookingStatus::Delivered => "Delivered",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "in transit" | "in-transit" | "in_transit" | "intransit" => Ok(BookingStatus::InTransit),
            "delivered" => Ok(BookingStatus::Delivered),
            "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
            other => Err(anyhow::anyhow!(
                "Unknown booking status: {}. Expected one of: Pending, In Transit, Delivered, Cancelled",
                other
            )),
        }
    }
}

/// Whether feedback has been recorded for a booking.
///
/// `Unknown` keeps the "never set" case apart from an explicit `false`;
/// on the wire it is `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum FeedbackMark {
    #[default]
    Unknown,
    NotSubmitted,
    Submitted,
}

impl FeedbackMark {
    pub fn is_submitted(&self) -> bool {
        matches!(self, FeedbackMark::Submitted)
    }
}

impl From<Option<bool>> for FeedbackMark {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            None => FeedbackMark::Unknown,
            Some(false) => FeedbackMark::NotSubmitted,
            Some(true) => FeedbackMark::Submitted,
        }
    }
}

impl From<FeedbackMark> for Option<bool> {
    fn from(mark: FeedbackMark) -> Self {
        match mark {
            FeedbackMark::Unknown => None,
            FeedbackMark::NotSubmitted => Some(false),
            FeedbackMark::Submitted => Some(true),
        }
    }
}

/// User record persisted under the `user_data` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Any other fields the record carries, kept as-is for display
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Outcome of reading the persisted user record.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileState {
    Missing,
    Loaded(UserProfile),
    Malformed,
}

impl ProfileState {
    /// Profile to display; absent and unreadable records show as empty.
    pub fn profile(&self) -> UserProfile {
        match self {
            ProfileState::Loaded(profile) => profile.clone(),
            ProfileState::Missing | ProfileState::Malformed => UserProfile::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportContact {
    pub company_email: &'static str,
    pub support_phone: &'static str,
    pub working_days: &'static str,
    pub working_hours: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_booking() -> Booking {
        Booking {
            customer_id: "CUST-1001".to_string(),
            booking_id: "BK-2025001".to_string(),
            booking_date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            receiver_name: "Receiver 1".to_string(),
            delivered_address: "1 Main St, City 1".to_string(),
            amount: 120,
            status: BookingStatus::InTransit,
            feedback: FeedbackMark::NotSubmitted,
        }
    }

    #[test]
    fn test_booking_serializes_with_original_keys() {
        let json = serde_json::to_value(sample_booking()).unwrap();
        assert_eq!(json["bookingId"], "BK-2025001");
        assert_eq!(json["bookingDate"], "2024-03-14");
        assert_eq!(json["status"], "In Transit");
        assert_eq!(json["hasFeedback"], false);
    }

    #[test]
    fn test_missing_feedback_flag_is_unknown() {
        let json = r#"{
            "customerId": "CUST-1002",
            "bookingId": "BK-2025002",
            "bookingDate": "2024-05-01",
            "receiverName": "Receiver 2",
            "deliveredAddress": "2 Main St, City 2",
            "amount": 77,
            "status": "Delivered"
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.feedback, FeedbackMark::Unknown);
        assert!(!booking.has_feedback());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("in transit".parse::<BookingStatus>().unwrap(), BookingStatus::InTransit);
        assert_eq!("DELIVERED".parse::<BookingStatus>().unwrap(), BookingStatus::Delivered);
        assert_eq!("in-transit".parse::<BookingStatus>().unwrap(), BookingStatus::InTransit);
        assert!("lost".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_profile_keeps_unknown_fields() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"name":"Asha","email":"asha@example.com","role":"admin"}"#).unwrap();
        assert_eq!(profile.name.as_deref(), Some("Asha"));
        assert_eq!(profile.phone, None);
        assert_eq!(profile.extra["role"], "admin");
    }

    #[test]
    fn test_malformed_profile_displays_empty() {
        assert_eq!(ProfileState::Malformed.profile(), UserProfile::default());
        assert_eq!(ProfileState::Missing.profile(), UserProfile::default());
    }
}
