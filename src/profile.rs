//! Profile and support views

use tracing::{error, info};

use crate::errors::Result;
use crate::models::{ProfileState, SupportContact, UserProfile};
use crate::storage::KeyValueStore;

/// Key the user record is persisted under.
pub const USER_DATA_KEY: &str = "user_data";

const SUPPORT: SupportContact = SupportContact {
    company_email: "shipin@gmail.com",
    support_phone: "+91 98765 43210",
    working_days: "Mon – Sat",
    working_hours: "9:00 AM – 6:00 PM",
};

pub fn support_contact() -> SupportContact {
    SUPPORT
}

/// Interpret the raw stored text. Unparseable content is logged, not fatal.
pub fn parse_profile(raw: Option<&str>) -> ProfileState {
    match raw {
        None => ProfileState::Missing,
        Some(text) => match serde_json::from_str::<UserProfile>(text) {
            Ok(profile) => ProfileState::Loaded(profile),
            Err(e) => {
                error!("Error parsing user data from store: {}", e);
                ProfileState::Malformed
            }
        },
    }
}

pub async fn load_profile(store: &KeyValueStore) -> Result<ProfileState> {
    let raw = store.get(USER_DATA_KEY).await?;
    Ok(parse_profile(raw.as_deref()))
}

/// Store user data verbatim; nothing is validated on write.
pub async fn save_profile_raw(store: &KeyValueStore, raw: &str) -> Result<()> {
    store.set(USER_DATA_KEY, raw).await?;
    info!("Saved user data ({} bytes)", raw.len());
    Ok(())
}

pub async fn save_profile(store: &KeyValueStore, profile: &UserProfile) -> Result<()> {
    let raw = serde_json::to_string(profile)?;
    save_profile_raw(store, &raw).await
}

/// Label/value rows for display, in a stable order.
pub fn profile_rows(profile: &UserProfile) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    let known = [
        ("Name", &profile.name),
        ("Email", &profile.email),
        ("Phone", &profile.phone),
        ("Address", &profile.address),
    ];
    for (label, value) in known {
        if let Some(value) = value {
            rows.push((label.to_string(), value.clone()));
        }
    }
    for (key, value) in &profile.extra {
        let shown = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        rows.push((key.clone(), shown));
    }
    rows
}
