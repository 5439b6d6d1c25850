//! Centralized configuration management for parceldesk

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite key-value store holding the user record
    pub store_path: PathBuf,
    /// Directory export files are written to
    pub export_dir: PathBuf,
    /// Bookings shown per page
    pub page_size: usize,
    /// Mock data generation
    pub mock: MockConfig,
    /// Simulated feedback round trip
    pub feedback: FeedbackTiming,
}

/// Mock booking dataset configuration
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Number of generated bookings
    pub booking_count: usize,
    /// Fixed seed for a reproducible dataset
    pub seed: Option<u64>,
}

/// Delays of the simulated feedback submission
#[derive(Debug, Clone)]
pub struct FeedbackTiming {
    /// Simulated network latency (milliseconds)
    pub latency_ms: u64,
    /// How long the success message stays before the modal closes (milliseconds)
    pub dismiss_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            booking_count: 50,
            seed: None,
        }
    }
}

impl Default for FeedbackTiming {
    fn default() -> Self {
        Self {
            latency_ms: 500,
            dismiss_ms: 1500,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let store_path = std::env::var("PARCELDESK_STORE_PATH")
            .unwrap_or_else(|_| "./parceldesk.db".to_string())
            .into();

        let export_dir = std::env::var("PARCELDESK_EXPORT_DIR")
            .unwrap_or_else(|_| "./exports".to_string())
            .into();

        let page_size = parse_env_var("PARCELDESK_PAGE_SIZE")?.unwrap_or(10);

        let mock = MockConfig {
            booking_count: parse_env_var("PARCELDESK_MOCK_BOOKINGS")?.unwrap_or(50),
            seed: parse_env_var("PARCELDESK_MOCK_SEED")?,
        };

        let feedback = FeedbackTiming {
            latency_ms: parse_env_var("PARCELDESK_FEEDBACK_LATENCY_MS")?.unwrap_or(500),
            dismiss_ms: parse_env_var("PARCELDESK_FEEDBACK_DISMISS_MS")?.unwrap_or(1500),
        };

        Ok(Config {
            store_path,
            export_dir,
            page_size,
            mock,
            feedback,
        })
    }

    /// Get store path as string
    pub fn store_path_str(&self) -> &str {
        self.store_path.to_str().unwrap_or("./parceldesk.db")
    }

    /// Get simulated submission latency as Duration
    pub fn feedback_latency(&self) -> Duration {
        Duration::from_millis(self.feedback.latency_ms)
    }

    /// Get success auto-dismiss delay as Duration
    pub fn feedback_dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.feedback.dismiss_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(anyhow::anyhow!("Page size must be at least 1"));
        }

        // Check if parent directory of the store exists
        if let Some(parent) = self.store_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(anyhow::anyhow!(
                    "Store parent directory does not exist: {}",
                    parent.display()
                ));
            }
        }

        std::fs::create_dir_all(&self.export_dir)
            .with_context(|| format!("Cannot create export directory: {}", self.export_dir.display()))?;

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.store_path_str(), "./parceldesk.db");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.mock.booking_count, 50);
        assert_eq!(config.mock.seed, None);
        assert_eq!(config.feedback_latency(), Duration::from_millis(500));
        assert_eq!(config.feedback_dismiss_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn test_config_validation() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::from_env().unwrap();
        config.store_path = temp_dir.path().join("parceldesk.db");
        config.export_dir = temp_dir.path().join("exports");
        config.validate().unwrap();
        assert!(config.export_dir.exists());

        config.page_size = 0;
        assert!(config.validate().is_err());

        config.page_size = 10;
        config.store_path = temp_dir.path().join("missing").join("parceldesk.db");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_env_var_reports_bad_values() {
        std::env::set_var("PARCELDESK_TEST_BAD_NUMBER", "ten");
        let parsed: Result<Option<usize>> = parse_env_var("PARCELDESK_TEST_BAD_NUMBER");
        assert!(parsed.is_err());
        assert_eq!(parse_env_var::<usize>("PARCELDESK_TEST_UNSET").unwrap(), None);
    }
}
