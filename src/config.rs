//! Configuration types for report-sync

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, time::Duration};

/// Top-level configuration for one report stream sync
///
/// Groups the scope of the sync (tenant, window) with the behavioral knobs
/// (retry, polling, slicing). All behavioral fields have sensible defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the report API (e.g. `https://api.example.com`)
    pub base_url: String,

    /// Marketplace / tenant scope identifiers submitted with every report request
    #[serde(default)]
    pub marketplace_ids: Vec<String>,

    /// Start of the overall sync window
    pub start_date: DateTime<Utc>,

    /// End of the overall sync window (default: now, resolved at sync time)
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,

    /// Vendor-specific options passed through on report creation
    /// (e.g. `{"sellingProgram": "RETAIL"}`)
    #[serde(default)]
    pub report_options: BTreeMap<String, String>,

    /// Retry behavior for transient transport failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// Job status polling behavior
    #[serde(default)]
    pub poll: PollConfig,

    /// How the sync window is partitioned into slices
    #[serde(default)]
    pub slicing: SlicePolicy,
}

/// Retry configuration for transient transport failures
///
/// `max_attempts` counts retries after the first try, so the default of 5
/// yields 6 total tries before giving up.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial try (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl RetryConfig {
    /// Total number of tries made before giving up (initial try + retries)
    pub fn total_tries(&self) -> u32 {
        self.max_attempts + 1
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

/// Job status polling configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollConfig {
    /// Fixed interval between status checks (default: 30 seconds)
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub interval: Duration,

    /// Maximum number of status checks before giving up on a job (default: 120)
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            max_polls: default_max_polls(),
        }
    }
}

/// Policy for partitioning the sync window into slices
///
/// Each slice is submitted as one independent report job. The default covers
/// the whole window with a single slice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlicePolicy {
    /// One slice covering the whole window (default)
    #[default]
    WholeWindow,
    /// One slice per calendar day
    Daily,
    /// One slice per calendar month
    Monthly,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_max_polls() -> u32 {
    120
}

// Duration serialization helper (seconds as integer)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
