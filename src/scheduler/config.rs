//! Scheduler configuration file support.
//!
//! This module provides the process-wide scheduling policy knobs, loadable
//! from a TOML configuration file with sensible defaults for every field.

use crate::scheduler::error::SchedulerError;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Process-wide scheduling policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Reject candidates sharing a calendar day with another occurrence of
    /// the same post, regardless of platform.
    #[serde(default = "default_avoid_duplicate_days")]
    pub avoid_duplicate_days: bool,
    /// Maximum one-day shifts before a candidate is abandoned with a
    /// scheduling conflict.
    #[serde(default = "default_duplicate_shift_limit")]
    pub duplicate_shift_limit: u32,
    /// Whether variation selection may prefer the best-performing
    /// variation over strict rotation. Disable for reproducible tests.
    #[serde(default = "default_variation_bias_enabled")]
    pub variation_bias_enabled: bool,
    /// Probability of picking the best-performing variation when the bias
    /// applies.
    #[serde(default = "default_variation_bias_weight")]
    pub variation_bias_weight: f64,
    /// Recycles a post must have accumulated before the bias applies.
    #[serde(default = "default_variation_bias_min_recycles")]
    pub variation_bias_min_recycles: u32,
    /// Expire a post once `current_recycles` reaches `max_recycles`.
    #[serde(default = "default_auto_expire_after_max")]
    pub auto_expire_after_max: bool,
    /// Expire a post whose average engagement sinks below the floor.
    #[serde(default)]
    pub expire_on_low_engagement: bool,
    /// Engagement floor used when `expire_on_low_engagement` is set.
    #[serde(default = "default_engagement_floor")]
    pub engagement_floor: f64,
    /// Upper bound on a single publishing call, in seconds.
    #[serde(default = "default_publish_timeout_secs")]
    pub publish_timeout_secs: u64,
    /// Local hour used when a post has no preferred times (diurnal anchor).
    #[serde(default = "default_post_hour")]
    pub default_post_hour: u32,
    /// Days to keep resolved queue entries before garbage collection.
    #[serde(default = "default_queue_retention_days")]
    pub queue_retention_days: u32,
}

fn default_avoid_duplicate_days() -> bool {
    true
}

fn default_duplicate_shift_limit() -> u32 {
    7
}

fn default_variation_bias_enabled() -> bool {
    true
}

fn default_variation_bias_weight() -> f64 {
    0.5
}

fn default_variation_bias_min_recycles() -> u32 {
    3
}

fn default_auto_expire_after_max() -> bool {
    true
}

fn default_engagement_floor() -> f64 {
    0.5
}

fn default_publish_timeout_secs() -> u64 {
    30
}

fn default_post_hour() -> u32 {
    9
}

fn default_queue_retention_days() -> u32 {
    30
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            avoid_duplicate_days: default_avoid_duplicate_days(),
            duplicate_shift_limit: default_duplicate_shift_limit(),
            variation_bias_enabled: default_variation_bias_enabled(),
            variation_bias_weight: default_variation_bias_weight(),
            variation_bias_min_recycles: default_variation_bias_min_recycles(),
            auto_expire_after_max: default_auto_expire_after_max(),
            expire_on_low_engagement: false,
            engagement_floor: default_engagement_floor(),
            publish_timeout_secs: default_publish_timeout_secs(),
            default_post_hour: default_post_hour(),
            queue_retention_days: default_queue_retention_days(),
        }
    }
}

impl SchedulerConfig {
    /// Load scheduler configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(SchedulerConfig)` if successful
    /// * `Err(SchedulerError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchedulerError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            SchedulerError::configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: SchedulerConfig = toml::from_str(&content).map_err(|e| {
            SchedulerError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load scheduler configuration from the default location.
    ///
    /// Searches for `scheduler.toml` in the current directory, then the
    /// parent directory. Falls back to defaults when no file exists.
    pub fn from_default_location() -> Result<Self, SchedulerError> {
        let search_paths = vec![
            PathBuf::from("scheduler.toml"),
            PathBuf::from("../scheduler.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if !(0.0..=1.0).contains(&self.variation_bias_weight) {
            return Err(SchedulerError::configuration(format!(
                "variation_bias_weight must be within [0, 1], got {}",
                self.variation_bias_weight
            )));
        }
        if self.default_post_hour > 23 {
            return Err(SchedulerError::configuration(format!(
                "default_post_hour must be within [0, 23], got {}",
                self.default_post_hour
            )));
        }
        if self.publish_timeout_secs == 0 {
            return Err(SchedulerError::configuration(
                "publish_timeout_secs must be positive",
            ));
        }
        Ok(())
    }

    /// Publishing timeout as a `Duration`.
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }

    /// The diurnal anchor applied when a post has no preferred times.
    pub fn default_post_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.default_post_hour, 0, 0)
            .unwrap_or(NaiveTime::MIN)
    }
}
