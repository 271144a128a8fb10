//! Analysis configuration.
//!
//! Loaded from TOML (all keys optional):
//!
//! ```toml
//! start_date = "2024-06-01"
//! end_date = "2024-06-30"
//! aggregation = "daily"
//! cluster_threshold_degrees = 0.1
//! request_delay_ms = 100
//!
//! [surface]
//! material = "custom"
//! albedo = 0.35
//! emissivity = 0.9
//! ```
//!
//! The date window is informational: it is checked for consistency and
//! logged against the route, but never filters samples.
//!
//! `request_delay_ms` may raise the spacing between provider requests but
//! never lower it below [`DEFAULT_REQUEST_DELAY`].

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use weathering_climate::{DEFAULT_REQUEST_DELAY, ResolveOptions};
use weathering_surface_models::SurfaceProperties;

/// Temporal granularity of the analysis.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AggregationLevel {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// Rejected or unreadable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML or has invalid values.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Only daily aggregation is implemented.
    #[error("Aggregation level '{0}' is not supported; only 'daily' is available")]
    UnsupportedAggregation(AggregationLevel),

    /// The date window ends before it starts.
    #[error("Start date {start} is after end date {end}")]
    DateRange {
        /// Configured start date.
        start: NaiveDate,
        /// Configured end date.
        end: NaiveDate,
    },

    /// Cluster threshold is not a positive number of degrees.
    #[error("Invalid cluster threshold {0}: expected a positive number of degrees")]
    ClusterThreshold(f64),

    /// Request spacing is below the provider minimum.
    #[error("Request delay {delay_ms} ms is below the minimum of {minimum_ms} ms")]
    RequestDelay {
        /// Configured delay.
        delay_ms: u64,
        /// Smallest accepted delay.
        minimum_ms: u64,
    },
}

/// Parameters of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// First day of interest.
    pub start_date: Option<NaiveDate>,
    /// Last day of interest.
    pub end_date: Option<NaiveDate>,
    /// Exposed material.
    pub surface: SurfaceProperties,
    /// Temporal granularity.
    pub aggregation: AggregationLevel,
    /// Grouping radius for provider requests, degrees.
    pub cluster_threshold_degrees: f64,
    /// Minimum spacing between provider requests, milliseconds.
    pub request_delay_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let options = ResolveOptions::default();
        Self {
            start_date: None,
            end_date: None,
            surface: SurfaceProperties::default(),
            aggregation: AggregationLevel::Daily,
            cluster_threshold_degrees: options.cluster_threshold,
            request_delay_ms: u64::try_from(options.request_delay.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl AnalysisConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid TOML or a value
    /// is out of range (including surface properties).
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks the configuration before any work is done.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a non-daily aggregation level, an
    /// inverted date window, a non-positive cluster threshold, or a request
    /// delay below [`DEFAULT_REQUEST_DELAY`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.aggregation != AggregationLevel::Daily {
            return Err(ConfigError::UnsupportedAggregation(self.aggregation));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ConfigError::DateRange { start, end });
            }
        }
        if !self.cluster_threshold_degrees.is_finite() || self.cluster_threshold_degrees <= 0.0 {
            return Err(ConfigError::ClusterThreshold(self.cluster_threshold_degrees));
        }
        if Duration::from_millis(self.request_delay_ms) < DEFAULT_REQUEST_DELAY {
            return Err(ConfigError::RequestDelay {
                delay_ms: self.request_delay_ms,
                minimum_ms: u64::try_from(DEFAULT_REQUEST_DELAY.as_millis()).unwrap_or(u64::MAX),
            });
        }
        Ok(())
    }

    /// Resolver tuning derived from this configuration.
    ///
    /// The request delay is floored at [`DEFAULT_REQUEST_DELAY`].
    #[must_use]
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            cluster_threshold: self.cluster_threshold_degrees,
            request_delay: Duration::from_millis(self.request_delay_ms).max(DEFAULT_REQUEST_DELAY),
        }
    }

    /// Whether `date` falls inside the configured window (open ends match).
    #[must_use]
    pub fn in_window(&self, date: NaiveDate) -> bool {
        self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end)
    }
}
