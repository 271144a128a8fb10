#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Climate data retrieval for route points.
//!
//! The [`resolver`] groups daily route points into proximity clusters, asks
//! a [`ClimateProvider`] once per cluster for the cluster's date span, and
//! maps the per-date response back onto each individual point. Clusters
//! whose request fails are filled with [`synthetic`] placeholder records so
//! a single provider outage never aborts a run.
//!
//! The only shipped provider is NASA POWER ([`power`]), configured from the
//! embedded [`service_registry`].

pub mod power;
pub mod progress;
pub mod resolver;
pub mod retry;
pub mod service_registry;
pub mod synthetic;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use geo::Point;
use weathering_climate_models::ClimateParameter;

pub use resolver::{DEFAULT_REQUEST_DELAY, Resolution, ResolveOptions, ResolveReport, resolve};
pub use weathering_climate_models::{ClimateRecord, ClimateSource};

/// Errors from climate provider requests.
#[derive(Debug, thiserror::Error)]
pub enum ClimateError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider answered with a non-success status.
    #[error("Provider returned HTTP {status}")]
    Status {
        /// Final status code received.
        status: reqwest::StatusCode,
    },

    /// The response parsed but lacks the expected structure.
    #[error("Malformed provider response: {message}")]
    Malformed {
        /// Description of what is missing.
        message: String,
    },
}

/// One provider query: a single position and an inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateRequest {
    /// Latitude, rounded to 4 decimal places.
    pub latitude: f64,
    /// Longitude, rounded to 4 decimal places.
    pub longitude: f64,
    /// First date requested.
    pub start: NaiveDate,
    /// Last date requested (inclusive).
    pub end: NaiveDate,
}

impl ClimateRequest {
    /// Builds a request for `position`, rounding the coordinates to the
    /// 4-decimal precision the provider is queried with.
    #[must_use]
    pub fn new(position: Point<f64>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            latitude: round4(position.y()),
            longitude: round4(position.x()),
            start,
            end,
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Per-parameter, per-date values returned by a provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterTable {
    values: BTreeMap<ClimateParameter, BTreeMap<NaiveDate, f64>>,
}

impl ParameterTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Records `value` for `parameter` on `date`.
    pub fn insert(&mut self, parameter: ClimateParameter, date: NaiveDate, value: f64) {
        self.values.entry(parameter).or_default().insert(date, value);
    }

    /// Looks up the value for `parameter` on `date`.
    #[must_use]
    pub fn get(&self, parameter: ClimateParameter, date: NaiveDate) -> Option<f64> {
        self.values.get(&parameter)?.get(&date).copied()
    }

    /// Number of parameters with at least one value.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.values.len()
    }
}

/// A source of daily historical climate data.
#[async_trait]
pub trait ClimateProvider: Send + Sync {
    /// Returns a unique identifier for this provider (e.g., `"nasa_power"`).
    fn id(&self) -> &str;

    /// Fetches every requested parameter for each date in the request.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError`] on transport failure, a non-success status,
    /// or a response without the per-parameter data container.
    async fn fetch_daily(&self, request: &ClimateRequest) -> Result<ParameterTable, ClimateError>;
}
