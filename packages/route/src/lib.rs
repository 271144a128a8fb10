#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Route ingestion and daily aggregation.
//!
//! [`parsing`] turns CSV or JSON route files into validated
//! [`PositionSample`]s, and [`aggregate`] collapses those samples into one
//! [`DailyPoint`] per calendar date.

pub mod aggregate;
pub mod parsing;

pub use aggregate::aggregate_by_day;
pub use weathering_route_models::{DailyPoint, PositionSample};

/// Errors that make a route unusable.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column or field has none of its accepted names.
    #[error("Missing required column '{field}' (accepted names: {})", aliases.join(", "))]
    MissingColumn {
        /// Canonical field name.
        field: &'static str,
        /// Header names accepted for this field.
        aliases: &'static [&'static str],
    },

    /// The source parsed but contained no usable positions.
    #[error("No valid position samples found ({rejected} rows rejected)")]
    NoValidSamples {
        /// Number of rows dropped during validation.
        rejected: usize,
    },

    /// The source format could not be determined or is not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
