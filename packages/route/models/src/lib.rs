#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Route position types.
//!
//! A route arrives as raw [`PositionSample`]s and is reduced to one
//! [`DailyPoint`] per calendar date before any climate lookup happens.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use geo::Point;
use serde::{Deserialize, Serialize};
use weathering_spatial::Located;

/// Error returned when a position has a non-finite or out-of-range
/// coordinate.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("invalid position ({latitude}, {longitude}): latitude must be in [-90, 90] and longitude in [-180, 180]")]
pub struct InvalidPositionError {
    /// The rejected latitude.
    pub latitude: f64,
    /// The rejected longitude.
    pub longitude: f64,
}

/// A single timestamped position along a route.
///
/// The timestamp is the wall-clock time exactly as recorded by the source.
/// No timezone normalization is applied, so the calendar date of a sample is
/// the date written in its timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSample {
    timestamp: NaiveDateTime,
    latitude: f64,
    longitude: f64,
}

impl PositionSample {
    /// Creates a sample, validating the coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPositionError`] if either coordinate is not finite or
    /// falls outside the WGS84 range.
    pub fn new(
        timestamp: NaiveDateTime,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self, InvalidPositionError> {
        if !latitude.is_finite()
            || !longitude.is_finite()
            || !(-90.0..=90.0).contains(&latitude)
            || !(-180.0..=180.0).contains(&longitude)
        {
            return Err(InvalidPositionError {
                latitude,
                longitude,
            });
        }

        Ok(Self {
            timestamp,
            latitude,
            longitude,
        })
    }

    /// When the sample was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Calendar date portion of the timestamp.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Latitude (WGS84).
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude (WGS84).
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl Located for PositionSample {
    fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// The representative position of a route for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    /// Calendar date this point represents.
    pub date: NaiveDate,
    /// Mean latitude of the day's samples.
    pub latitude: f64,
    /// Mean longitude of the day's samples.
    pub longitude: f64,
    /// Always midday UTC of [`Self::date`].
    pub timestamp: DateTime<Utc>,
}

impl DailyPoint {
    /// Creates a daily point with its timestamp pinned to `12:00:00Z`.
    #[must_use]
    pub fn new(date: NaiveDate, latitude: f64, longitude: f64) -> Self {
        let timestamp = date
            .and_hms_opt(12, 0, 0)
            .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN))
            .and_utc();

        Self {
            date,
            latitude,
            longitude,
            timestamp,
        }
    }
}

impl Located for DailyPoint {
    fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}
