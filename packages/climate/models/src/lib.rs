#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Daily climate record types.
//!
//! A [`ClimateRecord`] is the per-day weather attributed to one route point,
//! either taken from the climate provider or generated as a stand-in when
//! the provider could not be reached.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Where the values of a [`ClimateRecord`] came from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ClimateSource {
    /// Observed values returned by the climate provider.
    Provider,
    /// Random placeholder values used after a provider failure.
    Synthetic,
}

/// Daily weather for one route point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateRecord {
    /// Calendar date of the observation.
    pub date: NaiveDate,
    /// Latitude of the route point (not of the provider query).
    pub latitude: f64,
    /// Longitude of the route point (not of the provider query).
    pub longitude: f64,
    /// Mean air temperature at 2 m, °C.
    pub temperature: f64,
    /// Maximum air temperature at 2 m, °C.
    pub max_temperature: f64,
    /// All-sky downward shortwave irradiance, W/m².
    pub solar_radiation: f64,
    /// Relative humidity at 2 m, %.
    pub humidity: f64,
    /// UV index, 0–11.
    pub uv_index: f64,
    /// Provenance of the values above.
    pub source: ClimateSource,
}

impl ClimateRecord {
    /// Whether this record holds placeholder data.
    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        matches!(self.source, ClimateSource::Synthetic)
    }
}

/// Daily parameters requested from the climate provider.
///
/// Codes follow the NASA POWER naming.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ClimateParameter {
    /// Mean air temperature at 2 m.
    #[serde(rename = "T2M")]
    #[strum(serialize = "T2M")]
    Temperature,
    /// Maximum air temperature at 2 m.
    #[serde(rename = "T2M_MAX")]
    #[strum(serialize = "T2M_MAX")]
    MaxTemperature,
    /// Minimum air temperature at 2 m.
    #[serde(rename = "T2M_MIN")]
    #[strum(serialize = "T2M_MIN")]
    MinTemperature,
    /// Relative humidity at 2 m.
    #[serde(rename = "RH2M")]
    #[strum(serialize = "RH2M")]
    Humidity,
    /// All-sky surface shortwave downward irradiance.
    #[serde(rename = "ALLSKY_SFC_SW_DWN")]
    #[strum(serialize = "ALLSKY_SFC_SW_DWN")]
    SolarRadiation,
    /// All-sky surface UVA irradiance.
    #[serde(rename = "ALLSKY_SFC_UVA")]
    #[strum(serialize = "ALLSKY_SFC_UVA")]
    Uva,
    /// All-sky surface UVB irradiance.
    #[serde(rename = "ALLSKY_SFC_UVB")]
    #[strum(serialize = "ALLSKY_SFC_UVB")]
    Uvb,
    /// Wind speed at 2 m.
    #[serde(rename = "WS2M")]
    #[strum(serialize = "WS2M")]
    WindSpeed,
    /// Bias-corrected total precipitation.
    #[serde(rename = "PRECTOTCORR")]
    #[strum(serialize = "PRECTOTCORR")]
    Precipitation,
}

impl ClimateParameter {
    /// Returns all variants in request order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Temperature,
            Self::MaxTemperature,
            Self::MinTemperature,
            Self::Humidity,
            Self::SolarRadiation,
            Self::Uva,
            Self::Uvb,
            Self::WindSpeed,
            Self::Precipitation,
        ]
    }
}
