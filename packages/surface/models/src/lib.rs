#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Surface material and per-day analysis result types.
//!
//! [`SurfaceProperties`] describe the exposed material (how much sunlight it
//! reflects and how well it radiates heat). [`AnalysisResult`] is the
//! per-day output of the physics engine, carrying the climate record it was
//! derived from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use weathering_climate_models::ClimateRecord;

/// Built-in surface materials.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MaterialType {
    /// Untreated timber
    Wood,
    /// Cast concrete
    Concrete,
    /// Asphalt paving
    Asphalt,
    /// Bare sheet metal
    Metal,
    /// Generic polymer
    Plastic,
    /// User-supplied albedo and emissivity
    Custom,
}

impl MaterialType {
    /// Materials with preset optical values.
    #[must_use]
    pub const fn presets() -> &'static [Self] {
        &[
            Self::Wood,
            Self::Concrete,
            Self::Asphalt,
            Self::Metal,
            Self::Plastic,
        ]
    }

    /// Preset `(albedo, emissivity)`, or `None` for [`MaterialType::Custom`].
    #[must_use]
    pub const fn optical_values(self) -> Option<(f64, f64)> {
        match self {
            Self::Wood => Some((0.25, 0.90)),
            Self::Concrete => Some((0.40, 0.95)),
            Self::Asphalt => Some((0.05, 0.95)),
            Self::Metal => Some((0.60, 0.20)),
            Self::Plastic => Some((0.30, 0.85)),
            Self::Custom => None,
        }
    }
}

/// Rejected surface property values.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum InvalidSurfaceError {
    /// Albedo outside `[0, 1]` or not finite.
    #[error("invalid albedo {0}: expected a value in [0, 1]")]
    Albedo(f64),

    /// Emissivity outside `(0, 1]` or not finite.
    #[error("invalid emissivity {0}: expected a value in (0, 1]")]
    Emissivity(f64),

    /// A custom material was given without both optical values.
    #[error("custom material requires both albedo and emissivity")]
    MissingCustomValues,
}

/// Optical properties of the exposed surface.
///
/// Always holds `albedo ∈ [0, 1]` and `emissivity ∈ (0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawSurface")]
pub struct SurfaceProperties {
    material_type: MaterialType,
    albedo: f64,
    emissivity: f64,
}

impl SurfaceProperties {
    /// Creates validated surface properties.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSurfaceError`] if albedo is outside `[0, 1]` or
    /// emissivity is outside `(0, 1]`.
    pub fn new(
        material_type: MaterialType,
        albedo: f64,
        emissivity: f64,
    ) -> Result<Self, InvalidSurfaceError> {
        if !albedo.is_finite() || !(0.0..=1.0).contains(&albedo) {
            return Err(InvalidSurfaceError::Albedo(albedo));
        }
        if !emissivity.is_finite() || emissivity <= 0.0 || emissivity > 1.0 {
            return Err(InvalidSurfaceError::Emissivity(emissivity));
        }
        Ok(Self {
            material_type,
            albedo,
            emissivity,
        })
    }

    /// Preset properties for a built-in material.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSurfaceError::MissingCustomValues`] for
    /// [`MaterialType::Custom`].
    pub fn from_preset(material_type: MaterialType) -> Result<Self, InvalidSurfaceError> {
        let (albedo, emissivity) = material_type
            .optical_values()
            .ok_or(InvalidSurfaceError::MissingCustomValues)?;
        Self::new(material_type, albedo, emissivity)
    }

    /// Resolves a material with optional overrides.
    ///
    /// Missing values fall back to the material's preset. Overriding either
    /// value of a preset material keeps its type.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSurfaceError`] if a value is out of range or a custom
    /// material lacks a value.
    pub fn with_overrides(
        material_type: MaterialType,
        albedo: Option<f64>,
        emissivity: Option<f64>,
    ) -> Result<Self, InvalidSurfaceError> {
        let preset = material_type.optical_values();
        let albedo = albedo
            .or_else(|| preset.map(|(a, _)| a))
            .ok_or(InvalidSurfaceError::MissingCustomValues)?;
        let emissivity = emissivity
            .or_else(|| preset.map(|(_, e)| e))
            .ok_or(InvalidSurfaceError::MissingCustomValues)?;
        Self::new(material_type, albedo, emissivity)
    }

    /// The material this describes.
    #[must_use]
    pub const fn material_type(&self) -> MaterialType {
        self.material_type
    }

    /// Fraction of incoming shortwave radiation reflected.
    #[must_use]
    pub const fn albedo(&self) -> f64 {
        self.albedo
    }

    /// Thermal emissivity.
    #[must_use]
    pub const fn emissivity(&self) -> f64 {
        self.emissivity
    }
}

impl Default for SurfaceProperties {
    /// Untreated wood.
    fn default() -> Self {
        Self {
            material_type: MaterialType::Wood,
            albedo: 0.25,
            emissivity: 0.90,
        }
    }
}

/// Wire form of [`SurfaceProperties`] with optional optical values.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSurface {
    #[serde(alias = "material", alias = "material_type")]
    material_type: MaterialType,
    albedo: Option<f64>,
    emissivity: Option<f64>,
}

impl TryFrom<RawSurface> for SurfaceProperties {
    type Error = InvalidSurfaceError;

    fn try_from(raw: RawSurface) -> Result<Self, Self::Error> {
        Self::with_overrides(raw.material_type, raw.albedo, raw.emissivity)
    }
}

/// Three-tier risk classification.
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
pub enum RiskLevel {
    /// No notable stress
    Low,
    /// Elevated stress
    Medium,
    /// Severe stress
    High,
}

/// Risk classification for one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Thermal cracking risk from surface temperature.
    pub cracking_risk: RiskLevel,
    /// Relative aging multiplier, never below 1.
    pub aging_rate: f64,
    /// Moisture cycling stress from the EMC swing.
    pub moisture_stress: RiskLevel,
}

/// Derived environmental stress for one day of the route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Day analyzed.
    pub date: NaiveDate,
    /// Mean latitude of the day's positions.
    pub latitude: f64,
    /// Mean longitude of the day's positions.
    pub longitude: f64,
    /// Estimated surface temperature, °C.
    pub surface_temperature: f64,
    /// Daily average equilibrium moisture content, %.
    pub emc_average: f64,
    /// Temperature-adjusted peak equilibrium moisture content, %.
    pub emc_peak: f64,
    /// UV dose over the exposure window.
    #[serde(rename = "cumulativeUV")]
    pub cumulative_uv: f64,
    pub risk_assessment: RiskAssessment,
    /// The climate record this result was derived from.
    pub raw_climate_data: ClimateRecord,
}
