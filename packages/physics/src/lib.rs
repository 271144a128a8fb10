#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Environmental stress model for an exposed surface.
//!
//! Every function here is pure. [`derive`] turns one [`ClimateRecord`] plus
//! the surface's optical properties into an [`AnalysisResult`]:
//!
//! 1. surface temperature from air temperature and absorbed shortwave
//!    radiation ([`surface_temperature`])
//! 2. equilibrium moisture content from humidity, adjusted for temperature
//!    ([`equilibrium_moisture_content`])
//! 3. UV dose over the exposure window ([`cumulative_uv`])
//! 4. a three-tier risk classification ([`assess_risk`])
//!
//! The coefficients are heuristics rather than a calibrated heat balance;
//! results are meant for relative comparison between days and materials.

use weathering_climate_models::ClimateRecord;
use weathering_surface_models::{AnalysisResult, RiskAssessment, RiskLevel, SurfaceProperties};

/// Stefan–Boltzmann constant, W/(m²·K⁴).
pub const STEFAN_BOLTZMANN: f64 = 5.67e-8;

/// Scale applied to the absorbed-radiation term.
pub const ABSORPTION_SCALE: f64 = 0.1;

/// Radiative exchange factor in the surface temperature denominator.
pub const RADIATIVE_FACTOR: f64 = 20.0;

/// Humidity above which the moisture model no longer changes.
pub const EMC_HUMIDITY_CAP: f64 = 95.0;

/// Fractional EMC peak change per °C away from [`EMC_REFERENCE_TEMPERATURE`].
pub const EMC_TEMPERATURE_COEFFICIENT: f64 = 0.02;

/// Temperature at which peak and average EMC coincide, °C.
pub const EMC_REFERENCE_TEMPERATURE: f64 = 20.0;

/// Exposure window used when none is given, hours.
pub const DEFAULT_EXPOSURE_HOURS: f64 = 24.0;

/// UV index-hours to dose units.
pub const UV_DOSE_FACTOR: f64 = 0.1;

/// Surface temperature at or above which cracking risk is high, °C.
pub const CRACKING_HIGH_THRESHOLD: f64 = 60.0;

/// Surface temperature at or above which cracking risk is medium, °C.
pub const CRACKING_MEDIUM_THRESHOLD: f64 = 40.0;

/// EMC swing above which moisture stress is high, percentage points.
pub const MOISTURE_HIGH_THRESHOLD: f64 = 5.0;

/// EMC swing above which moisture stress is medium, percentage points.
pub const MOISTURE_MEDIUM_THRESHOLD: f64 = 3.0;

/// Equilibrium moisture content pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emc {
    /// Daily average, %.
    pub average: f64,
    /// Temperature-adjusted peak, %.
    pub peak: f64,
}

/// Estimated surface temperature in °C.
///
/// `air + 0.1 · solar · (1 − albedo) / (emissivity · σ · 20)`
///
/// `emissivity` must be positive; [`SurfaceProperties`] guarantees it.
#[must_use]
pub fn surface_temperature(
    air_temperature: f64,
    solar_radiation: f64,
    albedo: f64,
    emissivity: f64,
) -> f64 {
    let absorbed = solar_radiation * (1.0 - albedo);
    let radiative = emissivity * STEFAN_BOLTZMANN * RADIATIVE_FACTOR;
    ABSORPTION_SCALE.mul_add(absorbed / radiative, air_temperature)
}

/// Equilibrium moisture content for the given air temperature (°C) and
/// relative humidity (%).
///
/// Humidity is capped at 95 %. Both values are floored at zero.
#[must_use]
pub fn equilibrium_moisture_content(temperature: f64, humidity: f64) -> Emc {
    let rh = humidity.min(EMC_HUMIDITY_CAP);

    let numerator = 0.00415f64.mul_add(rh * rh, 0.452f64.mul_add(rh, 330.0));
    let denominator = 0.0135f64.mul_add(rh * rh, 1.27f64.mul_add(rh, 100.0));
    let average = (numerator / denominator).max(0.0);

    let adjustment =
        (temperature - EMC_REFERENCE_TEMPERATURE).mul_add(EMC_TEMPERATURE_COEFFICIENT, 1.0);
    let peak = (average * adjustment).max(0.0);

    Emc { average, peak }
}

/// UV dose accumulated over `hours` at a constant `uv_index`.
#[must_use]
pub fn cumulative_uv(uv_index: f64, hours: f64) -> f64 {
    uv_index * hours * UV_DOSE_FACTOR
}

/// Classifies one day's stresses.
#[must_use]
pub fn assess_risk(
    surface_temperature: f64,
    emc_average: f64,
    emc_peak: f64,
    cumulative_uv: f64,
) -> RiskAssessment {
    let cracking_risk = if surface_temperature >= CRACKING_HIGH_THRESHOLD {
        RiskLevel::High
    } else if surface_temperature >= CRACKING_MEDIUM_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let swing = (emc_peak - emc_average).abs();
    let moisture_stress = if swing > MOISTURE_HIGH_THRESHOLD {
        RiskLevel::High
    } else if swing > MOISTURE_MEDIUM_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let aging_rate = (surface_temperature - 20.0)
        .mul_add(0.05, 1.0 + cumulative_uv / 100.0)
        .max(1.0);

    RiskAssessment {
        cracking_risk,
        aging_rate,
        moisture_stress,
    }
}

/// Derives the analysis result for one climate record.
#[must_use]
pub fn derive(record: &ClimateRecord, properties: &SurfaceProperties) -> AnalysisResult {
    let surface_temperature = surface_temperature(
        record.temperature,
        record.solar_radiation,
        properties.albedo(),
        properties.emissivity(),
    );
    let emc = equilibrium_moisture_content(record.temperature, record.humidity);
    let cumulative_uv = cumulative_uv(record.uv_index, DEFAULT_EXPOSURE_HOURS);
    let risk_assessment = assess_risk(surface_temperature, emc.average, emc.peak, cumulative_uv);

    AnalysisResult {
        date: record.date,
        latitude: record.latitude,
        longitude: record.longitude,
        surface_temperature,
        emc_average: emc.average,
        emc_peak: emc.peak,
        cumulative_uv,
        risk_assessment,
        raw_climate_data: *record,
    }
}

/// Derives one result per record, in input order.
#[must_use]
pub fn derive_all(records: &[ClimateRecord], properties: &SurfaceProperties) -> Vec<AnalysisResult> {
    let results: Vec<_> = records.iter().map(|r| derive(r, properties)).collect();

    log::debug!(
        "Derived {} results for {} (albedo {:.2}, emissivity {:.2})",
        results.len(),
        properties.material_type(),
        properties.albedo(),
        properties.emissivity()
    );

    results
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use weathering_climate_models::ClimateSource;
    use weathering_surface_models::MaterialType;

    use super::*;

    fn record(
        temperature: f64,
        solar_radiation: f64,
        humidity: f64,
        uv_index: f64,
    ) -> ClimateRecord {
        ClimateRecord {
            date: NaiveDate::from_ymd_opt(2024, 7, 14).unwrap(),
            latitude: 45.5,
            longitude: -122.6,
            temperature,
            max_temperature: temperature + 5.0,
            solar_radiation,
            humidity,
            uv_index,
            source: ClimateSource::Provider,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-9 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn no_radiation_leaves_air_temperature() {
        assert_close(surface_temperature(18.5, 0.0, 0.3, 0.9), 18.5);
        assert_close(surface_temperature(18.5, 500.0, 1.0, 0.9), 18.5);
    }

    #[test]
    fn darker_surfaces_run_hotter() {
        let asphalt = surface_temperature(20.0, 300.0, 0.05, 0.95);
        let concrete = surface_temperature(20.0, 300.0, 0.40, 0.95);
        assert!(asphalt > concrete);
    }

    #[test]
    fn emc_is_capped_above_95_percent_humidity() {
        let at_cap = equilibrium_moisture_content(20.0, 95.0);
        for humidity in [95.5, 99.0, 100.0, 150.0] {
            let emc = equilibrium_moisture_content(20.0, humidity);
            assert_close(emc.average, at_cap.average);
        }
    }

    #[test]
    fn emc_average_is_monotone_in_humidity_below_cap() {
        let mut previous = equilibrium_moisture_content(20.0, 0.0).average;
        for step in 1..=95 {
            let current = equilibrium_moisture_content(20.0, f64::from(step)).average;
            assert!(current <= previous, "EMC rose at rh={step}");
            previous = current;
        }
    }

    #[test]
    fn emc_at_reference_temperature_has_no_swing() {
        let emc = equilibrium_moisture_content(20.0, 60.0);
        assert_close(emc.peak, emc.average);
    }

    #[test]
    fn emc_peak_is_floored_at_zero() {
        let emc = equilibrium_moisture_content(-40.0, 60.0);
        assert!(emc.average > 0.0);
        assert!(emc.peak.abs() < f64::EPSILON);
    }

    #[test]
    fn cumulative_uv_scales_with_hours() {
        assert_close(cumulative_uv(5.0, DEFAULT_EXPOSURE_HOURS), 12.0);
        assert_close(cumulative_uv(5.0, 12.0), 6.0);
        assert_close(cumulative_uv(0.0, 24.0), 0.0);
    }

    #[test]
    fn cracking_thresholds_are_inclusive() {
        let risk = |t| assess_risk(t, 10.0, 10.0, 0.0).cracking_risk;
        assert_eq!(risk(39.999), RiskLevel::Low);
        assert_eq!(risk(40.0), RiskLevel::Medium);
        assert_eq!(risk(59.999), RiskLevel::Medium);
        assert_eq!(risk(60.0), RiskLevel::High);
    }

    #[test]
    fn moisture_thresholds_are_exclusive() {
        let stress = |peak| assess_risk(20.0, 10.0, peak, 0.0).moisture_stress;
        assert_eq!(stress(13.0), RiskLevel::Low);
        assert_eq!(stress(13.5), RiskLevel::Medium);
        assert_eq!(stress(15.0), RiskLevel::Medium);
        assert_eq!(stress(15.5), RiskLevel::High);
        assert_eq!(stress(4.5), RiskLevel::High);
    }

    #[test]
    fn aging_rate_never_drops_below_one() {
        assert_close(assess_risk(-30.0, 10.0, 10.0, 0.0).aging_rate, 1.0);
        assert_close(assess_risk(-200.0, 10.0, 10.0, -50.0).aging_rate, 1.0);
        assert_close(assess_risk(40.0, 10.0, 10.0, 10.0).aging_rate, 2.1);
    }

    #[test]
    fn derive_all_preserves_order_and_length() {
        let wood = SurfaceProperties::from_preset(MaterialType::Wood).unwrap();
        let records = [
            record(10.0, 0.0, 40.0, 1.0),
            record(30.0, 0.0, 80.0, 8.0),
            record(20.0, 0.0, 60.0, 4.0),
        ];
        let results = derive_all(&records, &wood);

        assert_eq!(results.len(), records.len());
        for (result, record) in results.iter().zip(&records) {
            assert_eq!(result.raw_climate_data, *record);
            assert_close(result.surface_temperature, record.temperature);
        }
        assert!(derive_all(&[], &wood).is_empty());
    }

    #[test]
    fn wood_day_reproduces_the_arithmetic_chain() {
        // T2M=25, RH2M=60, shortwave 300, UVA 50 + UVB 25 -> UV index 3
        let wood = SurfaceProperties::from_preset(MaterialType::Wood).unwrap();
        let result = derive(&record(25.0, 300.0, 60.0, 3.0), &wood);

        let expected_surface = 25.0 + 0.1 * (300.0 * 0.75) / (0.90 * 5.67e-8 * 20.0);
        assert_close(result.surface_temperature, expected_surface);
        assert!((result.surface_temperature - 2.204_588e7).abs() < 10.0);

        let expected_average = (330.0 + 0.452 * 60.0 + 0.00415 * 3600.0)
            / (100.0 + 1.27 * 60.0 + 0.0135 * 3600.0);
        assert_close(result.emc_average, expected_average);
        assert!((result.emc_average - 1.655).abs() < 1e-3);
        assert_close(result.emc_peak, expected_average * 1.1);

        assert_close(result.cumulative_uv, 7.2);

        let risk = result.risk_assessment;
        assert_eq!(risk.cracking_risk, RiskLevel::High);
        assert_eq!(risk.moisture_stress, RiskLevel::Low);
        assert_close(risk.aging_rate, 1.0 + 7.2 / 100.0 + (expected_surface - 20.0) * 0.05);
    }
}
