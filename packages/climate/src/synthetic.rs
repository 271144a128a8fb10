//! Placeholder climate records for clusters whose provider request failed.
//!
//! Values are uniform random draws inside broad plausible ranges. They keep
//! a run going and are not physical estimates; every record produced here
//! is tagged [`ClimateSource::Synthetic`].

use rand::Rng;
use weathering_climate_models::{ClimateRecord, ClimateSource};
use weathering_route_models::DailyPoint;

/// Generates a placeholder record for `point` from `rng`.
///
/// | Field             | Range       |
/// |-------------------|-------------|
/// | temperature       | 20 + U(0,25)  |
/// | max temperature   | 25 + U(0,30)  |
/// | solar radiation   | 100 + U(0,400) |
/// | humidity          | 30 + U(0,50)  |
/// | UV index          | 1 + U(0,10)   |
pub fn synthetic_record<R: Rng + ?Sized>(point: &DailyPoint, rng: &mut R) -> ClimateRecord {
    ClimateRecord {
        date: point.date,
        latitude: point.latitude,
        longitude: point.longitude,
        temperature: 20.0 + rng.gen_range(0.0..25.0),
        max_temperature: 25.0 + rng.gen_range(0.0..30.0),
        solar_radiation: 100.0 + rng.gen_range(0.0..400.0),
        humidity: 30.0 + rng.gen_range(0.0..50.0),
        uv_index: 1.0 + rng.gen_range(0.0..10.0),
        source: ClimateSource::Synthetic,
    }
}
