//! Tabular export of analysis results.
//!
//! One CSV row per [`AnalysisResult`]. Coordinates are written with 4
//! decimals and every other quantity with 2, so exports diff cleanly
//! between runs.

use std::io::Write;
use std::path::Path;

use weathering_surface_models::AnalysisResult;

use crate::PipelineError;

/// Column names, in output order.
pub const HEADERS: &[&str] = &[
    "date",
    "latitude",
    "longitude",
    "surface_temperature",
    "emc_average",
    "emc_peak",
    "cumulative_uv",
    "cracking_risk",
    "aging_rate",
    "moisture_stress",
    "air_temperature",
    "max_temperature",
    "solar_radiation",
    "humidity",
    "uv_index",
    "climate_source",
];

/// Writes `results` as CSV to `writer`.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] if writing fails.
pub fn write_csv<W: Write>(writer: W, results: &[AnalysisResult]) -> Result<(), PipelineError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADERS)?;

    for result in results {
        wtr.write_record(row(result))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes `results` as CSV to a file, replacing it if present.
///
/// # Errors
///
/// Returns [`PipelineError`] if the file cannot be created or written.
pub fn write_csv_file(path: &Path, results: &[AnalysisResult]) -> Result<(), PipelineError> {
    let file = std::fs::File::create(path)?;
    write_csv(std::io::BufWriter::new(file), results)?;
    log::info!("Wrote {} rows to {}", results.len(), path.display());
    Ok(())
}

fn row(result: &AnalysisResult) -> [String; 16] {
    let climate = &result.raw_climate_data;
    let risk = &result.risk_assessment;
    [
        result.date.to_string(),
        format!("{:.4}", result.latitude),
        format!("{:.4}", result.longitude),
        format!("{:.2}", result.surface_temperature),
        format!("{:.2}", result.emc_average),
        format!("{:.2}", result.emc_peak),
        format!("{:.2}", result.cumulative_uv),
        risk.cracking_risk.to_string(),
        format!("{:.2}", risk.aging_rate),
        risk.moisture_stress.to_string(),
        format!("{:.2}", climate.temperature),
        format!("{:.2}", climate.max_temperature),
        format!("{:.2}", climate.solar_radiation),
        format!("{:.2}", climate.humidity),
        format!("{:.2}", climate.uv_index),
        climate.source.to_string(),
    ]
}
