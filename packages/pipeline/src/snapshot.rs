//! Climate record snapshots.
//!
//! A run's resolved [`ClimateRecord`]s can be saved as a JSON array and fed
//! back to [`crate::reanalyze`] later, e.g. to compare materials without
//! querying the provider again.

use std::io::{Read, Write};
use std::path::Path;

use weathering_climate_models::ClimateRecord;

use crate::PipelineError;

/// Writes `records` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`PipelineError::Json`] if serialization or writing fails.
pub fn write_json<W: Write>(writer: W, records: &[ClimateRecord]) -> Result<(), PipelineError> {
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

/// Reads a JSON array of climate records.
///
/// # Errors
///
/// Returns [`PipelineError::Json`] if the input is not a valid record array.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<ClimateRecord>, PipelineError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Saves `records` to `path`.
///
/// # Errors
///
/// Returns [`PipelineError`] if the file cannot be created or written.
pub fn save(path: &Path, records: &[ClimateRecord]) -> Result<(), PipelineError> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_json(&mut writer, records)?;
    writer.flush()?;
    log::info!("Saved {} climate records to {}", records.len(), path.display());
    Ok(())
}

/// Loads records saved with [`save`].
///
/// # Errors
///
/// Returns [`PipelineError`] if the file cannot be read or parsed.
pub fn load(path: &Path) -> Result<Vec<ClimateRecord>, PipelineError> {
    let file = std::fs::File::open(path)?;
    let records = read_json(std::io::BufReader::new(file))?;
    log::info!("Loaded {} climate records from {}", records.len(), path.display());
    Ok(records)
}
