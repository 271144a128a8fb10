//! Route file parsing.
//!
//! Accepts either a CSV file with a header row or a JSON array of objects.
//! Both forms resolve their fields through the same alias lists, matched
//! case-insensitively:
//!
//! | Field     | Accepted names              |
//! |-----------|-----------------------------|
//! | timestamp | `timestamp`, `time`, `date` |
//! | latitude  | `latitude`, `lat`           |
//! | longitude | `longitude`, `lng`, `lon`   |
//!
//! Rows with a missing or unparseable timestamp, or a non-numeric or
//! out-of-range coordinate, are dropped. A source that yields no valid rows
//! at all is an error.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use weathering_route_models::PositionSample;

use crate::IngestError;

/// Header names accepted for the timestamp column.
pub const TIMESTAMP_ALIASES: &[&str] = &["timestamp", "time", "date"];
/// Header names accepted for the latitude column.
pub const LATITUDE_ALIASES: &[&str] = &["latitude", "lat"];
/// Header names accepted for the longitude column.
pub const LONGITUDE_ALIASES: &[&str] = &["longitude", "lng", "lon"];

/// Loads a route file, choosing the parser from the file extension.
///
/// Files without a `.csv` or `.json` extension are sniffed: content starting
/// with `[` is parsed as JSON, anything else as CSV.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be read, is malformed, or
/// contains no valid samples.
pub fn load_path(path: &Path) -> Result<Vec<PositionSample>, IngestError> {
    let text = std::fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let samples = match extension.as_deref() {
        Some("json") => parse_json(&text)?,
        Some("csv") => parse_csv(text.as_bytes())?,
        _ if text.trim_start().starts_with('[') => parse_json(&text)?,
        _ => parse_csv(text.as_bytes())?,
    };

    log::info!("Loaded {} samples from {}", samples.len(), path.display());

    Ok(samples)
}

/// Parses CSV route data with a header row.
///
/// # Errors
///
/// Returns [`IngestError::MissingColumn`] if a required header is absent,
/// [`IngestError::Csv`] for malformed CSV, and
/// [`IngestError::NoValidSamples`] when every row is rejected.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<PositionSample>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let find = |field: &'static str, aliases: &'static [&'static str]| {
        headers
            .iter()
            .position(|h| matches_alias(h, aliases))
            .ok_or(IngestError::MissingColumn { field, aliases })
    };

    let ts_idx = find("timestamp", TIMESTAMP_ALIASES)?;
    let lat_idx = find("latitude", LATITUDE_ALIASES)?;
    let lng_idx = find("longitude", LONGITUDE_ALIASES)?;

    let mut samples = Vec::new();
    let mut rejected = 0usize;

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let sample = build_sample(
            record.get(ts_idx),
            record.get(lat_idx).and_then(parse_coordinate),
            record.get(lng_idx).and_then(parse_coordinate),
        );

        match sample {
            Some(s) => samples.push(s),
            None => {
                log::debug!("Dropping CSV row {}: {record:?}", row + 1);
                rejected += 1;
            }
        }
    }

    finish(samples, rejected)
}

/// Parses a JSON array of position objects.
///
/// Coordinates may be JSON numbers or numeric strings.
///
/// # Errors
///
/// Returns [`IngestError::Json`] for malformed JSON,
/// [`IngestError::UnsupportedFormat`] if the top level is not an array, and
/// [`IngestError::NoValidSamples`] when every element is rejected.
pub fn parse_json(text: &str) -> Result<Vec<PositionSample>, IngestError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let rows = value.as_array().ok_or_else(|| {
        IngestError::UnsupportedFormat("expected a JSON array of position objects".to_string())
    })?;

    let mut samples = Vec::new();
    let mut rejected = 0usize;

    for (row, item) in rows.iter().enumerate() {
        let sample = item.as_object().and_then(|obj| {
            let field = |aliases: &[&str]| {
                obj.iter()
                    .find(|(k, _)| matches_alias(k, aliases))
                    .map(|(_, v)| v)
            };

            let timestamp = field(TIMESTAMP_ALIASES).and_then(serde_json::Value::as_str);
            let latitude = field(LATITUDE_ALIASES).and_then(json_coordinate);
            let longitude = field(LONGITUDE_ALIASES).and_then(json_coordinate);

            build_sample(timestamp, latitude, longitude)
        });

        match sample {
            Some(s) => samples.push(s),
            None => {
                log::debug!("Dropping JSON element {row}: {item}");
                rejected += 1;
            }
        }
    }

    finish(samples, rejected)
}

/// Parses a timestamp as written, keeping its local wall-clock value.
///
/// Accepts RFC 3339 (the offset is kept as written, not converted),
/// `YYYY-MM-DDTHH:MM:SS[.f]`, `YYYY-MM-DD HH:MM:SS[.f]`, and bare
/// `YYYY-MM-DD` dates (taken as midnight).
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_coordinate(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn json_coordinate(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => parse_coordinate(s),
        _ => None,
    }
}

fn matches_alias(name: &str, aliases: &[&str]) -> bool {
    let name = name.trim();
    aliases.iter().any(|a| name.eq_ignore_ascii_case(a))
}

fn build_sample(
    timestamp: Option<&str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Option<PositionSample> {
    let timestamp = parse_timestamp(timestamp?)?;
    PositionSample::new(timestamp, latitude?, longitude?).ok()
}

fn finish(
    samples: Vec<PositionSample>,
    rejected: usize,
) -> Result<Vec<PositionSample>, IngestError> {
    if rejected > 0 {
        log::warn!("Dropped {rejected} invalid rows");
    }
    if samples.is_empty() {
        return Err(IngestError::NoValidSamples { rejected });
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_csv_with_aliased_headers() {
        let csv = "Time, Lat ,LNG\n\
                   2024-07-01T08:00:00,45.5,-122.6\n\
                   2024-07-01 09:30:00,45.6,-122.7\n";
        let samples = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(samples.len(), 2);
        assert!((samples[1].latitude() - 45.6).abs() < f64::EPSILON);
        assert!((samples[1].longitude() - -122.7).abs() < f64::EPSILON);
    }

    #[test]
    fn drops_invalid_csv_rows() {
        let csv = "timestamp,latitude,longitude\n\
                   2024-07-01T08:00:00,45.5,-122.6\n\
                   ,45.5,-122.6\n\
                   2024-07-01T10:00:00,north,-122.6\n\
                   2024-07-01T11:00:00,95.0,-122.6\n\
                   not a date,45.5,-122.6\n";
        let samples = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "timestamp,latitude\n2024-07-01T08:00:00,45.5\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingColumn {
                field: "longitude",
                ..
            }
        ));
    }

    #[test]
    fn all_rows_invalid_is_an_error() {
        let csv = "date,lat,lon\nnope,1,2\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::NoValidSamples { rejected: 1 }));
    }

    #[test]
    fn header_only_csv_is_an_error() {
        let err = parse_csv("date,lat,lon\n".as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::NoValidSamples { rejected: 0 }));
    }

    #[test]
    fn parses_json_with_numbers_and_strings() {
        let json = r#"[
            {"timestamp": "2024-07-01T08:00:00Z", "lat": 45.5, "lng": -122.6},
            {"Date": "2024-07-02", "Latitude": "45.7", "LON": "-122.8"},
            {"time": "2024-07-03T08:00:00", "lat": null, "lng": -122.6},
            "garbage"
        ]"#;
        let samples = parse_json(json).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].date().to_string(), "2024-07-02");
        assert!((samples[1].latitude() - 45.7).abs() < f64::EPSILON);
    }

    #[test]
    fn json_must_be_an_array() {
        let err = parse_json(r#"{"lat": 1}"#).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat(_)));
    }

    #[test]
    fn timestamp_keeps_written_offset_date() {
        // 23:30 at UTC-05:00 is already the next day in UTC, but the
        // sample belongs to the date it was written with.
        let ts = parse_timestamp("2024-07-01T23:30:00-05:00").unwrap();
        assert_eq!(ts.date().to_string(), "2024-07-01");
    }

    #[test]
    fn parses_supported_timestamp_forms() {
        assert!(parse_timestamp("2024-07-01T08:00:00.250").is_some());
        assert!(parse_timestamp("2024-07-01 08:00:00").is_some());
        assert!(parse_timestamp("2024-07-01T08:00").is_some());
        assert_eq!(
            parse_timestamp("2024-07-01").unwrap().to_string(),
            "2024-07-01 00:00:00"
        );
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("07/01/2024").is_none());
    }
}
