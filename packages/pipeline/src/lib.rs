#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! End-to-end route weathering analysis.
//!
//! [`run`] chains the stages:
//!
//! ```text
//! PositionSample ─aggregate_by_day─▶ DailyPoint ─resolve─▶ ClimateRecord ─derive_all─▶ AnalysisResult
//! ```
//!
//! Each stage produces a new owned collection. Climate resolution is the
//! only stage that talks to the outside world; [`reanalyze`] re-runs the
//! physics on already-resolved records without a provider, so changing the
//! surface material never costs another request.

pub mod config;
pub mod export;
pub mod snapshot;

use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use weathering_climate::progress::ProgressCallback;
use weathering_climate::{ClimateProvider, ResolveReport};
use weathering_climate_models::ClimateRecord;
use weathering_route::{IngestError, PositionSample};
use weathering_surface_models::{AnalysisResult, SurfaceProperties};

pub use config::{AggregationLevel, AnalysisConfig, ConfigError};

/// Errors that abort a run before or after climate resolution.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Route could not be ingested.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Climate snapshot could not be read or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output of a full run.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Resolved climate records, kept for re-analysis.
    pub climate: Vec<ClimateRecord>,
    /// One result per climate record, in the same order.
    pub results: Vec<AnalysisResult>,
    /// How climate resolution went.
    pub report: ResolveReport,
}

/// Runs the full analysis for a route.
///
/// Provider failures never abort the run; they show up as synthetic records
/// in [`Analysis::climate`] and as counts in [`Analysis::report`].
///
/// # Errors
///
/// Returns [`PipelineError::Config`] if `config` fails validation and
/// [`PipelineError::Ingest`] if `samples` is empty. Both are checked before
/// any provider request.
#[allow(clippy::future_not_send)]
pub async fn run<P, R>(
    provider: &P,
    samples: &[PositionSample],
    config: &AnalysisConfig,
    rng: &mut R,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Result<Analysis, PipelineError>
where
    P: ClimateProvider + ?Sized,
    R: Rng + ?Sized,
{
    config.validate()?;

    if samples.is_empty() {
        return Err(IngestError::NoValidSamples { rejected: 0 }.into());
    }

    let start = Instant::now();

    let points = weathering_route::aggregate_by_day(samples);

    let outside = points.iter().filter(|p| !config.in_window(p.date)).count();
    if outside > 0 {
        log::warn!(
            "{outside} of {} days fall outside the configured date window",
            points.len()
        );
    }

    let resolution = weathering_climate::resolve(
        provider,
        &points,
        &config.resolve_options(),
        rng,
        progress,
    )
    .await;

    if resolution.report.is_degraded() {
        log::warn!(
            "{} of {} days have no provider data ({} synthetic, {} dropped)",
            resolution.report.synthetic_records + resolution.report.dropped_points,
            resolution.report.points,
            resolution.report.synthetic_records,
            resolution.report.dropped_points
        );
    }

    let results = reanalyze(&resolution.records, &config.surface);

    log::info!(
        "Analyzed {} days from {} samples in {:.1}s",
        results.len(),
        samples.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(Analysis {
        climate: resolution.records,
        results,
        report: resolution.report,
    })
}

/// Re-derives results from already-resolved climate records.
///
/// Never contacts a provider. Output has the same length and order as
/// `records`.
#[must_use]
pub fn reanalyze(records: &[ClimateRecord], properties: &SurfaceProperties) -> Vec<AnalysisResult> {
    weathering_physics::derive_all(records, properties)
}
