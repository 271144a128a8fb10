//! Route-point climate resolution.
//!
//! Daily points are grouped with seeded single-link grouping
//! ([`weathering_spatial::cluster`]) so nearby days share one provider
//! request. Each request covers the cluster centroid and the cluster's full
//! date span; the response is then read back per member using the member's
//! *own* date, so every point keeps its own coordinates and day.
//!
//! Per-point rules on a successful response:
//!
//! - no mean temperature for the date: the point is dropped
//! - no max temperature: mean + 5 °C
//! - no shortwave irradiance: 200 W/m²
//! - no relative humidity: 50 %
//! - UV index is always derived from UVA + UVB irradiance
//!
//! A failed request replaces the whole cluster with synthetic records.
//! Requests are strictly sequential with a minimum spacing between them.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use weathering_climate_models::{ClimateParameter, ClimateRecord, ClimateSource};
use weathering_route_models::DailyPoint;
use weathering_spatial::CLUSTER_THRESHOLD_DEGREES;

use crate::progress::ProgressCallback;
use crate::synthetic::synthetic_record;
use crate::{ClimateProvider, ClimateRequest, ParameterTable};

/// Default minimum spacing between provider requests.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(100);

/// Max temperature is taken as mean temperature plus this when absent.
pub const MAX_TEMPERATURE_OFFSET: f64 = 5.0;

/// Shortwave irradiance used when the provider has no value, W/m².
pub const DEFAULT_SOLAR_RADIATION: f64 = 200.0;

/// Relative humidity used when the provider has no value, %.
pub const DEFAULT_HUMIDITY: f64 = 50.0;

/// UVA + UVB irradiance (W/m²) per UV index unit.
pub const UV_IRRADIANCE_PER_INDEX: f64 = 25.0;

/// Highest UV index reported.
pub const MAX_UV_INDEX: f64 = 11.0;

/// Tuning for [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveOptions {
    /// Grouping radius in degrees.
    pub cluster_threshold: f64,
    /// Wait between successive provider requests. Values below
    /// [`DEFAULT_REQUEST_DELAY`] are raised to it.
    pub request_delay: Duration,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            cluster_threshold: CLUSTER_THRESHOLD_DEGREES,
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

impl ResolveOptions {
    /// Spacing actually applied between requests.
    #[must_use]
    pub fn effective_delay(&self) -> Duration {
        self.request_delay.max(DEFAULT_REQUEST_DELAY)
    }
}

/// Counters describing how a resolution went.
///
/// `points == provider_records + synthetic_records + dropped_points` always
/// holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReport {
    /// Daily points submitted.
    pub points: usize,
    /// Proximity clusters formed.
    pub clusters: usize,
    /// Provider requests issued (one per cluster).
    pub provider_requests: usize,
    /// Requests that failed and fell back to synthetic data.
    pub failed_requests: usize,
    /// Records built from provider data.
    pub provider_records: usize,
    /// Records generated after a failed request.
    pub synthetic_records: usize,
    /// Points dropped because the provider had no temperature for their date.
    pub dropped_points: usize,
}

impl ResolveReport {
    /// Whether any record is synthetic or any point was dropped.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.synthetic_records > 0 || self.dropped_points > 0
    }
}

/// Output of [`resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// One record per resolved point, grouped by cluster.
    pub records: Vec<ClimateRecord>,
    /// What happened along the way.
    pub report: ResolveReport,
}

/// Resolves climate records for `points`.
///
/// Issues one request per proximity cluster, sequentially, waiting
/// [`ResolveOptions::effective_delay`] between requests. Never fails: a failed request
/// degrades its cluster to synthetic records drawn from `rng`, and a point
/// whose date lacks a mean temperature is dropped. Output is grouped by
/// cluster and does not follow input order.
#[allow(clippy::future_not_send)]
pub async fn resolve<P, R>(
    provider: &P,
    points: &[DailyPoint],
    options: &ResolveOptions,
    rng: &mut R,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Resolution
where
    P: ClimateProvider + ?Sized,
    R: Rng + ?Sized,
{
    let clusters = weathering_spatial::cluster(points, options.cluster_threshold);

    let mut report = ResolveReport {
        points: points.len(),
        clusters: clusters.len(),
        ..ResolveReport::default()
    };
    let mut records = Vec::with_capacity(points.len());
    let delay = options.effective_delay();

    log::info!(
        "Resolving climate for {} points in {} clusters via {}",
        points.len(),
        clusters.len(),
        provider.id()
    );

    if let Some(p) = progress {
        p.set_total(clusters.len() as u64);
    }

    for (idx, members) in clusters.iter().enumerate() {
        let Some(request) = cluster_request(members) else {
            continue;
        };

        if idx > 0 {
            tokio::time::sleep(delay).await;
        }

        if let Some(p) = progress {
            p.set_message(format!(
                "{} .. {} ({} points)",
                request.start,
                request.end,
                members.len()
            ));
        }

        report.provider_requests += 1;

        match provider.fetch_daily(&request).await {
            Ok(table) => {
                for member in members {
                    if let Some(record) = record_from_table(member, &table) {
                        records.push(record);
                        report.provider_records += 1;
                    } else {
                        log::debug!(
                            "No temperature for {} at ({:.4}, {:.4}), dropping point",
                            member.date,
                            member.latitude,
                            member.longitude
                        );
                        report.dropped_points += 1;
                    }
                }
            }
            Err(e) => {
                log::warn!(
                    "Climate request for ({:.4}, {:.4}) {}..{} failed, using synthetic data for {} points: {e}",
                    request.latitude,
                    request.longitude,
                    request.start,
                    request.end,
                    members.len()
                );
                report.failed_requests += 1;
                for member in members {
                    records.push(synthetic_record(member, rng));
                    report.synthetic_records += 1;
                }
            }
        }

        if let Some(p) = progress {
            p.inc(1);
        }
    }

    if let Some(p) = progress {
        p.finish(format!("Resolved {} climate records", records.len()));
    }

    log::info!(
        "Climate resolution: {} provider records, {} synthetic ({} failed requests), {} dropped",
        report.provider_records,
        report.synthetic_records,
        report.failed_requests,
        report.dropped_points
    );

    Resolution { records, report }
}

/// Builds the shared request for a cluster: its centroid and the min..max
/// date of its members.
fn cluster_request(members: &[&DailyPoint]) -> Option<ClimateRequest> {
    let center = weathering_spatial::centroid(members)?;
    let start = members.iter().map(|m| m.date).min()?;
    let end = members.iter().map(|m| m.date).max()?;
    Some(ClimateRequest::new(center, start, end))
}

/// Reads one point's record out of a provider response, using the point's
/// own date and coordinates.
///
/// Returns `None` when the response has no mean temperature for that date.
#[must_use]
pub fn record_from_table(point: &DailyPoint, table: &ParameterTable) -> Option<ClimateRecord> {
    let value = |parameter| table.get(parameter, point.date);

    let temperature = value(ClimateParameter::Temperature)?;
    let max_temperature = value(ClimateParameter::MaxTemperature)
        .unwrap_or(temperature + MAX_TEMPERATURE_OFFSET);
    let solar_radiation =
        value(ClimateParameter::SolarRadiation).unwrap_or(DEFAULT_SOLAR_RADIATION);
    let humidity = value(ClimateParameter::Humidity).unwrap_or(DEFAULT_HUMIDITY);
    let uv_index = uv_index_from_irradiance(
        value(ClimateParameter::Uva).unwrap_or(0.0),
        value(ClimateParameter::Uvb).unwrap_or(0.0),
    );

    Some(ClimateRecord {
        date: point.date,
        latitude: point.latitude,
        longitude: point.longitude,
        temperature,
        max_temperature,
        solar_radiation,
        humidity,
        uv_index,
        source: ClimateSource::Provider,
    })
}

/// Converts UVA + UVB irradiance (W/m²) to a UV index clamped to `0..=11`.
#[must_use]
pub fn uv_index_from_irradiance(uva: f64, uvb: f64) -> f64 {
    ((uva + uvb) / UV_IRRADIANCE_PER_INDEX).clamp(0.0, MAX_UV_INDEX)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rand::SeedableRng as _;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::ClimateError;

    /// Replays scripted responses and records every request with the
    /// (paused) clock time it arrived at.
    struct ScriptedProvider {
        responses: Mutex<VecDeque<Result<ParameterTable, ClimateError>>>,
        calls: Mutex<Vec<(ClimateRequest, tokio::time::Instant)>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Result<ParameterTable, ClimateError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(ClimateRequest, tokio::time::Instant)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ClimateProvider for ScriptedProvider {
        fn id(&self) -> &str {
            "scripted"
        }

        async fn fetch_daily(
            &self,
            request: &ClimateRequest,
        ) -> Result<ParameterTable, ClimateError> {
            self.calls
                .lock()
                .unwrap()
                .push((*request, tokio::time::Instant::now()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ParameterTable::new()))
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn malformed() -> ClimateError {
        ClimateError::Malformed {
            message: "Missing properties.parameter object".to_string(),
        }
    }

    /// Counts progress calls.
    #[derive(Default)]
    struct CountingProgress {
        total: Mutex<Option<u64>>,
        increments: Mutex<u64>,
        messages: Mutex<usize>,
        finished: Mutex<bool>,
    }

    impl ProgressCallback for CountingProgress {
        fn set_total(&self, total: u64) {
            *self.total.lock().unwrap() = Some(total);
        }

        fn inc(&self, delta: u64) {
            *self.increments.lock().unwrap() += delta;
        }

        fn set_message(&self, _msg: String) {
            *self.messages.lock().unwrap() += 1;
        }

        fn finish(&self, _msg: String) {
            *self.finished.lock().unwrap() = true;
        }
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(1)
    }

    #[tokio::test(start_paused = true)]
    async fn one_request_per_cluster_spanning_member_dates() {
        let points = [
            DailyPoint::new(day(3), 10.0, 20.0),
            DailyPoint::new(day(1), 10.05, 20.0),
            DailyPoint::new(day(2), 40.0, -100.0),
            DailyPoint::new(day(5), 10.0, 20.08),
        ];
        let provider = ScriptedProvider::new(vec![]);

        let resolution = resolve(&provider, &points, &ResolveOptions::default(), &mut rng(), None).await;

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(resolution.report.clusters, 2);
        assert_eq!(resolution.report.provider_requests, 2);

        let (first, _) = calls[0];
        assert_eq!(first.start, day(1));
        assert_eq!(first.end, day(5));
        assert!((first.latitude - 10.0167).abs() < 1e-9);
        assert!((first.longitude - 20.0267).abs() < 1e-9);

        let (second, _) = calls[1];
        assert_eq!((second.start, second.end), (day(2), day(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn members_read_their_own_date_and_keep_their_coordinates() {
        let points = [
            DailyPoint::new(day(1), 10.0, 20.0),
            DailyPoint::new(day(2), 10.02, 20.02),
        ];
        let mut table = ParameterTable::new();
        table.insert(ClimateParameter::Temperature, day(1), 18.0);
        table.insert(ClimateParameter::Temperature, day(2), 24.0);
        table.insert(ClimateParameter::MaxTemperature, day(2), 31.0);
        table.insert(ClimateParameter::Humidity, day(1), 70.0);
        table.insert(ClimateParameter::SolarRadiation, day(2), 320.0);
        table.insert(ClimateParameter::Uva, day(1), 40.0);
        table.insert(ClimateParameter::Uvb, day(1), 10.0);
        let provider = ScriptedProvider::new(vec![Ok(table)]);

        let resolution = resolve(&provider, &points, &ResolveOptions::default(), &mut rng(), None).await;
        let records = resolution.records;

        assert_eq!(records.len(), 2);

        assert_eq!(records[0].date, day(1));
        assert!((records[0].latitude - 10.0).abs() < f64::EPSILON);
        assert!((records[0].temperature - 18.0).abs() < f64::EPSILON);
        assert!((records[0].max_temperature - 23.0).abs() < f64::EPSILON);
        assert!((records[0].solar_radiation - DEFAULT_SOLAR_RADIATION).abs() < f64::EPSILON);
        assert!((records[0].humidity - 70.0).abs() < f64::EPSILON);
        assert!((records[0].uv_index - 2.0).abs() < 1e-12);

        assert_eq!(records[1].date, day(2));
        assert!((records[1].longitude - 20.02).abs() < f64::EPSILON);
        assert!((records[1].temperature - 24.0).abs() < f64::EPSILON);
        assert!((records[1].max_temperature - 31.0).abs() < f64::EPSILON);
        assert!((records[1].solar_radiation - 320.0).abs() < f64::EPSILON);
        assert!((records[1].humidity - DEFAULT_HUMIDITY).abs() < f64::EPSILON);
        assert!(records[1].uv_index.abs() < f64::EPSILON);

        assert!(records.iter().all(|r| r.source == ClimateSource::Provider));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_temperature_drops_the_point() {
        let points = [
            DailyPoint::new(day(1), 10.0, 20.0),
            DailyPoint::new(day(2), 10.0, 20.0),
        ];
        let mut table = ParameterTable::new();
        table.insert(ClimateParameter::Temperature, day(1), 18.0);
        table.insert(ClimateParameter::Humidity, day(2), 40.0);
        let provider = ScriptedProvider::new(vec![Ok(table)]);

        let resolution = resolve(&provider, &points, &ResolveOptions::default(), &mut rng(), None).await;

        assert_eq!(resolution.records.len(), 1);
        assert_eq!(resolution.records[0].date, day(1));
        assert_eq!(resolution.report.dropped_points, 1);
        assert!(resolution.report.is_degraded());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_cluster_falls_back_to_synthetic_records() {
        let points = [
            DailyPoint::new(day(1), 10.0, 20.0),
            DailyPoint::new(day(2), 10.01, 20.01),
            DailyPoint::new(day(3), -33.0, 151.0),
        ];
        let mut table = ParameterTable::new();
        table.insert(ClimateParameter::Temperature, day(3), 15.0);
        let provider = ScriptedProvider::new(vec![Err(malformed()), Ok(table)]);

        let resolution = resolve(&provider, &points, &ResolveOptions::default(), &mut rng(), None).await;

        let synthetic: Vec<_> = resolution.records.iter().filter(|r| r.is_synthetic()).collect();
        assert_eq!(synthetic.len(), 2);
        for record in &synthetic {
            assert!((20.0..=45.0).contains(&record.temperature));
        }
        assert_eq!(synthetic[0].date, day(1));
        assert_eq!(synthetic[1].date, day(2));

        let report = resolution.report;
        assert_eq!(report.failed_requests, 1);
        assert_eq!(report.synthetic_records, 2);
        assert_eq!(report.provider_records, 1);
        assert_eq!(
            report.points,
            report.provider_records + report.synthetic_records + report.dropped_points
        );
    }

    #[tokio::test(start_paused = true)]
    async fn requests_are_spaced_by_the_delay() {
        let points = [
            DailyPoint::new(day(1), 0.0, 0.0),
            DailyPoint::new(day(2), 5.0, 5.0),
            DailyPoint::new(day(3), 10.0, 10.0),
        ];
        let provider = ScriptedProvider::new(vec![]);
        let start = tokio::time::Instant::now();

        resolve(
            &provider,
            &points,
            &ResolveOptions::default(),
            &mut rng(),
            None,
        )
        .await;

        let calls = provider.calls();
        assert_eq!(calls.len(), 3);
        for pair in calls.windows(2) {
            assert!(pair[1].1 - pair[0].1 >= DEFAULT_REQUEST_DELAY);
        }
        assert!(start.elapsed() >= DEFAULT_REQUEST_DELAY * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_route_issues_no_requests() {
        let provider = ScriptedProvider::new(vec![]);
        let resolution = resolve(&provider, &[], &ResolveOptions::default(), &mut rng(), None).await;
        assert!(resolution.records.is_empty());
        assert!(provider.calls().is_empty());
        assert_eq!(resolution.report, ResolveReport::default());
    }

    #[test]
    fn uv_index_is_clamped() {
        assert!((uv_index_from_irradiance(50.0, 25.0) - 3.0).abs() < 1e-12);
        assert!((uv_index_from_irradiance(400.0, 10.0) - MAX_UV_INDEX).abs() < f64::EPSILON);
        assert!(uv_index_from_irradiance(-10.0, 0.0).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_is_raised_to_the_minimum_spacing() {
        let points = [
            DailyPoint::new(day(1), 0.0, 0.0),
            DailyPoint::new(day(2), 30.0, 30.0),
        ];
        let provider = ScriptedProvider::new(vec![]);
        let options = ResolveOptions {
            request_delay: Duration::ZERO,
            ..ResolveOptions::default()
        };

        resolve(&provider, &points, &options, &mut rng(), None).await;

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].1 - calls[0].1 >= DEFAULT_REQUEST_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn longer_delay_is_honored() {
        let points = [
            DailyPoint::new(day(1), 0.0, 0.0),
            DailyPoint::new(day(2), 30.0, 30.0),
        ];
        let provider = ScriptedProvider::new(vec![]);
        let options = ResolveOptions {
            request_delay: Duration::from_millis(1_500),
            ..ResolveOptions::default()
        };

        resolve(&provider, &points, &options, &mut rng(), None).await;

        let calls = provider.calls();
        assert!(calls[1].1 - calls[0].1 >= Duration::from_millis(1_500));
    }

    #[tokio::test(start_paused = true)]
    async fn progress_advances_once_per_cluster() {
        let points = [
            DailyPoint::new(day(1), 10.0, 20.0),
            DailyPoint::new(day(2), 10.01, 20.01),
            DailyPoint::new(day(3), 40.0, -100.0),
        ];
        let provider = ScriptedProvider::new(vec![Err(malformed())]);
        let counter = Arc::new(CountingProgress::default());
        let progress: Arc<dyn ProgressCallback> = counter.clone();

        let resolution = resolve(
            &provider,
            &points,
            &ResolveOptions::default(),
            &mut rng(),
            Some(&progress),
        )
        .await;

        assert_eq!(resolution.report.clusters, 2);
        assert_eq!(*counter.total.lock().unwrap(), Some(2));
        assert_eq!(*counter.increments.lock().unwrap(), 2);
        assert_eq!(*counter.messages.lock().unwrap(), 2);
        assert!(*counter.finished.lock().unwrap());
    }
}
