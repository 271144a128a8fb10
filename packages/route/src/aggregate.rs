//! Collapses same-day position samples into one representative point.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use weathering_route_models::{DailyPoint, PositionSample};

/// Groups `samples` by calendar date and emits one [`DailyPoint`] per date,
/// positioned at the mean of that date's samples.
///
/// The date comes from each sample's own timestamp. Output is ordered by
/// date ascending.
#[must_use]
pub fn aggregate_by_day(samples: &[PositionSample]) -> Vec<DailyPoint> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&PositionSample>> = BTreeMap::new();
    for sample in samples {
        by_date.entry(sample.date()).or_default().push(sample);
    }

    let points: Vec<DailyPoint> = by_date
        .into_iter()
        .filter_map(|(date, day)| {
            weathering_spatial::centroid(&day)
                .map(|center| DailyPoint::new(date, center.y(), center.x()))
        })
        .collect();

    log::info!(
        "Aggregated {} samples into {} daily points",
        samples.len(),
        points.len()
    );

    points
}
