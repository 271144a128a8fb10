#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Planar distance and proximity grouping for route points.
//!
//! Everything here works in raw (latitude, longitude) degree space. It is
//! not geodesically accurate and is only used to bound how many climate
//! provider requests a route fans out to, never for measurement.
//!
//! The grouping algorithm is *seeded single-link grouping*: each group is
//! anchored on the first unassigned point (its seed) and collects every
//! later unassigned point within the threshold of that seed. It is order
//! dependent and deliberately not a connected-components clustering.

use geo::{Centroid, MultiPoint, Point};

/// Default grouping radius in degrees (roughly 11 km at the equator).
pub const CLUSTER_THRESHOLD_DEGREES: f64 = 0.1;

/// Anything with a WGS84 position.
///
/// Points use the `geo` convention: `x` is longitude, `y` is latitude.
pub trait Located {
    /// Returns the position of this item.
    fn point(&self) -> Point<f64>;
}

impl Located for Point<f64> {
    fn point(&self) -> Point<f64> {
        *self
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn point(&self) -> Point<f64> {
        (**self).point()
    }
}

/// Euclidean distance between two positions in degree space.
#[must_use]
pub fn distance(a: Point<f64>, b: Point<f64>) -> f64 {
    (a.y() - b.y()).hypot(a.x() - b.x())
}

/// Arithmetic mean of the latitudes and longitudes of `points`.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn centroid<T: Located>(points: &[T]) -> Option<Point<f64>> {
    let multi: MultiPoint<f64> = points.iter().map(Located::point).collect();
    multi.centroid()
}

/// Partitions `points` using seeded single-link grouping.
///
/// Points are visited in input order. Each unassigned point seeds a new
/// group, and every *later* unassigned point within `threshold` (inclusive)
/// of the seed joins it. Members are only compared against the seed, so two
/// members of one group may be farther than `threshold` apart.
///
/// Every input point appears in exactly one group, and each group preserves
/// input order.
#[must_use]
pub fn cluster<T: Located>(points: &[T], threshold: f64) -> Vec<Vec<&T>> {
    let positions: Vec<Point<f64>> = points.iter().map(Located::point).collect();
    let mut assigned = vec![false; points.len()];
    let mut groups = Vec::new();

    for seed_idx in 0..points.len() {
        if assigned[seed_idx] {
            continue;
        }
        assigned[seed_idx] = true;

        let seed = positions[seed_idx];
        let mut group = vec![&points[seed_idx]];

        for idx in (seed_idx + 1)..points.len() {
            if !assigned[idx] && distance(seed, positions[idx]) <= threshold {
                assigned[idx] = true;
                group.push(&points[idx]);
            }
        }

        groups.push(group);
    }

    log::debug!(
        "Grouped {} points into {} clusters (threshold {threshold}°)",
        points.len(),
        groups.len()
    );

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lng: f64) -> Point<f64> {
        Point::new(lng, lat)
    }

    #[test]
    fn distance_is_symmetric() {
        let a = pt(10.0, 20.0);
        let b = pt(10.3, 19.6);
        assert!((distance(a, b) - distance(b, a)).abs() < f64::EPSILON);
        assert!((distance(a, b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn distance_is_zero_only_for_equal_points() {
        let a = pt(45.5, -122.6);
        assert!(distance(a, a).abs() < f64::EPSILON);
        assert!(distance(a, pt(45.5, -122.600_001)) > 0.0);
        assert!(distance(a, pt(45.500_001, -122.6)) > 0.0);
    }

    #[test]
    fn centroid_is_arithmetic_mean() {
        let points = [pt(10.0, 20.0), pt(10.01, 20.01), pt(10.02, 20.02)];
        let c = centroid(&points).unwrap();
        assert!((c.y() - 10.01).abs() < 1e-9);
        assert!((c.x() - 20.01).abs() < 1e-9);
    }

    #[test]
    fn centroid_of_nothing_is_none() {
        let points: [Point<f64>; 0] = [];
        assert!(centroid(&points).is_none());
    }

    #[test]
    fn cluster_partitions_input() {
        let points = [
            pt(0.0, 0.0),
            pt(5.0, 5.0),
            pt(0.05, 0.0),
            pt(5.05, 5.0),
            pt(10.0, 10.0),
            pt(0.0, 0.08),
        ];
        let groups = cluster(&points, CLUSTER_THRESHOLD_DEGREES);

        let total: usize = groups.iter().map(Vec::len).sum();
        assert_eq!(total, points.len());
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0], vec![&points[0], &points[2], &points[5]]);
        assert_eq!(groups[1], vec![&points[1], &points[3]]);
        assert_eq!(groups[2], vec![&points[4]]);
    }

    #[test]
    fn members_are_compared_against_seed_only() {
        // b is within reach of both a and c, but a and c are 0.16° apart.
        let a = pt(0.0, 0.0);
        let b = pt(0.0, 0.08);
        let c = pt(0.0, 0.16);

        // Seeded on b: everything lands in one group.
        let seeded_on_b = [b, a, c];
        let groups = cluster(&seeded_on_b, CLUSTER_THRESHOLD_DEGREES);
        assert_eq!(groups.len(), 1);

        // Seeded on a: c is too far from the seed even though b bridges them.
        let seeded_on_a = [a, b, c];
        let groups = cluster(&seeded_on_a, CLUSTER_THRESHOLD_DEGREES);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], vec![&a, &b]);
        assert_eq!(groups[1], vec![&c]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let points = [pt(0.0, 0.0), pt(0.0, 0.5)];
        assert_eq!(cluster(&points, 0.5).len(), 1);
        assert_eq!(cluster(&points, 0.499).len(), 2);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let points: [Point<f64>; 0] = [];
        assert!(cluster(&points, CLUSTER_THRESHOLD_DEGREES).is_empty());
    }
}
