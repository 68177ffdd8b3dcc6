//! Geographic utilities: great-circle distance, polyline length, bearing.
//!
//! Distances use the `geo` crate's haversine formula on a spherical earth
//! (mean radius 6,371,008.8 m).

use geo::{Distance, Haversine, Point};

use crate::{Bounds, GpsPoint};

/// Great-circle distance between two GPS points in meters.
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Geodesic length of a polyline: sum of great-circle distances between
/// consecutive points, in meters. Fewer than two points have no length.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}

/// Bearing from `start` to `end` in degrees clockwise from north, `[0, 360)`.
///
/// This is `atan2(Δlon, Δlat)` on raw degree deltas, not the spherical
/// initial-bearing formula. Hosts compare against values produced this way,
/// so keep it.
pub fn bearing_degrees(start: &GpsPoint, end: &GpsPoint) -> f64 {
    let delta_lon = end.longitude - start.longitude;
    let delta_lat = end.latitude - start.latitude;

    let angle_deg = delta_lon.atan2(delta_lat).to_degrees();
    let normalized = (angle_deg + 360.0) % 360.0;

    // -0.0 and values that round up to 360.0 both belong at 0
    if normalized >= 360.0 || normalized == 0.0 {
        0.0
    } else {
        normalized
    }
}

/// Bounding box covering every point of every track.
pub fn compute_bounds<'a, I>(tracks: I) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a [GpsPoint]>,
{
    tracks
        .into_iter()
        .filter_map(Bounds::from_points)
        .reduce(|acc, b| acc.union(&b))
}
