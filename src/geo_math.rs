/// Great-circle distance and elevation helpers.
///
/// Distances use the haversine formula on a sphere of radius
/// `EARTH_RADIUS_M`, the value most GPS receivers use internally. It is
/// slightly larger than the WGS-84 mean radius used by `geo`, so results
/// differ from `HaversineDistance` by a constant factor of about 1.0011.

use geo::Point;

use crate::track::TrackPoint;

/// Earth radius in meters as implemented on GPS devices (6378.13 km).
pub const EARTH_RADIUS_M: f64 = 6_378_130.0;

/// Distance in meters between two track points.
pub fn distance(p1: &TrackPoint, p2: &TrackPoint) -> f64 {
    haversine(p1.position(), p2.position())
}

/// Haversine distance in meters between two (lon, lat) points in degrees.
pub fn haversine(a: Point<f64>, b: Point<f64>) -> f64 {
    // abs() keeps the result bit-identical when the arguments are swapped
    let delta_lat = (b.y() - a.y()).abs().to_radians();
    let delta_lon = (b.x() - a.x()).abs().to_radians();
    let cos_product = a.y().to_radians().cos() * b.y().to_radians().cos();

    let h = (delta_lat / 2.0).sin().powi(2) + (delta_lon / 2.0).sin().powi(2) * cos_product;

    // rounding can push h marginally above 1 for antipodal points
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Signed elevation change `p1 - p2` in meters.
pub fn elevation_delta(p1: &TrackPoint, p2: &TrackPoint) -> f64 {
    p1.elevation_m - p2.elevation_m
}
