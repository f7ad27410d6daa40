/// Distance-domain elevation binning
///
/// Splits a track into `cols` slices of equal cumulative distance and
/// averages the elevation of the points falling in each slice. The distance
/// overshoot of a closed bin is carried into the next one so bin boundaries
/// stay aligned with the true distance axis over long tracks.

use tracing::debug;

use crate::geo_math::distance;
use crate::track::TrackPoint;

/// Average elevation per distance slice, always `cols` values long.
///
/// Bins close when the running distance reaches `distance_per_column_m`,
/// or at every point when that width is zero. The final point always closes
/// the last bin, and at most `cols` bins are closed: once `cols - 1` are
/// full the remaining points average into the last one. Columns left over
/// on sparse tracks repeat the last closed value.
pub fn bin_elevations(points: &[TrackPoint], distance_per_column_m: f64, cols: usize) -> Vec<f64> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    if cols == 0 {
        return Vec::new();
    }

    let last_index = points.len() - 1;
    let mut bins = Vec::with_capacity(cols);

    let mut previous = first;
    let mut accumulated_distance = 0.0;
    let mut accumulated_elevation = 0.0;
    let mut pc = 0usize;

    for (i, point) in points.iter().enumerate() {
        accumulated_distance += distance(previous, point);
        accumulated_elevation += point.elevation_m;
        pc += 1;
        previous = point;

        let bin_full = if distance_per_column_m > 0.0 {
            accumulated_distance >= distance_per_column_m
        } else {
            true
        };
        let has_room = bins.len() + 1 < cols;

        if i == last_index || (bin_full && has_room) {
            bins.push(accumulated_elevation / pc as f64);

            accumulated_distance -= distance_per_column_m;
            accumulated_elevation = 0.0;
            pc = 0;
        }
    }

    let closed = bins.len();
    if let Some(&tail) = bins.last() {
        bins.resize(cols, tail);
    }

    debug!(points = points.len(), cols, closed, padded = cols - closed, "binned elevations");

    bins
}
