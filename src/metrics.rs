/// Track metrics aggregation
///
/// Single forward pass over a segment's points, folded into one immutable
/// `TrackMetrics`: total distance, ascent/descent, elapsed time, average and
/// maximum speed, elevation bounds.

use tracing::{debug, trace};

use crate::config::TimestampPolicy;
use crate::error::MetricsError;
use crate::geo_math::{distance, elevation_delta};
use crate::track::TrackPoint;

const MS_TO_KMH: f64 = 3.6;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetrics {
    pub name: String,
    pub total_distance_m: f64,
    pub total_ascent_m: f64,
    pub total_descent_m: f64,
    pub elapsed_seconds: f64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub min_elevation_m: f64,
    pub max_elevation_m: f64,
    pub point_count: usize,
}

impl TrackMetrics {
    pub fn elevation_range_m(&self) -> f64 {
        self.max_elevation_m - self.min_elevation_m
    }
}

/// Running totals carried through the fold.
#[derive(Debug, Clone, Copy)]
struct Accumulator<'a> {
    previous: &'a TrackPoint,
    distance_m: f64,
    ascent_m: f64,
    descent_m: f64,
    elapsed_seconds: f64,
    max_speed_kmh: f64,
    min_elevation_m: f64,
    max_elevation_m: f64,
}

impl<'a> Accumulator<'a> {
    fn seed(first: &'a TrackPoint) -> Self {
        Accumulator {
            previous: first,
            distance_m: 0.0,
            ascent_m: 0.0,
            descent_m: 0.0,
            elapsed_seconds: 0.0,
            max_speed_kmh: 0.0,
            min_elevation_m: first.elevation_m,
            max_elevation_m: first.elevation_m,
        }
    }

    fn step(self, index: usize, point: &'a TrackPoint, policy: TimestampPolicy) -> Result<Self, MetricsError> {
        let delta = elevation_delta(point, self.previous);
        // a flat step (delta == 0) counts as descent
        let (ascent_m, descent_m) = if delta > 0.0 {
            (self.ascent_m + delta, self.descent_m)
        } else {
            (self.ascent_m, self.descent_m + delta.abs())
        };

        let segment_m = distance(self.previous, point);
        let step_seconds = time_step_seconds(self.previous, point);

        let counted_seconds = match policy {
            TimestampPolicy::SumSigned => step_seconds,
            TimestampPolicy::IgnoreNegative => step_seconds.max(0.0),
            TimestampPolicy::Reject if step_seconds < 0.0 => {
                return Err(MetricsError::NonMonotonicTimestamp {
                    index,
                    seconds: -step_seconds,
                });
            }
            TimestampPolicy::Reject => step_seconds,
        };

        let max_speed_kmh = if step_seconds > 0.0 {
            self.max_speed_kmh.max(segment_m / step_seconds * MS_TO_KMH)
        } else {
            self.max_speed_kmh
        };

        trace!(
            index,
            elevation_m = point.elevation_m,
            lat = point.latitude_deg,
            lon = point.longitude_deg,
            delta_m = delta,
            segment_m,
            step_seconds,
            "point"
        );

        Ok(Accumulator {
            previous: point,
            distance_m: self.distance_m + segment_m,
            ascent_m,
            descent_m,
            elapsed_seconds: self.elapsed_seconds + counted_seconds,
            max_speed_kmh,
            min_elevation_m: self.min_elevation_m.min(point.elevation_m),
            max_elevation_m: self.max_elevation_m.max(point.elevation_m),
        })
    }

    fn finish(self, name: &str, point_count: usize) -> TrackMetrics {
        let avg_speed_kmh = if self.elapsed_seconds > 0.0 {
            self.distance_m / self.elapsed_seconds * MS_TO_KMH
        } else {
            0.0
        };

        TrackMetrics {
            name: name.to_string(),
            total_distance_m: self.distance_m,
            total_ascent_m: self.ascent_m,
            total_descent_m: self.descent_m,
            elapsed_seconds: self.elapsed_seconds,
            avg_speed_kmh,
            max_speed_kmh: self.max_speed_kmh,
            min_elevation_m: self.min_elevation_m,
            max_elevation_m: self.max_elevation_m,
            point_count,
        }
    }
}

fn time_step_seconds(from: &TrackPoint, to: &TrackPoint) -> f64 {
    (to.timestamp - from.timestamp).num_milliseconds() as f64 / 1000.0
}

/// Aggregate a segment's points into its summary metrics.
///
/// An empty slice is reported as `MetricsError::EmptyTrack` rather than as
/// all-zero metrics, which would be indistinguishable from a stationary
/// recording.
pub fn aggregate(name: &str, points: &[TrackPoint], policy: TimestampPolicy) -> Result<TrackMetrics, MetricsError> {
    let (first, rest) = points.split_first().ok_or(MetricsError::EmptyTrack)?;

    let totals = rest
        .iter()
        .enumerate()
        .try_fold(Accumulator::seed(first), |acc, (i, point)| acc.step(i + 1, point, policy))?;

    let metrics = totals.finish(name, points.len());

    debug!(
        track = %metrics.name,
        points = metrics.point_count,
        distance_m = metrics.total_distance_m,
        ascent_m = metrics.total_ascent_m,
        descent_m = metrics.total_descent_m,
        elapsed_s = metrics.elapsed_seconds,
        "aggregated track metrics"
    );

    Ok(metrics)
}
