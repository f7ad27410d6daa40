/// Track data model shared by the aggregation, binning and rendering passes.

use chrono::{DateTime, Utc};
use geo::{point, Point};

/// A single recorded GPS fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_m: f64,
    pub timestamp: DateTime<Utc>,
}

impl TrackPoint {
    pub fn new(latitude_deg: f64, longitude_deg: f64, elevation_m: f64, timestamp: DateTime<Utc>) -> Self {
        TrackPoint {
            latitude_deg,
            longitude_deg,
            elevation_m,
            timestamp,
        }
    }

    /// Position as a geo point (x = longitude, y = latitude).
    pub fn position(&self) -> Point<f64> {
        point!(x: self.longitude_deg, y: self.latitude_deg)
    }
}

/// One continuous run of points between start and stop of logging.
#[derive(Debug, Clone)]
pub struct TrackSegment {
    pub name: String,
    pub points: Vec<TrackPoint>,
}

impl TrackSegment {
    pub fn new(name: impl Into<String>, points: Vec<TrackPoint>) -> Self {
        TrackSegment {
            name: name.into(),
            points,
        }
    }
}
