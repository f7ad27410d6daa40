/// Per-segment pipeline: metrics, elevation bins, altigraph.
///
/// Segments are independent, so whole files and the segments inside them
/// are analysed in parallel with rayon. One failing segment never stops the
/// others; its error is reported next to its name.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::binning::bin_elevations;
use crate::config::Config;
use crate::error::{MetricsError, ReadError};
use crate::gpx_reader::read_gpx_file;
use crate::metrics::{aggregate, TrackMetrics};
use crate::profile::{render, GraphUnits};
use crate::track::TrackSegment;

#[derive(Debug, Clone)]
pub struct SegmentReport {
    pub metrics: TrackMetrics,
    pub units: GraphUnits,
    pub profile: Vec<String>,
}

#[derive(Debug)]
pub struct SegmentOutcome {
    pub name: String,
    pub result: Result<SegmentReport, MetricsError>,
}

#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub segments: Result<Vec<SegmentOutcome>, ReadError>,
}

pub fn analyze_segment(segment: &TrackSegment, config: &Config) -> Result<SegmentReport, MetricsError> {
    let metrics = aggregate(&segment.name, &segment.points, config.timestamps)?;

    let profile_config = &config.profile;
    let units = GraphUnits::new(&metrics, profile_config.rows, profile_config.cols);
    debug!(
        segment = %segment.name,
        height_per_row_m = units.height_per_row_m,
        distance_per_column_m = units.distance_per_column_m,
        "graph units"
    );

    let bins = bin_elevations(&segment.points, units.distance_per_column_m, profile_config.cols);
    let profile = render(&metrics, &bins, units, profile_config);

    Ok(SegmentReport {
        metrics,
        units,
        profile,
    })
}

/// Analyse every segment; results keep the input order.
pub fn analyze_segments(segments: &[TrackSegment], config: &Config) -> Vec<SegmentOutcome> {
    segments
        .par_iter()
        .map(|segment| SegmentOutcome {
            name: segment.name.clone(),
            result: analyze_segment(segment, config),
        })
        .collect()
}

pub fn analyze_file(path: &Path, config: &Config) -> Result<Vec<SegmentOutcome>, ReadError> {
    let segments = read_gpx_file(path)?;
    Ok(analyze_segments(&segments, config))
}

pub fn analyze_files(paths: &[PathBuf], config: &Config) -> Vec<FileOutcome> {
    info!("Analysing {} file(s) on {} cores", paths.len(), num_cpus::get());

    paths
        .par_iter()
        .map(|path| FileOutcome {
            path: path.clone(),
            segments: analyze_file(path, config),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProfileConfig, TimestampPolicy};
    use crate::track::TrackPoint;
    use chrono::{Duration, TimeZone, Utc};

    fn segment(name: &str, elevations: &[f64]) -> TrackSegment {
        let t0 = Utc.with_ymd_and_hms(2018, 6, 20, 15, 31, 18).unwrap();
        let points = elevations
            .iter()
            .enumerate()
            .map(|(i, &e)| TrackPoint::new(45.0 + i as f64 * 0.001, 9.0, e, t0 + Duration::seconds(i as i64 * 30)))
            .collect();
        TrackSegment::new(name, points)
    }

    fn small_config() -> Config {
        Config {
            profile: ProfileConfig {
                rows: 5,
                cols: 8,
                label_spacing: 4,
                ..ProfileConfig::default()
            },
            timestamps: TimestampPolicy::SumSigned,
        }
    }

    #[test]
    fn test_segment_pipeline_shapes() {
        let config = small_config();
        let report = analyze_segment(&segment("climb", &[100.0, 120.0, 140.0, 160.0, 150.0]), &config).unwrap();

        assert_eq!(report.profile.len(), 5 + 2);
        assert!(report.profile[..5].iter().all(|line| line.ends_with(|c: char| c == '#' || c == ' ')));
        assert_eq!(report.profile[5], "       +---+---");
        assert_eq!(report.metrics.total_ascent_m, 60.0);
        assert_eq!(report.metrics.total_descent_m, 10.0);
        assert_eq!(report.units.height_per_row_m, 12.0);
        assert!(report.profile[0].starts_with("160.0 |"));
        assert!(report.profile[4].starts_with("112.0 |"));
    }

    #[test]
    fn test_bad_segment_does_not_stop_others() {
        let config = small_config();
        let segments = vec![
            segment("first", &[10.0, 20.0]),
            TrackSegment::new("empty", Vec::new()),
            segment("third", &[5.0, 5.0, 5.0]),
        ];

        let outcomes = analyze_segments(&segments, &config);

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].name, "first");
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(outcomes[1].result, Err(MetricsError::EmptyTrack)));
        assert!(outcomes[2].result.is_ok());
    }

    #[test]
    fn test_flat_segment_renders_without_nan() {
        let config = small_config();
        let report = analyze_segment(&segment("flat", &[250.0, 250.0, 250.0]), &config).unwrap();

        assert_eq!(report.units.height_per_row_m, 0.0);
        assert_eq!(report.metrics.elevation_range_m(), 0.0);
        assert!(report.profile.iter().all(|line| !line.contains("NaN") && !line.contains("inf")));
    }

    #[test]
    fn test_untimed_route_still_gets_distance_and_profile() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="planner" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="45.000" lon="9.000"><ele>100.0</ele></trkpt>
    <trkpt lat="45.001" lon="9.000"><ele>150.0</ele></trkpt>
    <trkpt lat="45.002" lon="9.000"><ele>120.0</ele></trkpt>
  </trkseg></trk>
</gpx>"#;
        let segments = crate::gpx_reader::read_segments(doc.as_bytes(), "route").unwrap();

        let outcomes = analyze_segments(&segments, &Config::default());

        assert_eq!(outcomes.len(), 1);
        let report = outcomes[0].result.as_ref().unwrap();
        assert_eq!(report.metrics.point_count, 3);
        assert!(report.metrics.total_distance_m > 200.0);
        assert_eq!(report.metrics.total_ascent_m, 50.0);
        assert_eq!(report.metrics.total_descent_m, 30.0);
        assert_eq!(report.metrics.elapsed_seconds, 0.0);
        assert_eq!(report.metrics.avg_speed_kmh, 0.0);
        assert_eq!(report.metrics.max_speed_kmh, 0.0);
        assert_eq!(report.profile.len(), Config::default().profile.rows + 2);
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let config = small_config();
        let outcomes = analyze_files(&[PathBuf::from("/nonexistent/track.gpx")], &config);

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0].segments, Err(ReadError::Io(_))));
    }
}
