/// GPX input: turns a GPX document into ordered track segments.
///
/// Every `trk/trkseg` becomes one `TrackSegment`. Points need an elevation;
/// points without one are skipped and counted. A segment with no timestamps
/// at all (a planned route) gets the same instant on every point, so its
/// elapsed time and speeds are zero while distance and climbing still count.
/// In a timed segment, points missing a timestamp are skipped.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use gpx::{read, Gpx, Waypoint};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::ReadError;
use crate::track::{TrackPoint, TrackSegment};

/// Parse a GPX document and split it into named segments.
pub fn read_segments<R: Read>(reader: R, fallback_name: &str) -> Result<Vec<TrackSegment>, ReadError> {
    let gpx: Gpx = read(reader).map_err(|e| ReadError::GpxParsing(format!("Failed to parse GPX: {}", e)))?;

    if gpx.tracks.is_empty() {
        return Err(ReadError::NoTracks);
    }

    let track_count = gpx.tracks.len();
    let mut segments = Vec::new();

    for (t, track) in gpx.tracks.iter().enumerate() {
        let track_name = track.name.clone().unwrap_or_else(|| {
            if track_count > 1 {
                format!("{} track {}", fallback_name, t + 1)
            } else {
                fallback_name.to_string()
            }
        });

        for (s, segment) in track.segments.iter().enumerate() {
            let name = if track.segments.len() > 1 {
                format!("{} #{}", track_name, s + 1)
            } else {
                track_name.clone()
            };

            let untimed = !segment.points.iter().any(|p| p.time.is_some());
            if untimed && !segment.points.is_empty() {
                warn!(segment = %name, "segment has no timestamps, elapsed time and speeds will be zero");
            }
            let fixed_time = untimed.then(DateTime::<Utc>::default);

            let points: Vec<TrackPoint> = segment
                .points
                .iter()
                .filter_map(|waypoint| to_track_point(waypoint, fixed_time))
                .collect();

            let skipped = segment.points.len() - points.len();
            if skipped > 0 {
                warn!(segment = %name, skipped, "skipped points without elevation or time");
            }
            debug!(segment = %name, points = points.len(), "read segment");

            segments.push(TrackSegment::new(name, points));
        }
    }

    Ok(segments)
}

/// Open and parse a GPX file; the file stem names unnamed tracks.
pub fn read_gpx_file(path: &Path) -> Result<Vec<TrackSegment>, ReadError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let fallback_name = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("track");

    read_segments(reader, fallback_name)
}

fn to_track_point(waypoint: &Waypoint, fixed_time: Option<DateTime<Utc>>) -> Option<TrackPoint> {
    let elevation = waypoint.elevation?;
    let timestamp = match fixed_time {
        Some(t) => t,
        None => waypoint
            .time
            .as_ref()
            .and_then(|t| t.format().ok())
            .and_then(|s| s.parse::<DateTime<Utc>>().ok())?,
    };

    let position = waypoint.point();
    Some(TrackPoint::new(position.y(), position.x(), elevation, timestamp))
}

/// A file path as-is, or every `.gpx` file below a directory, sorted.
///
/// Unreadable entries below the root are logged and skipped; only a root
/// that cannot be walked at all is an error.
pub fn collect_gpx_files(path: &Path) -> Result<Vec<PathBuf>, ReadError> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut gpx_files = Vec::new();
    for entry in WalkDir::new(path) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ReadError::Walk {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_file() {
            if let Some(extension) = entry.path().extension() {
                if extension.to_str().unwrap_or("").eq_ignore_ascii_case("gpx") {
                    gpx_files.push(entry.path().to_path_buf());
                }
            }
        }
    }

    gpx_files.sort();
    Ok(gpx_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const TWO_SEGMENTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Monte Barro</name>
    <trkseg>
      <trkpt lat="45.000" lon="9.000"><ele>100.0</ele><time>2018-06-20T15:31:18Z</time></trkpt>
      <trkpt lat="45.001" lon="9.000"><ele>150.0</ele><time>2018-06-20T15:32:18Z</time></trkpt>
      <trkpt lat="45.001" lon="9.001"><time>2018-06-20T15:32:48Z</time></trkpt>
      <trkpt lat="45.001" lon="9.001"><ele>120.0</ele><time>2018-06-20T15:33:18Z</time></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="45.002" lon="9.001"><ele>118.0</ele><time>2018-06-20T15:40:00Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_reads_each_segment() {
        let segments = read_segments(TWO_SEGMENTS.as_bytes(), "fallback").unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].name, "Monte Barro #1");
        assert_eq!(segments[1].name, "Monte Barro #2");

        // the point without <ele> is dropped
        assert_eq!(segments[0].points.len(), 3);
        assert_eq!(segments[1].points.len(), 1);

        let first = &segments[0].points[0];
        assert_eq!(first.latitude_deg, 45.0);
        assert_eq!(first.longitude_deg, 9.0);
        assert_eq!(first.elevation_m, 100.0);

        let elapsed = segments[0].points[2].timestamp - first.timestamp;
        assert_eq!(elapsed.num_seconds(), 120);
    }

    const PLANNED_ROUTE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="planner" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Resegone</name>
    <trkseg>
      <trkpt lat="45.000" lon="9.000"><ele>100.0</ele></trkpt>
      <trkpt lat="45.001" lon="9.000"><ele>150.0</ele></trkpt>
      <trkpt lat="45.002" lon="9.000"><ele>120.0</ele></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_segment_without_timestamps_keeps_points() {
        let segments = read_segments(PLANNED_ROUTE.as_bytes(), "fallback").unwrap();

        assert_eq!(segments.len(), 1);
        let points = &segments[0].points;
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.timestamp == points[0].timestamp));
        assert_eq!(points[2].elevation_m, 120.0);
    }

    #[test]
    fn test_missing_root_is_a_walk_error() {
        let result = collect_gpx_files(Path::new("/nonexistent/gpx-altigraph-root"));
        assert!(matches!(result, Err(ReadError::Walk { .. })));
    }

    #[test]
    fn test_unnamed_track_uses_fallback() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="45.0" lon="9.0"><ele>10</ele><time>2018-06-20T15:31:18Z</time></trkpt>
  </trkseg></trk>
</gpx>"#;

        let segments = read_segments(doc.as_bytes(), "morning_ride").unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].name, "morning_ride");
    }

    #[test]
    fn test_document_without_tracks() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <wpt lat="45.0" lon="9.0"><ele>10</ele></wpt>
</gpx>"#;

        assert!(matches!(read_segments(doc.as_bytes(), "x"), Err(ReadError::NoTracks)));
    }

    #[test]
    fn test_malformed_document() {
        let result = read_segments("<gpx><trk>".as_bytes(), "x");
        assert!(matches!(result, Err(ReadError::GpxParsing(_))));
    }

    #[test]
    fn test_collect_gpx_files_in_directory() {
        let dir = std::env::temp_dir().join(format!("gpx-altigraph-collect-{}", std::process::id()));
        let nested = dir.join("2018");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.join("b.gpx"), TWO_SEGMENTS).unwrap();
        fs::write(nested.join("a.GPX"), TWO_SEGMENTS).unwrap();
        fs::write(dir.join("notes.txt"), "not a track").unwrap();

        let files = collect_gpx_files(&dir).unwrap();
        assert_eq!(files, vec![nested.join("a.GPX"), dir.join("b.gpx")]);

        let single = collect_gpx_files(&dir.join("b.gpx")).unwrap();
        assert_eq!(single, vec![dir.join("b.gpx")]);

        let segments = read_gpx_file(&dir.join("b.gpx")).unwrap();
        assert_eq!(segments.len(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }
}
