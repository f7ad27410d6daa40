/// Console summary and CSV export of track metrics.

use std::io::Write;

use csv::Writer;

use crate::metrics::TrackMetrics;

/// Elapsed seconds as `Hh MMm SSs`; negative totals keep a leading `-`.
pub fn format_elapsed(seconds: f64) -> String {
    let sign = if seconds < 0.0 { "-" } else { "" };
    let total = seconds.abs().round() as u64;

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    format!("{}{}h {:02}m {:02}s", sign, hours, minutes, secs)
}

pub fn format_summary(metrics: &TrackMetrics) -> String {
    let mut out = String::new();
    out.push_str(&format!("Track: {} ({} points)\n", metrics.name, metrics.point_count));
    out.push_str(&format!("* Distance (km):          {:>10.2}\n", metrics.total_distance_m / 1000.0));
    out.push_str(&format!("* Ascent (m):             {:>10.2}\n", metrics.total_ascent_m));
    out.push_str(&format!("* Descent (m):            {:>10.2}\n", metrics.total_descent_m));
    out.push_str(&format!("* Elapsed time:           {:>10}\n", format_elapsed(metrics.elapsed_seconds)));
    out.push_str(&format!("* Average speed (km/h):   {:>10.2}\n", metrics.avg_speed_kmh));
    out.push_str(&format!("* Max speed (km/h):       {:>10.2}\n", metrics.max_speed_kmh));
    out.push_str(&format!("* Min elevation (m):      {:>10.2}\n", metrics.min_elevation_m));
    out.push_str(&format!("* Max elevation (m):      {:>10.2}\n", metrics.max_elevation_m));
    out
}

/// Write one CSV row per segment, with a header.
pub fn write_metrics_csv<W: Write>(writer: W, results: &[TrackMetrics]) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    wtr.write_record([
        "Track_Name",
        "Points",
        "Distance_km",
        "Ascent_m",
        "Descent_m",
        "Elapsed_s",
        "Avg_Speed_kmh",
        "Max_Speed_kmh",
        "Min_Elevation_m",
        "Max_Elevation_m",
    ])?;

    for m in results {
        wtr.write_record(&[
            m.name.clone(),
            m.point_count.to_string(),
            format!("{:.3}", m.total_distance_m / 1000.0),
            format!("{:.1}", m.total_ascent_m),
            format!("{:.1}", m.total_descent_m),
            format!("{:.0}", m.elapsed_seconds),
            format!("{:.2}", m.avg_speed_kmh),
            format!("{:.2}", m.max_speed_kmh),
            format!("{:.1}", m.min_elevation_m),
            format!("{:.1}", m.max_elevation_m),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
