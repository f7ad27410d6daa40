/// Altigraph rendering
///
/// Quantizes binned elevations into a rows x cols grid (elevation grows
/// upward, row 0 is the highest band) and renders it as text with an
/// elevation label per row and a kilometre axis underneath.

use crate::config::ProfileConfig;
use crate::metrics::TrackMetrics;

/// Scale of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphUnits {
    pub height_per_row_m: f64,
    pub distance_per_column_m: f64,
}

impl GraphUnits {
    pub fn new(metrics: &TrackMetrics, rows: usize, cols: usize) -> Self {
        let height_per_row_m = if rows > 0 {
            metrics.elevation_range_m() / rows as f64
        } else {
            0.0
        };
        let distance_per_column_m = if cols > 0 {
            metrics.total_distance_m / cols as f64
        } else {
            0.0
        };

        GraphUnits {
            height_per_row_m,
            distance_per_column_m,
        }
    }
}

/// Number of filled cells, counted from the bottom, for one column.
///
/// A zero row height (flat track) fills the whole column when the bin lies
/// above the minimum and leaves it blank otherwise.
pub fn fill_count(bin_m: f64, min_elevation_m: f64, height_per_row_m: f64, rows: usize) -> usize {
    if height_per_row_m > 0.0 {
        let cells = ((bin_m - min_elevation_m) / height_per_row_m).ceil();
        if cells > 0.0 {
            (cells as usize).min(rows)
        } else {
            0
        }
    } else if bin_m > min_elevation_m {
        rows
    } else {
        0
    }
}

/// Row-major filled/blank matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileGrid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl ProfileGrid {
    pub fn build(bins: &[f64], min_elevation_m: f64, units: GraphUnits, rows: usize) -> Self {
        let cols = bins.len();
        let mut cells = vec![false; rows * cols];

        for (c, &bin) in bins.iter().enumerate() {
            let filled = fill_count(bin, min_elevation_m, units.height_per_row_m, rows);
            for r in (rows - filled)..rows {
                cells[r * cols + c] = true;
            }
        }

        ProfileGrid { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.cols + col]
    }
}

/// Render the altigraph as text lines: one per grid row, then the tick row
/// and the distance labels.
pub fn render(metrics: &TrackMetrics, bins: &[f64], units: GraphUnits, config: &ProfileConfig) -> Vec<String> {
    let grid = ProfileGrid::build(bins, metrics.min_elevation_m, units, config.rows);

    let labels: Vec<String> = (0..grid.rows())
        .map(|r| format!("{:.1}", metrics.max_elevation_m - r as f64 * units.height_per_row_m))
        .collect();
    let label_width = labels.iter().map(|l| l.len()).max().unwrap_or(0);
    let margin = " ".repeat(label_width + 2);

    let mut lines = Vec::with_capacity(grid.rows() + 2);

    for (r, label) in labels.iter().enumerate() {
        let cells: String = (0..grid.cols())
            .map(|c| if grid.is_filled(r, c) { config.fill_char } else { config.blank_char })
            .collect();
        lines.push(format!("{:>width$} |{}", label, cells, width = label_width));
    }

    let spacing = config.label_spacing.max(1);
    let ticks: String = (0..grid.cols())
        .map(|c| if c % spacing == 0 { '+' } else { '-' })
        .collect();
    lines.push(format!("{}{}", margin, ticks));

    lines.push(format!("{}{}", margin, distance_axis(grid.cols(), spacing, units.distance_per_column_m)));

    lines
}

/// Kilometre labels left-aligned under every `spacing`-th column. A label
/// that would run into the previous one is dropped.
fn distance_axis(cols: usize, spacing: usize, distance_per_column_m: f64) -> String {
    let mut axis: Vec<char> = vec![' '; cols];
    let mut next_free = 0;

    for c in (0..cols).step_by(spacing) {
        if c < next_free {
            continue;
        }
        let label = format!("{:.1}", c as f64 * distance_per_column_m / 1000.0);
        for (offset, ch) in label.chars().enumerate() {
            let pos = c + offset;
            if pos < axis.len() {
                axis[pos] = ch;
            } else {
                axis.push(ch);
            }
        }
        next_free = c + label.len() + 1;
    }

    axis.into_iter().collect::<String>().trim_end().to_string()
}
