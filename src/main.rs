use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod binning;
mod config;
mod error;
mod geo_math;
mod gpx_reader;
mod metrics;
mod profile;
mod report;
mod track;
mod track_analysis;

use config::{Config, TimestampPolicy};
use gpx_reader::collect_gpx_files;
use report::{format_summary, write_metrics_csv};
use track_analysis::analyze_files;

#[derive(Parser, Debug)]
#[command(name = "gpx-altigraph")]
#[command(author, version, about = "Track metrics and a text elevation profile from GPX files")]
struct Args {
    /// GPX file, or a directory searched recursively for .gpx files
    input: PathBuf,

    /// Config file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Profile height in rows
    #[arg(long)]
    rows: Option<usize>,

    /// Profile width in columns
    #[arg(long)]
    cols: Option<usize>,

    /// Columns between distance labels
    #[arg(long)]
    label_spacing: Option<usize>,

    /// Handling of points recorded out of time order
    #[arg(long, value_enum)]
    timestamps: Option<TimestampPolicy>,

    /// Also write the metrics of every segment to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the metrics only
    #[arg(long)]
    no_graph: bool,

    /// Trace intermediate values (-v debug, -vv every point)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(format!("gpx_altigraph={}", level).parse()?))
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    config.apply_overrides(args.rows, args.cols, args.label_spacing, args.timestamps);
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = resolve_config(&args)?;

    let files = collect_gpx_files(&args.input)?;
    if files.is_empty() {
        bail!("no GPX files found in {}", args.input.display());
    }

    let mut analysed = Vec::new();
    let mut failed = 0;

    for file in analyze_files(&files, &config) {
        let segments = match file.segments {
            Ok(segments) => segments,
            Err(e) => {
                error!("{}: {}", file.path.display(), e);
                failed += 1;
                continue;
            }
        };

        for segment in segments {
            match segment.result {
                Ok(report) => {
                    print!("{}", format_summary(&report.metrics));
                    if !args.no_graph {
                        println!();
                        for line in &report.profile {
                            println!("{}", line);
                        }
                        println!(
                            "1 row = {:.1} m, 1 column = {:.0} m",
                            report.units.height_per_row_m, report.units.distance_per_column_m
                        );
                    }
                    println!();
                    analysed.push(report.metrics);
                }
                Err(e) => {
                    warn!(segment = %segment.name, "skipped: {}", e);
                    failed += 1;
                }
            }
        }
    }

    if let Some(csv_path) = &args.csv {
        let output = File::create(csv_path).with_context(|| format!("creating {}", csv_path.display()))?;
        write_metrics_csv(output, &analysed)?;
        info!("Metrics saved to: {}", csv_path.display());
    }

    info!("{} segment(s) analysed, {} skipped", analysed.len(), failed);

    if analysed.is_empty() {
        bail!("no track segment could be analysed");
    }

    Ok(())
}
