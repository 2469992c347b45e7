//! CLI entry point for the St. Himark data-preparation tool.
//!
//! Each subcommand runs one transform to completion: it reads its input
//! files, derives a dataset, and writes it next to the inputs (or into the
//! output directory). Stages only hand data to each other through files.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use geojson::FeatureCollection;
use himark_prep::{
    aggregate::{
        self, Bucket, DATE_FORMAT,
        counts::{radar_profiles, report_counts},
        daily::{boxplot, boxplot_table, daily_mean},
        spread::{minmax, minmax_table, uncertainty, uncertainty_by_time},
        windows::{avg_damage, heatmap},
    },
    clean::{clean_reports, fill_location_median},
    config::Settings,
    district::DistrictTable,
    extract::{BoundingBox, extract_boundaries, load_grayscale},
    input::{read_json, read_reports},
    mapping::{
        attach_reliability, damage_scores, filter_by_damage, map_centroids, read_boundaries,
        update_with_damage,
    },
    output::{write_json, write_json_pretty, write_records},
    reliability::{ReliabilityRecord, score_districts},
    report::DamageProfile,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const RAW_REPORTS: &str = "mc1-reports-data.csv";
const MEDIAN_FILLED_REPORTS: &str = "cleaned_mc1-reports-data.csv";
const RADAR_DATA: &str = "radar_chart_data.json";
const BOUNDARIES: &str = "st_himark.geojson";
const RELIABILITY: &str = "processed_neighborhood_reliability.json";

#[derive(Parser)]
#[command(name = "himark_prep")]
#[command(about = "Prepares St. Himark damage reports for the dashboard", long_about = None)]
struct Cli {
    /// Directory input files are read from [env: HIMARK_DATA_DIR, default: .]
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory outputs are written to [env: HIMARK_OUTPUT_DIR, default: data dir]
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// JSON file replacing the built-in district table
    #[arg(long, global = true)]
    districts: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill missing damage values with the per-location median
    FillMedian {
        #[arg(short, long, default_value = RAW_REPORTS)]
        input: PathBuf,

        #[arg(short, long, default_value = MEDIAN_FILLED_REPORTS)]
        output: PathBuf,
    },
    /// Drop duplicate and empty rows, defaulting remaining gaps to 0
    Clean {
        #[arg(short, long, default_value = RAW_REPORTS)]
        input: PathBuf,

        #[arg(short, long, default_value = "mc1-reports-cleaned.csv")]
        output: PathBuf,
    },
    /// Five-number summaries per day and location
    Boxplot {
        #[arg(short, long, default_value = MEDIAN_FILLED_REPORTS)]
        input: PathBuf,

        #[arg(short, long, default_value = "boxplot_data.csv")]
        output: PathBuf,

        /// First day of the window (YYYY-MM-DD) [env: HIMARK_WINDOW_START]
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day of the window, inclusive (YYYY-MM-DD) [env: HIMARK_WINDOW_END]
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Mean damage per day and location
    DailyMean {
        #[arg(short, long, default_value = MEDIAN_FILLED_REPORTS)]
        input: PathBuf,

        #[arg(short, long, default_value = "daily_mean_by_location.csv")]
        output: PathBuf,

        #[arg(long)]
        from: Option<NaiveDate>,

        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Mean damage per location over 10-minute buckets
    Heatmap {
        #[arg(short, long, default_value = RAW_REPORTS)]
        input: PathBuf,

        #[arg(short, long, default_value = "heatmap_data.csv")]
        output: PathBuf,
    },
    /// Standard deviation of damage over 5-minute buckets
    Uncertainty {
        #[arg(short, long, default_value = RAW_REPORTS)]
        input: PathBuf,

        /// Per-location output
        #[arg(short, long, default_value = "uncertainty.csv")]
        output: PathBuf,

        /// Output across all locations
        #[arg(long, default_value = "uncertainty_by_time.csv")]
        by_time_output: PathBuf,
    },
    /// Mean damage per location over 5-minute buckets
    AvgDamage {
        #[arg(short, long, default_value = RAW_REPORTS)]
        input: PathBuf,

        #[arg(short, long, default_value = "avgdamage.csv")]
        output: PathBuf,
    },
    /// Lowest and highest damage per location over 30-minute buckets
    Minmax {
        #[arg(short, long, default_value = RAW_REPORTS)]
        input: PathBuf,

        #[arg(short, long, default_value = "minmax_damage.csv")]
        output: PathBuf,
    },
    /// Number of reports per neighbourhood
    ReportCounts {
        #[arg(short, long, default_value = RAW_REPORTS)]
        input: PathBuf,

        #[arg(short, long, default_value = "report_counts.csv")]
        output: PathBuf,
    },
    /// Per-location mean damage for the radar chart
    Radar {
        #[arg(short, long, default_value = RAW_REPORTS)]
        input: PathBuf,

        #[arg(short, long, default_value = RADAR_DATA)]
        output: PathBuf,
    },
    /// Score how reliable each district's reports are
    Reliability {
        #[arg(short, long, default_value = RAW_REPORTS)]
        input: PathBuf,

        #[arg(short, long, default_value = RELIABILITY)]
        output: PathBuf,
    },
    /// Attach district centroid coordinates to radar chart rows
    Centroids {
        #[arg(short, long, default_value = RADAR_DATA)]
        input: PathBuf,

        #[arg(short, long, default_value = "radar_chart_mapped.json")]
        output: PathBuf,
    },
    /// Keep only the boundaries of districts with damage data
    GeoFilter {
        #[arg(long, default_value = BOUNDARIES)]
        boundaries: PathBuf,

        #[arg(short, long, default_value = RADAR_DATA)]
        damage: PathBuf,

        #[arg(short, long, default_value = "st_himark_20.geojson")]
        output: PathBuf,
    },
    /// Score total damage 0-10 and attach it to every boundary
    GeoUpdate {
        #[arg(long, default_value = BOUNDARIES)]
        boundaries: PathBuf,

        #[arg(short, long, default_value = RADAR_DATA)]
        damage: PathBuf,

        /// Scored radar chart rows
        #[arg(long, default_value = "radar_chart_updated.json")]
        scores_output: PathBuf,

        #[arg(short, long, default_value = "st_himark_updated.geojson")]
        output: PathBuf,
    },
    /// Attach reliability scores to the boundaries of scored districts
    GeoReliability {
        #[arg(long, default_value = BOUNDARIES)]
        boundaries: PathBuf,

        #[arg(short, long, default_value = RELIABILITY)]
        reliability: PathBuf,

        #[arg(short, long, default_value = "st_himark_reliability.geojson")]
        output: PathBuf,
    },
    /// Trace approximate district polygons from a map image
    ExtractBoundaries {
        #[arg(short, long, default_value = "himark_map.png")]
        image: PathBuf,

        #[arg(short, long, default_value = "st_himark_extracted.geojson")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/himark_prep.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("himark_prep.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.data_dir, cli.output_dir)?;
    let districts = match &cli.districts {
        Some(path) => DistrictTable::load(path)?,
        None => DistrictTable::builtin(),
    };
    info!(
        data_dir = %settings.data_dir.display(),
        output_dir = %settings.output_dir.display(),
        districts = districts.len(),
        "Settings loaded"
    );

    match cli.command {
        Commands::FillMedian { input, output } => {
            let mut reports = read_reports(&settings.input(input))?;
            let filled = fill_location_median(&mut reports);
            info!(filled, "Missing values filled with location medians");
            write_records(&settings.output(output), &reports)?;
        }
        Commands::Clean { input, output } => {
            let (reports, _) = clean_reports(read_reports(&settings.input(input))?);
            write_records(&settings.output(output), &reports)?;
        }
        Commands::Boxplot {
            input,
            output,
            from,
            to,
        } => {
            let window = settings.window.with_overrides(from, to);
            info!(
                from = %window.start.format(DATE_FORMAT),
                to = %window.end.format(DATE_FORMAT),
                "Date window"
            );
            let reports = read_reports(&settings.input(input))?;
            boxplot_table(&boxplot(&reports, window)).write(&settings.output(output))?;
        }
        Commands::DailyMean {
            input,
            output,
            from,
            to,
        } => {
            let window = settings.window.with_overrides(from, to);
            let reports = read_reports(&settings.input(input))?;
            aggregate::stat_table(&daily_mean(&reports, window), "")
                .write(&settings.output(output))?;
        }
        Commands::Heatmap { input, output } => {
            let reports = read_reports(&settings.input(input))?;
            aggregate::stat_table(&heatmap(&reports), &Bucket::TenMinutes.column())
                .write(&settings.output(output))?;
        }
        Commands::Uncertainty {
            input,
            output,
            by_time_output,
        } => {
            let reports = read_reports(&settings.input(input))?;
            let column = Bucket::FiveMinutes.column();
            aggregate::stat_table(&uncertainty(&reports), &column)
                .write(&settings.output(output))?;
            aggregate::stat_table(&uncertainty_by_time(&reports), &column)
                .write(&settings.output(by_time_output))?;
        }
        Commands::AvgDamage { input, output } => {
            let reports = read_reports(&settings.input(input))?;
            aggregate::stat_table(&avg_damage(&reports), &Bucket::FiveMinutes.column())
                .write(&settings.output(output))?;
        }
        Commands::Minmax { input, output } => {
            let reports = read_reports(&settings.input(input))?;
            minmax_table(&minmax(&reports)).write(&settings.output(output))?;
        }
        Commands::ReportCounts { input, output } => {
            let reports = read_reports(&settings.input(input))?;
            let counts = report_counts(&reports, &districts);
            write_records(&settings.output(output), &counts)?;
        }
        Commands::Radar { input, output } => {
            let reports = read_reports(&settings.input(input))?;
            write_json(&settings.output(output), &radar_profiles(&reports))?;
        }
        Commands::Reliability { input, output } => {
            let reports = read_reports(&settings.input(input))?;
            let records = score_districts(&reports, &districts);
            let unscored = records.iter().filter(|r| r.reliability_score.is_none()).count();
            if unscored > 0 {
                warn!(unscored, "Districts with too few reports to score");
            }
            write_json(&settings.output(output), &records)?;
        }
        Commands::Centroids { input, output } => {
            let profiles = read_profiles(&settings.input(input))?;
            let mapped = map_centroids(profiles, &districts);
            write_json(&settings.output(output), &mapped)?;
        }
        Commands::GeoFilter {
            boundaries,
            damage,
            output,
        } => {
            let boundaries = read_boundaries(&settings.input(boundaries))?;
            let profiles = read_profiles(&settings.input(damage))?;
            let filtered = filter_by_damage(boundaries, &profiles);
            write_geojson(&settings.output(output), &filtered)?;
        }
        Commands::GeoUpdate {
            boundaries,
            damage,
            scores_output,
            output,
        } => {
            let mut boundaries = read_boundaries(&settings.input(boundaries))?;
            let scored = damage_scores(read_profiles(&settings.input(damage))?);
            write_json_pretty(&settings.output(scores_output), &scored)?;
            update_with_damage(&mut boundaries, &scored);
            write_geojson(&settings.output(output), &boundaries)?;
        }
        Commands::GeoReliability {
            boundaries,
            reliability,
            output,
        } => {
            let boundaries = read_boundaries(&settings.input(boundaries))?;
            let path = settings.input(reliability);
            let records: Vec<ReliabilityRecord> = read_json(&path)
                .with_context(|| format!("reading reliability scores from {}", path.display()))?;
            let mapped = attach_reliability(boundaries, &records);
            write_geojson(&settings.output(output), &mapped)?;
        }
        Commands::ExtractBoundaries { image, output } => {
            let image = load_grayscale(&settings.input(image))?;
            let extracted = extract_boundaries(&image, &BoundingBox::default());
            write_geojson(&settings.output(output), &extracted)?;
        }
    }

    Ok(())
}

/// Loads radar chart rows (per-location damage means).
#[tracing::instrument(skip_all, fields(path = %path.display()))]
fn read_profiles(path: &Path) -> Result<Vec<DamageProfile>> {
    let profiles: Vec<DamageProfile> = read_json(path)
        .with_context(|| format!("reading damage profiles from {}", path.display()))?;
    info!(districts = profiles.len(), "Damage profiles loaded");
    Ok(profiles)
}

#[tracing::instrument(skip(collection), fields(features = collection.features.len()))]
fn write_geojson(path: &Path, collection: &FeatureCollection) -> Result<()> {
    write_json_pretty(path, collection)
        .with_context(|| format!("writing GeoJSON to {}", path.display()))
}
