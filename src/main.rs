//! CLI entry point for the GTFS sheet builder.
//!
//! Converts a workbook of route timetables and a stop-location file into the
//! seven transit feed tables, and packages them into a zip archive.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use gtfs_sheet_builder::{
    archive::create_archive,
    config::{ConverterConfig, UnresolvedStopPolicy},
    feed::{FeedSummary, assemble_feed, parse_routes},
    fetch::{BasicClient, DEFAULT_TIMEOUT, load_source},
    output::{print_json, print_pretty, write_feed},
    sheet::read_workbook,
    stops::read_stop_rows,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gtfs_sheet_builder")]
#[command(about = "Build a GTFS feed from timetable spreadsheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a route workbook and a stop file into feed tables
    Convert {
        /// Workbook with one "ROUTE n" sheet per route (path or URL)
        #[arg(value_name = "WORKBOOK")]
        workbook: String,

        /// Stop file with ID, name and WKT columns (path or URL)
        #[arg(value_name = "STOPS")]
        stops: String,

        /// Directory to write the tables into
        #[arg(short, long)]
        output_dir: Option<String>,

        /// File name of the zip archive inside the output directory
        #[arg(long)]
        zip_name: Option<String>,

        /// Write the tables but do not package them
        #[arg(long, default_value_t = false)]
        no_zip: bool,

        /// JSON config file (falls back to GTFS_SHEET_CONFIG)
        #[arg(short, long, env = "GTFS_SHEET_CONFIG")]
        config: Option<String>,

        /// Fail when a timetable stop name is missing from the stop file
        #[arg(long, default_value_t = false)]
        strict_stops: bool,

        /// Log the conversion summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Parse route sheets only and list what was found
    Inspect {
        /// Workbook to inspect (path or URL)
        #[arg(value_name = "WORKBOOK")]
        workbook: String,
    },
    /// Zip the feed tables already present in a directory
    Package {
        /// Directory holding the .txt tables
        #[arg(short, long, default_value = "output")]
        output_dir: String,

        /// File name of the zip archive
        #[arg(long, default_value = "gtfs.zip")]
        zip_name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/gtfs_sheet_builder.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("gtfs_sheet_builder.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive(LevelFilter::INFO.into()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive(LevelFilter::DEBUG.into()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            workbook,
            stops,
            output_dir,
            zip_name,
            no_zip,
            config,
            strict_stops,
            json,
        } => {
            let mut config = ConverterConfig::load_or_default(config.as_deref())?;
            if let Some(output_dir) = output_dir {
                config.output_dir = output_dir;
            }
            if let Some(zip_name) = zip_name {
                config.zip_name = zip_name;
            }
            if strict_stops {
                config.unresolved_stops = UnresolvedStopPolicy::Fail;
            }

            let summary = convert(&workbook, &stops, &config, !no_zip).await?;
            if json {
                print_json(&summary)?;
            } else {
                print_pretty(&summary);
            }
        }
        Commands::Inspect { workbook } => {
            inspect(&workbook).await?;
        }
        Commands::Package {
            output_dir,
            zip_name,
        } => {
            package(PathBuf::from(output_dir), zip_name).await?;
        }
    }

    Ok(())
}

/// Runs the full pipeline: load inputs, assemble, write tables, package.
#[tracing::instrument(skip(config), fields(output_dir = %config.output_dir))]
async fn convert(
    workbook: &str,
    stops: &str,
    config: &ConverterConfig,
    zip: bool,
) -> Result<FeedSummary> {
    let client = BasicClient::new(DEFAULT_TIMEOUT)?;

    let workbook_bytes = load_source(&client, workbook).await?;
    let stop_bytes = load_source(&client, stops).await?;

    let sheets = read_workbook(workbook_bytes)
        .with_context(|| format!("failed to read workbook '{workbook}'"))?;
    let stop_rows = read_stop_rows(stop_bytes.as_slice())
        .with_context(|| format!("failed to read stop file '{stops}'"))?;

    let reference = Local::now().date_naive();
    let feed = assemble_feed(&sheets, &stop_rows, reference, config)?;

    let dir = PathBuf::from(&config.output_dir);
    write_feed(&feed, &dir)?;

    if zip {
        package(dir, config.zip_name.clone()).await?;
    }

    info!(
        routes = feed.summary.routes,
        trips = feed.summary.trips,
        unresolved_stops = feed.summary.unresolved_stops.len(),
        "Conversion finished"
    );
    Ok(feed.summary)
}

/// Lists the routes a workbook would produce.
#[tracing::instrument]
async fn inspect(workbook: &str) -> Result<()> {
    let client = BasicClient::new(DEFAULT_TIMEOUT)?;
    let sheets = read_workbook(load_source(&client, workbook).await?)?;

    let mut summary = FeedSummary::default();
    let routes = parse_routes(&sheets, &mut summary);

    for route in &routes {
        info!(
            route_id = %route.id,
            short_name = %route.short_name,
            long_name = %route.long_name,
            entries = route.timetable.len(),
            "Route"
        );
    }

    info!(
        routes = routes.len(),
        skipped = summary.skipped_sheets.len(),
        discarded = summary.discarded_sheets.len(),
        duplicates = summary.duplicate_route_ids.len(),
        "Workbook summary"
    );
    Ok(())
}

/// Builds the archive off the async runtime.
async fn package(dir: PathBuf, zip_name: String) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || create_archive(&dir, &zip_name)).await?
}
