//! CLI entry point for the site occupancy tool.
//!
//! Provides subcommands for producing weekly occupancy summaries from a stay
//! export, inspecting the hourly grid, and checking the configured window.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use site_occupancy::config::Settings;
use site_occupancy::occupancy::{StayRecord, hourly_occupancy, summarise_stays};
use site_occupancy::output::{print_json, write_csv, write_records};
use site_occupancy::services::sql::extraction_query;
use site_occupancy::services::{
    CsvStaySource, CsvWeeklyStore, Extraction, SqlScriptStore, StaySource, StoreOutcome,
    WeeklyStore,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "site_occupancy")]
#[command(about = "Weekly patients-on-site summaries from attendance stays", long_about = None)]
struct Cli {
    /// Treat this date as today (YYYY-MM-DD) instead of the local date
    #[arg(long, global = true, value_name = "DATE")]
    as_of: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a stay export into weekly rows and store them
    Process {
        /// CSV export of stays
        #[arg(short, long, value_name = "CSV")]
        input: PathBuf,

        /// CSV table to replace the covered weeks in
        #[arg(short, long, value_name = "CSV")]
        store: Option<PathBuf>,

        /// Write a T-SQL script applying the batch to SQL_SCHEMA.SQL_TABLE
        #[arg(long, value_name = "FILE")]
        sql_script: Option<PathBuf>,
    },
    /// Write the hourly occupancy grid for a stay export
    Hourly {
        /// CSV export of stays
        #[arg(short, long, value_name = "CSV")]
        input: PathBuf,

        /// CSV file to write hourly rows to; stdout when omitted
        #[arg(short, long, value_name = "CSV")]
        output: Option<PathBuf>,
    },
    /// Show the extraction window for the configured DATE_WINDOW
    Window,
    /// Print the extract query with the window bound applied
    Query {
        /// SQL template the bound is appended to
        #[arg(short, long, value_name = "SQL")]
        template: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/site_occupancy.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("site_occupancy.log"));

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
    let today = cli.as_of.unwrap_or_else(|| Local::now().date_naive());

    match cli.command {
        Commands::Process {
            input,
            store,
            sql_script,
        } => {
            let settings = Settings::from_env()?;
            process(&settings, today, &input, store, sql_script)?;
        }
        Commands::Hourly { input, output } => {
            let settings = Settings::from_env()?;
            let stays = load_stays(&settings, today, &input)?;
            let hourly = hourly_occupancy(&stays, today)?;

            match output {
                Some(path) => {
                    write_records(&path, &hourly)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(rows = hourly.len(), path = %path.display(), "Hourly rows written");
                }
                None => write_csv(std::io::stdout().lock(), &hourly)?,
            }
        }
        Commands::Window => {
            let settings = Settings::from_env()?;
            info!(
                window = %settings.window,
                today = %today,
                date_start = %settings.window.start_date(today),
                week_start = %settings.window.week_start(today),
                "Processing window"
            );
        }
        Commands::Query { template } => {
            let settings = Settings::from_env()?;
            let base = std::fs::read_to_string(&template)
                .with_context(|| format!("reading {}", template.display()))?;
            println!("{}", extraction_query(&base, settings.window.week_start(today)));
        }
    }

    Ok(())
}

fn load_stays(
    settings: &Settings,
    today: NaiveDate,
    input: &Path,
) -> Result<Vec<StayRecord>> {
    let extraction = Extraction::new(settings, today);
    info!(
        window = %settings.window,
        week_start = %extraction.week_start,
        sites = settings.sites.len(),
        "Extracting stays"
    );
    CsvStaySource::new(input).fetch(&extraction)
}

/// Runs the full summary and hands the result to every requested store.
#[tracing::instrument(skip_all, fields(input = %input.display(), %today))]
fn process(
    settings: &Settings,
    today: NaiveDate,
    input: &Path,
    store: Option<PathBuf>,
    sql_script: Option<PathBuf>,
) -> Result<()> {
    let stays = load_stays(settings, today, input)?;
    let weekly = summarise_stays(&stays, today)?;

    let mut stores: Vec<Box<dyn WeeklyStore>> = Vec::new();
    if let Some(path) = store {
        stores.push(Box::new(CsvWeeklyStore::new(path)));
    }
    if let Some(path) = sql_script {
        let target = settings
            .target
            .clone()
            .context("SQL_SCHEMA and SQL_TABLE must be set to write a SQL script")?;
        stores.push(Box::new(SqlScriptStore::new(target, path)));
    }

    if stores.is_empty() {
        return print_json(&weekly);
    }

    for store in &mut stores {
        let StoreOutcome {
            created,
            removed,
            inserted,
        } = store.replace_window(&weekly)?;
        info!(created, ?removed, inserted, "Store updated");
    }

    Ok(())
}
