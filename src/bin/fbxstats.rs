//! fbxstats - collect one status report from the router
//!
//! Usage:
//!   fbxstats                         - Fetch, parse and store one report
//!   fbxstats --dry-run               - Same, but roll the writes back
//!   fbxstats --print-json            - Print the parsed report, store nothing
//!   fbxstats --report-file FILE      - Read a saved report instead of fetching

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use fbxstats_core::config::{parse_timeout, Config};
use fbxstats_core::{
    init_logger, run_cycle, CycleContext, FileReportSource, HttpReportSource, ReportSnapshot,
    ReportSource, SqliteStore,
};

#[derive(Parser, Debug)]
#[command(name = "fbxstats", version, about = "Store Freebox line statistics")]
struct Cli {
    /// SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Status report URL
    #[arg(short, long)]
    url: Option<String>,

    /// Fetch timeout in seconds
    #[arg(long)]
    timeout: Option<String>,

    /// Event stream name
    #[arg(long)]
    stream: Option<String>,

    /// Read the report from a file instead of the router
    #[arg(long, value_name = "PATH")]
    report_file: Option<PathBuf>,

    /// Run the whole cycle but roll the writes back
    #[arg(long)]
    dry_run: bool,

    /// Print the parsed report as JSON and exit without storing
    #[arg(long)]
    print_json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger();

    let config = load_config(&cli)?;
    let source = report_source(&cli, &config)?;
    let ctx = CycleContext::new(&config.stream).dry_run(cli.dry_run);

    if cli.print_json {
        let raw = source.fetch()?;
        let snapshot = ReportSnapshot::parse(raw, ctx.observed_at, &Local, &ctx.log_context())?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let mut store = SqliteStore::open(&config.database)
        .with_context(|| format!("opening {}", config.database.display()))?;

    let summary = run_cycle(&ctx, source.as_ref(), &mut store, &Local)?;

    if summary.committed {
        if let Err(e) = store.optimize() {
            log::warn!("{} OPTIMIZE_FAILED error={}", ctx.log_context(), e);
        }
    }

    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env()?;

    if let Some(database) = &cli.database {
        config.database = database.clone();
    }
    if let Some(url) = &cli.url {
        config.stats_url = url.clone();
    }
    if let Some(raw) = &cli.timeout {
        config.fetch_timeout = parse_timeout("--timeout", raw)?;
    }
    if let Some(stream) = &cli.stream {
        config.stream = stream.clone();
    }

    Ok(config)
}

fn report_source(cli: &Cli, config: &Config) -> Result<Box<dyn ReportSource>> {
    match &cli.report_file {
        Some(path) => Ok(Box::new(FileReportSource::new(path.clone()))),
        None => Ok(Box::new(HttpReportSource::new(
            &config.stats_url,
            config.fetch_timeout,
        )?)),
    }
}
