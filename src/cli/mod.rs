//! Command-line parsing for the epidemiological series tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! parsing/transform code: every subcommand ends up as a validated [`Query`]
//! (or a plain path) before any file is read.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{GapPolicy, Metric, Mode, Query, Region, YScale};
use crate::error::Result;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "epi", version, about = "Covid-19 time-series reports from tab-delimited logs")]
pub struct Cli {
    /// Tracing filter directive (e.g. `debug`, `epi_series=trace`). Overrides `EPI_LOG`.
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute a series and print it (optionally with a terminal plot and exports).
    Show(ShowArgs),
    /// Compute a series and write an SVG chart named after the query.
    Plot(PlotArgs),
    /// Print the parsed log back in block form.
    Dump(DumpArgs),
    /// Re-render a series JSON written by `epi show --export-json`.
    Replot(ReplotArgs),
}

/// Flags shared by every series-producing subcommand.
#[derive(Debug, Args, Clone)]
pub struct QueryArgs {
    /// Log file to read. Defaults to `EPI_DATA_FILE`, then `covid19_tests.txt`.
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Metric to compute.
    #[arg(short = 'm', long, value_enum, default_value_t = Metric::Pos)]
    pub metric: Metric,

    /// Region to compute it for.
    #[arg(short = 'r', long, value_enum, default_value_t = Region::Za)]
    pub region: Region,

    /// Cumulative totals or day-over-day changes.
    #[arg(long, value_enum, default_value_t = Mode::Cumulative)]
    pub mode: Mode,

    /// Rolling average window in days (1 = no averaging).
    #[arg(short = 'w', long, default_value_t = 1)]
    pub window: usize,

    /// First date to keep (DD-MM-YYYY or YYYY-MM-DD).
    #[arg(long, value_parser = parse_cli_date)]
    pub start: Option<NaiveDate>,

    /// Last date to keep (DD-MM-YYYY or YYYY-MM-DD).
    #[arg(long, value_parser = parse_cli_date)]
    pub end: Option<NaiveDate>,

    /// Y axis scale for charts.
    #[arg(long, value_enum, default_value_t = YScale::Linear)]
    pub yscale: YScale,

    /// How daily differencing treats missing calendar days.
    #[arg(long, value_enum, default_value_t = GapPolicy::Carry)]
    pub gaps: GapPolicy,
}

impl QueryArgs {
    /// Validate the flags into a [`Query`].
    pub fn to_query(&self) -> Result<Query> {
        Ok(Query::new(self.metric, self.region, self.mode, self.window)?
            .with_range(self.start, self.end)?
            .with_yscale(self.yscale)
            .with_gap_policy(self.gaps))
    }
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Also render an ASCII plot.
    #[arg(long)]
    pub ascii: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the series to CSV.
    #[arg(long, value_name = "PATH")]
    pub export_csv: Option<PathBuf>,

    /// Export the series (with its query) to JSON.
    #[arg(long, value_name = "PATH")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PlotArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Directory for the SVG. Defaults to `EPI_OUTPUT_DIR`, then `.`.
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Chart width in pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Chart height in pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

#[derive(Debug, Args)]
pub struct DumpArgs {
    /// Log file to read.
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Only print this region's lines.
    #[arg(short = 'r', long, value_enum)]
    pub region: Option<Region>,
}

#[derive(Debug, Args)]
pub struct ReplotArgs {
    /// Series JSON file.
    #[arg(long, value_name = "JSON")]
    pub series: PathBuf,

    /// Write an SVG chart here instead of printing an ASCII plot.
    #[arg(long, value_name = "PATH")]
    pub svg: Option<PathBuf>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Accept the log's own `DD-MM-YYYY` form or ISO `YYYY-MM-DD`.
pub fn parse_cli_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, crate::transform::LOG_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|_| format!("expected DD-MM-YYYY or YYYY-MM-DD, got '{raw}'"))
}
