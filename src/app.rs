//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads environment settings
//! - installs logging
//! - resolves which log file to read
//! - runs the query pipeline
//! - prints reports/plots and writes optional files

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use crate::cli::{Command, DumpArgs, PlotArgs, ReplotArgs, ShowArgs};
use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::io::export::{SeriesFile, read_series_json, write_series_csv, write_series_json};

pub mod pipeline;

/// Entry point for the `epi` binary.
pub fn run() -> Result<()> {
    // `epi` and `epi -m pos ...` behave like `epi show ...`.
    //
    // Clap requires a subcommand name, so we rewrite argv before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let settings = Settings::from_env();
    crate::logging::init(cli.log_level.as_deref().or(settings.log_filter.as_deref()));

    match cli.command {
        Command::Show(args) => handle_show(args, &settings),
        Command::Plot(args) => handle_plot(args, &settings),
        Command::Dump(args) => handle_dump(args, &settings),
        Command::Replot(args) => handle_replot(args),
    }
}

fn handle_show(args: ShowArgs, settings: &Settings) -> Result<()> {
    let query = args.query.to_query()?;
    let path = resolve_log_path(args.query.file.as_deref(), settings)?;
    let run = pipeline::run_query(&path, &query)?;

    println!("{}", crate::report::format_run_summary(&run));
    println!("{}", crate::report::format_series(&run.series, &run.query));

    if args.ascii {
        println!("{}", crate::plot::render_ascii_plot(&run.series, args.width, args.height));
    }

    if let Some(path) = &args.export_csv {
        write_series_csv(path, &run.series)?;
        info!(path = %path.display(), "wrote CSV");
    }
    if let Some(path) = &args.export_json {
        let file = SeriesFile::new(&run.query, &run.labels, &run.artifact, &run.series);
        write_series_json(path, &file)?;
        info!(path = %path.display(), "wrote JSON");
    }

    Ok(())
}

fn handle_plot(args: PlotArgs, settings: &Settings) -> Result<()> {
    let query = args.query.to_query()?;
    let path = resolve_log_path(args.query.file.as_deref(), settings)?;
    let run = pipeline::run_query(&path, &query)?;

    let out_dir = args.out_dir.unwrap_or_else(|| settings.output_dir.clone());
    fs::create_dir_all(&out_dir).map_err(|source| AppError::Io {
        path: out_dir.clone(),
        source,
    })?;
    let svg = out_dir.join(format!("{}.svg", run.artifact));

    crate::plot::write_svg(&svg, &run.series, &run.labels, run.query.yscale, (args.width, args.height))?;
    info!(path = %svg.display(), "wrote chart");

    println!("{}", crate::report::format_run_summary(&run));
    println!("Chart: {}", svg.display());
    Ok(())
}

fn handle_dump(args: DumpArgs, settings: &Settings) -> Result<()> {
    let path = resolve_log_path(args.file.as_deref(), settings)?;
    let parsed = crate::io::parser::read_log(&path)?;

    print!("{}", crate::report::format_store(&parsed.store, args.region));
    if !parsed.issues.is_empty() {
        eprint!("{}", crate::report::format_diagnostics(&parsed.issues));
    }
    Ok(())
}

fn handle_replot(args: ReplotArgs) -> Result<()> {
    let series = read_series_json(&args.series)?;
    if series.points.is_empty() {
        return Err(AppError::EmptyResult {
            region: series.region.display_name().to_string(),
            metric: series.metric.display_name().to_string(),
        });
    }

    match &args.svg {
        Some(path) => {
            let size = crate::plot::DEFAULT_SIZE;
            crate::plot::write_svg(path, &series.points, &series.labels(), series.yscale, size)?;
            println!("Chart: {}", path.display());
        }
        None => {
            println!("=== {} ===", series.title);
            println!("{}", crate::plot::render_ascii_plot(&series.points, args.width, args.height));
        }
    }
    Ok(())
}

/// Pick the log to read: explicit flag, then the configured default if it
/// exists, then the interactive picker.
fn resolve_log_path(flag: Option<&Path>, settings: &Settings) -> Result<PathBuf> {
    if let Some(path) = flag {
        return crate::cli::picker::validate_log_path(path);
    }
    if settings.data_file.is_file() {
        return Ok(settings.data_file.clone());
    }
    crate::cli::picker::prompt_for_log_path()
}

/// Rewrite argv so `epi` defaults to `epi show`.
///
/// Rules:
/// - `epi`                       -> `epi show`
/// - `epi -m pos ...`            -> `epi show -m pos ...`
/// - `epi --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("show".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "plot" | "dump" | "replot");
    if is_subcommand {
        return argv;
    }

    // A leading flag means "show flags".
    if arg1.starts_with('-') {
        argv.insert(1, "show".to_string());
        return argv;
    }

    argv
}
