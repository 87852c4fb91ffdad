//! Command-line parsing for the bike rental dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the transform code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::DataSource;

pub mod paths;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rentals", version, about = "Bike rental analytics dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the four views as text tables.
    Summary(ViewArgs),
    /// Print the four views as ASCII charts.
    Plot(PlotArgs),
    /// Write the four views as CSV files plus a JSON bundle.
    Export(ExportArgs),
    /// Launch the interactive TUI.
    ///
    /// Uses the same pipeline as `rentals summary`, recomputed on every
    /// change of the date range.
    Tui(ViewArgs),
}

/// Dataset and date-window options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    /// Daily CSV (defaults to $RENTALS_DAILY_CSV, then data/day.csv).
    #[arg(long, value_name = "CSV")]
    pub daily: Option<PathBuf>,

    /// Hourly CSV (defaults to $RENTALS_HOURLY_CSV, then data/hour.csv if present).
    #[arg(long, value_name = "CSV")]
    pub hourly: Option<PathBuf>,

    /// Which dataset the views are computed over.
    #[arg(long, value_enum, default_value_t = DataSource::Daily)]
    pub source: DataSource,

    /// First day of the window (inclusive). Requires --end.
    #[arg(long, value_parser = parse_date_arg, requires = "end")]
    pub start: Option<NaiveDate>,

    /// Last day of the window (inclusive). Requires --start.
    #[arg(long, value_parser = parse_date_arg, requires = "start")]
    pub end: Option<NaiveDate>,

    /// Run the four transforms on a thread pool.
    #[arg(long)]
    pub parallel: bool,
}

/// Options for ASCII plotting.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for exporting derived tables.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Directory to write the CSV/JSON files into.
    #[arg(long, value_name = "DIR", default_value = "views")]
    pub out_dir: PathBuf,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    crate::io::ingest::parse_date(s.trim())
}
