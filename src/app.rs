//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves dataset paths and loads the CSV files
//! - runs the dashboard pipeline over the selected window
//! - prints reports/plots or writes exports

use clap::Parser;
use tracing::info;

use crate::cli::{Command, ExportArgs, PlotArgs, ViewArgs};
use crate::domain::{DashboardConfig, RentalDataset};
use crate::error::AppError;
use crate::io::ingest::LoadedData;

pub mod pipeline;

use pipeline::DashboardViews;

/// Entry point for the `rentals` binary.
pub fn run() -> Result<(), AppError> {
    // `rentals` and `rentals --daily day.csv` behave like `rentals tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Summary(args) => {
            crate::logging::init_cli();
            handle_summary(args)
        }
        Command::Plot(args) => {
            crate::logging::init_cli();
            handle_plot(args)
        }
        Command::Export(args) => {
            crate::logging::init_cli();
            handle_export(args)
        }
        Command::Tui(args) => {
            let _log_guard = crate::logging::init_tui();
            let config = config_from_args(&args, 100, 25)?;
            crate::tui::run(config)
        }
    }
}

fn handle_summary(args: ViewArgs) -> Result<(), AppError> {
    let config = config_from_args(&args, 100, 25)?;
    let (loaded, views) = load_and_compute(&config)?;

    println!("{}", crate::report::format_run_summary(&loaded, config.source, &views));
    println!("{}", crate::report::format_views(&views));
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.view, args.width, args.height)?;
    let (loaded, views) = load_and_compute(&config)?;

    println!("{}", crate::report::format_run_summary(&loaded, config.source, &views));
    println!(
        "{}",
        crate::plot::render_views(&views, config.plot_width, config.plot_height)
    );
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.view, 100, 25)?;
    let (_, views) = load_and_compute(&config)?;

    let written = crate::io::export::write_views(&args.out_dir, &views)?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

/// Load the datasets and compute the views for the configured window.
pub fn load_and_compute(config: &DashboardConfig) -> Result<(LoadedData, DashboardViews), AppError> {
    let loaded = crate::io::ingest::load_datasets(config)?;
    let dataset = select_dataset(&loaded, config)?;
    let range = pipeline::resolve_range(dataset, config.start, config.end)?;

    info!(
        source = config.source.label(),
        start = %range.start(),
        end = %range.end(),
        parallel = config.parallel,
        "Computing views"
    );
    let views = compute(dataset, range, config.parallel);
    Ok((loaded, views))
}

/// Run the pipeline, sequentially or on the rayon pool.
pub fn compute(dataset: &RentalDataset, range: crate::domain::DateRange, parallel: bool) -> DashboardViews {
    if parallel {
        pipeline::compute_views_parallel(dataset, range)
    } else {
        pipeline::compute_views(dataset, range)
    }
}

pub fn select_dataset<'a>(loaded: &'a LoadedData, config: &DashboardConfig) -> Result<&'a RentalDataset, AppError> {
    loaded.dataset(config.source).ok_or_else(|| {
        AppError::new(
            2,
            format!(
                "No {} dataset loaded. Pass --hourly <CSV> or set {}.",
                config.source.label(),
                crate::cli::paths::HOURLY_ENV
            ),
        )
    })
}

pub fn config_from_args(args: &ViewArgs, plot_width: usize, plot_height: usize) -> Result<DashboardConfig, AppError> {
    Ok(DashboardConfig {
        daily_path: crate::cli::paths::resolve_daily_path(args.daily.as_deref())?,
        hourly_path: crate::cli::paths::resolve_hourly_path(args.hourly.as_deref())?,
        source: args.source,
        start: args.start,
        end: args.end,
        parallel: args.parallel,
        plot_width,
        plot_height,
    })
}

/// Rewrite argv so `rentals` defaults to `rentals tui`.
///
/// Rules:
/// - `rentals`                      -> `rentals tui`
/// - `rentals --daily day.csv ...`  -> `rentals tui --daily day.csv ...`
/// - `rentals --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "summary" | "plot" | "export" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_launches_tui() {
        assert_eq!(rewrite_args(argv(&["rentals"])), argv(&["rentals", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["rentals", "--daily", "d.csv"])),
            argv(&["rentals", "tui", "--daily", "d.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["rentals", "plot"])), argv(&["rentals", "plot"]));
        assert_eq!(rewrite_args(argv(&["rentals", "--help"])), argv(&["rentals", "--help"]));
    }
}
