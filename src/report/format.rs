//! Formatted terminal output for the derived views.
//!
//! We keep formatting code in one place so:
//! - the transform code stays pure and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::DashboardViews;
use crate::domain::{
    DataSource, SEASON_CHART, SeasonSummary, TEMPERATURE_CHART, TemperaturePoint, WORKING_DAY_CHART,
    WorkingDaySummary, YEARLY_CHART, YearlySeries,
};
use crate::error::TransformError;
use crate::io::ingest::LoadedData;

/// Format the run header: loaded files, selected source, and window.
pub fn format_run_summary(loaded: &LoadedData, source: DataSource, views: &DashboardViews) -> String {
    let mut out = String::new();

    out.push_str("=== rentals - Bike Rental Dashboard ===\n");
    out.push_str(&format!(
        "Daily:  {} ({} rows)\n",
        loaded.daily_path.display(),
        loaded.daily.len()
    ));
    match (&loaded.hourly_path, &loaded.hourly) {
        (Some(path), Some(ds)) => out.push_str(&format!("Hourly: {} ({} rows)\n", path.display(), ds.len())),
        _ => out.push_str("Hourly: -\n"),
    }
    out.push_str(&format!("Source: {}\n", source.label()));
    out.push_str(&format!(
        "Range:  {} ({} days) | rows={} | rentals={}\n",
        views.range,
        views.range.days(),
        views.filtered_rows,
        views.filtered_total
    ));

    out
}

/// Format all four views, one section each.
pub fn format_views(views: &DashboardViews) -> String {
    let mut out = String::new();

    out.push_str(&format_temperature(&views.temperature));
    out.push('\n');
    out.push_str(&format_result(&views.working_day, format_working_day));
    out.push('\n');
    out.push_str(&format_yearly(&views.yearly));
    out.push('\n');
    out.push_str(&format_result(&views.season, format_season));

    out
}

fn format_result<T>(result: &Result<T, TransformError>, f: fn(&T) -> String) -> String {
    match result {
        Ok(v) => f(v),
        Err(e) => format!("(view unavailable: {e})\n"),
    }
}

/// Temperature view: row count and the observed °C / rental ranges.
pub fn format_temperature(points: &[TemperaturePoint]) -> String {
    let mut out = section(TEMPERATURE_CHART.title);
    if points.is_empty() {
        out.push_str("(no rows in range)\n");
        return out;
    }

    let (t_min, t_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.temp_celsius), hi.max(p.temp_celsius))
        });
    let c_min = points.iter().map(|p| p.cnt).min().unwrap_or(0);
    let c_max = points.iter().map(|p| p.cnt).max().unwrap_or(0);

    out.push_str(&format!("points: {}\n", points.len()));
    out.push_str(&format!("{}: [{t_min:.1}, {t_max:.1}]\n", TEMPERATURE_CHART.x_label));
    out.push_str(&format!("{}: [{c_min}, {c_max}]\n", TEMPERATURE_CHART.y_label));
    out
}

pub fn format_working_day(summary: &WorkingDaySummary) -> String {
    let mut out = section(WORKING_DAY_CHART.title);
    let grand = summary.grand_total();
    let rows = summary
        .entries
        .iter()
        .map(|e| (e.day_type.label(), e.total, false));
    out.push_str(&format_label_table(WORKING_DAY_CHART.x_label, WORKING_DAY_CHART.y_label, rows, grand));
    out
}

/// Season view; the most popular season is marked with `*`.
pub fn format_season(summary: &SeasonSummary) -> String {
    let mut out = section(SEASON_CHART.title);
    let grand: u64 = summary.entries.iter().map(|e| e.total).sum();
    let top = summary.most_popular().ok().map(|e| e.season);
    let rows = summary
        .entries
        .iter()
        .map(|e| (e.season.label(), e.total, Some(e.season) == top));
    out.push_str(&format_label_table(SEASON_CHART.x_label, SEASON_CHART.y_label, rows, grand));
    if let Some(top) = top {
        out.push_str(&format!("Most popular season: {}\n", top.label()));
    }
    out
}

/// Yearly view: one line per year with its row count and rentals.
pub fn format_yearly(series: &YearlySeries) -> String {
    let mut out = section(YEARLY_CHART.title);
    if series.is_empty() {
        out.push_str("(no rows in range)\n");
        return out;
    }

    out.push_str(&format!("{:<6} {:>6} {:>12} {:<10} {:<10}\n", "year", "rows", "rentals", "first", "last"));
    out.push_str(&format!("{:-<6} {:->6} {:->12} {:-<10} {:-<10}\n", "", "", "", "", ""));
    for (year, points) in series.by_year() {
        let rentals: u64 = points.iter().map(|(_, c)| c).sum();
        let first = points.iter().map(|(d, _)| *d).min();
        let last = points.iter().map(|(d, _)| *d).max();
        out.push_str(&format!(
            "{:<6} {:>6} {:>12} {:<10} {:<10}\n",
            year,
            points.len(),
            rentals,
            first.map(|d| d.to_string()).unwrap_or_default(),
            last.map(|d| d.to_string()).unwrap_or_default(),
        ));
    }
    out
}

fn section(title: &str) -> String {
    format!("{title}\n{}\n", "=".repeat(title.chars().count()))
}

fn format_label_table<'a>(
    x_label: &str,
    y_label: &str,
    rows: impl Iterator<Item = (&'a str, u64, bool)>,
    grand: u64,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("  {:<16} {:>14} {:>7}\n", x_label, y_label, "share"));
    out.push_str(&format!("  {:-<16} {:->14} {:->7}\n", "", "", ""));

    let mut any = false;
    for (label, total, highlight) in rows {
        any = true;
        let marker = if highlight { '*' } else { ' ' };
        out.push_str(&format!(
            "{marker} {:<16} {:>14} {:>6.1}%\n",
            label,
            total,
            pct(total, grand)
        ));
    }
    if !any {
        out.push_str("  (no rows in range)\n");
    }
    out
}

fn pct(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Season, SeasonTotal};

    #[test]
    fn season_table_marks_most_popular() {
        let summary = SeasonSummary {
            entries: vec![
                SeasonTotal {
                    season: Season::Summer,
                    total: 30,
                },
                SeasonTotal {
                    season: Season::Spring,
                    total: 10,
                },
            ],
        };
        let txt = format_season(&summary);
        let expected = concat!(
            "Daily Bike Rentals vs Season\n",
            "============================\n",
            "  Season            Total Rentals   share\n",
            "  ---------------- -------------- -------\n",
            "* Summer                       30   75.0%\n",
            "  Spring                       10   25.0%\n",
            "Most popular season: Summer\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_summaries_render_placeholder() {
        let txt = format_working_day(&WorkingDaySummary::default());
        assert!(txt.contains("(no rows in range)"));
        let txt = format_season(&SeasonSummary::default());
        assert!(!txt.contains("Most popular"));
    }

    #[test]
    fn failed_view_renders_error() {
        let err: Result<SeasonSummary, TransformError> =
            Err(TransformError::UnmappedCategory { column: "season", code: 0 });
        assert_eq!(
            format_result(&err, format_season),
            "(view unavailable: unmapped `season` code: 0)\n"
        );
    }

    #[test]
    fn pct_with_zero_total() {
        assert_eq!(pct(5, 0), 0.0);
        assert_eq!(pct(1, 4), 25.0);
    }
}
