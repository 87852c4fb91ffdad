//! Export the derived tables for external renderers.
//!
//! One CSV per view plus a `views.json` bundle carrying the chart metadata.
//! Views whose computation failed are skipped (and listed in the bundle).

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::Datelike;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app::pipeline::DashboardViews;
use crate::domain::{
    ChartSpec, SEASON_CHART, SeasonSummary, TEMPERATURE_CHART, TemperaturePoint, WORKING_DAY_CHART,
    WorkingDaySummary, YEARLY_CHART,
};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct TemperatureRow {
    date: String,
    temp_celsius: f64,
    cnt: u64,
}

#[derive(Debug, Serialize)]
struct LabelTotalRow<'a> {
    label: &'a str,
    total: u64,
}

#[derive(Debug, Serialize)]
struct YearlyRow {
    date: String,
    year: i32,
    cnt: u64,
}

#[derive(Debug, Serialize)]
struct ViewsBundle<'a> {
    tool: &'static str,
    start: String,
    end: String,
    rows: usize,
    total_rentals: u64,
    temperature: ChartTable<'a, &'a [TemperaturePoint]>,
    working_day: Option<ChartTable<'a, &'a WorkingDaySummary>>,
    yearly: ChartTable<'a, Vec<YearlyRow>>,
    season: Option<SeasonTable<'a>>,
    failures: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ChartTable<'a, T> {
    chart: &'a ChartSpec,
    data: T,
}

#[derive(Debug, Serialize)]
struct SeasonTable<'a> {
    chart: &'a ChartSpec,
    most_popular: Option<&'static str>,
    data: &'a SeasonSummary,
}

/// Write all views into `dir` (created if missing). Returns the written paths.
pub fn write_views(dir: &Path, views: &DashboardViews) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create export dir '{}': {e}", dir.display())))?;

    let mut written = Vec::new();

    let path = dir.join("temperature.csv");
    let rows = views.temperature.iter().map(|p| TemperatureRow {
        date: p.date.to_string(),
        temp_celsius: p.temp_celsius,
        cnt: p.cnt,
    });
    write_csv(&path, rows)?;
    written.push(path);

    match &views.working_day {
        Ok(summary) => {
            let path = dir.join("working_day.csv");
            let rows = summary.entries.iter().map(|e| LabelTotalRow {
                label: e.day_type.label(),
                total: e.total,
            });
            write_csv(&path, rows)?;
            written.push(path);
        }
        Err(e) => warn!(error = %e, "Skipping working-day export"),
    }

    let path = dir.join("yearly.csv");
    write_csv(&path, yearly_rows(views))?;
    written.push(path);

    match &views.season {
        Ok(summary) => {
            let path = dir.join("season.csv");
            let rows = summary.entries.iter().map(|e| LabelTotalRow {
                label: e.season.label(),
                total: e.total,
            });
            write_csv(&path, rows)?;
            written.push(path);
        }
        Err(e) => warn!(error = %e, "Skipping season export"),
    }

    let path = dir.join("views.json");
    write_bundle_json(&path, views)?;
    written.push(path);

    info!(dir = %dir.display(), files = written.len(), "Exported views");
    Ok(written)
}

/// Write the JSON bundle (all views + chart metadata) to `path`.
pub fn write_bundle_json(path: &Path, views: &DashboardViews) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create views JSON '{}': {e}", path.display())))?;

    let bundle = ViewsBundle {
        tool: "rentals",
        start: views.range.start().to_string(),
        end: views.range.end().to_string(),
        rows: views.filtered_rows,
        total_rentals: views.filtered_total,
        temperature: ChartTable {
            chart: &TEMPERATURE_CHART,
            data: &views.temperature,
        },
        working_day: views.working_day.as_ref().ok().map(|data| ChartTable {
            chart: &WORKING_DAY_CHART,
            data,
        }),
        yearly: ChartTable {
            chart: &YEARLY_CHART,
            data: yearly_rows(views).collect(),
        },
        season: views.season.as_ref().ok().map(|data| SeasonTable {
            chart: &SEASON_CHART,
            most_popular: data.most_popular().ok().map(|e| e.season.label()),
            data,
        }),
        failures: views
            .failures()
            .into_iter()
            .map(|(view, e)| format!("{view}: {e}"))
            .collect(),
    };

    serde_json::to_writer_pretty(file, &bundle)
        .map_err(|e| AppError::new(2, format!("Failed to write views JSON: {e}")))?;
    Ok(())
}

fn yearly_rows(views: &DashboardViews) -> impl Iterator<Item = YearlyRow> + '_ {
    views.yearly.records.iter().map(|r| YearlyRow {
        date: r.date.to_string(),
        year: r.year.unwrap_or_else(|| r.date.year()),
        cnt: r.cnt,
    })
}

fn write_csv<S: Serialize>(path: &Path, rows: impl Iterator<Item = S>) -> Result<(), AppError> {
    debug!(path = %path.display(), "Writing CSV export");
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::compute_views;
    use crate::domain::{RentalDataset, RentalRecord, YearlySeries};
    use chrono::NaiveDate;
    use std::env;

    fn temp_dir(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn views(season_code: i64) -> DashboardViews {
        let d = |m| NaiveDate::from_ymd_opt(2011, m, 1).unwrap();
        let ds = RentalDataset::new(vec![
            RentalRecord::new(d(1), 0.5, 1, 0, 10),
            RentalRecord::new(d(7), 0.9, season_code, 1, 30),
        ]);
        compute_views(&ds, ds.date_span().unwrap())
    }

    #[test]
    fn writes_one_file_per_view_plus_bundle() {
        let dir = temp_dir("bike_rentals_export_all");
        let _ = fs::remove_dir_all(&dir);

        let written = write_views(&dir, &views(2)).unwrap();
        assert_eq!(written.len(), 5);

        let season = fs::read_to_string(dir.join("season.csv")).unwrap();
        assert_eq!(season, "label,total\nSummer,30\nSpring,10\n");

        let working = fs::read_to_string(dir.join("working_day.csv")).unwrap();
        assert!(working.contains("Non-Working Day,10"));
        assert!(working.contains("Working Day,30"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("views.json")).unwrap()).unwrap();
        assert_eq!(json["season"]["most_popular"], "Summer");
        assert_eq!(json["temperature"]["chart"]["x_label"], "Temperature (°C)");
        assert_eq!(json["total_rentals"], 40);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn failed_view_is_skipped_and_reported() {
        let dir = temp_dir("bike_rentals_export_failed");
        let _ = fs::remove_dir_all(&dir);

        let written = write_views(&dir, &views(8)).unwrap();
        assert_eq!(written.len(), 4);
        assert!(!dir.join("season.csv").exists());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("views.json")).unwrap()).unwrap();
        assert!(json["season"].is_null());
        assert_eq!(json["failures"][0], "season: unmapped `season` code: 8");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn yearly_rows_fall_back_to_date_year() {
        let dir = temp_dir("bike_rentals_export_year_fallback");
        let _ = fs::remove_dir_all(&dir);

        let mut views = views(2);
        views.yearly = YearlySeries {
            records: vec![RentalRecord::new(NaiveDate::from_ymd_opt(2012, 3, 4).unwrap(), 0.5, 1, 1, 12)],
        };
        write_views(&dir, &views).unwrap();

        let yearly = fs::read_to_string(dir.join("yearly.csv")).unwrap();
        assert_eq!(yearly, "date,year,cnt\n2012-03-04,2012,12\n");

        fs::remove_dir_all(&dir).unwrap();
    }
}
