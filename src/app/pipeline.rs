//! Shared "dashboard pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! dataset -> date filter -> {temperature, working day, yearly, season}
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::{
    DateRange, RentalDataset, SeasonSummary, TemperaturePoint, WorkingDaySummary, YearlySeries,
};
use crate::error::{AppError, TransformError};
use crate::transform::{
    convert_temperature, extract_year, filter_by_date, summarize_by_season, summarize_by_working_day,
    temperature_table,
};

/// All derived tables for one date window.
///
/// The two aggregations keep their own `Result` so a failure in one view
/// (e.g. an unmapped season code) does not hide the others.
#[derive(Debug, Clone)]
pub struct DashboardViews {
    pub range: DateRange,
    pub filtered_rows: usize,
    pub filtered_total: u64,
    pub temperature: Vec<TemperaturePoint>,
    pub working_day: Result<WorkingDaySummary, TransformError>,
    pub yearly: YearlySeries,
    pub season: Result<SeasonSummary, TransformError>,
}

impl DashboardViews {
    /// Errors of all views that failed, labelled by view.
    pub fn failures(&self) -> Vec<(&'static str, &TransformError)> {
        let mut out = Vec::new();
        if let Err(e) = &self.working_day {
            out.push(("working day", e));
        }
        if let Err(e) = &self.season {
            out.push(("season", e));
        }
        out
    }
}

/// Resolve the CLI/TUI selection against the span of `dataset`.
pub fn resolve_range(
    dataset: &RentalDataset,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<DateRange, AppError> {
    let span = dataset
        .date_span()
        .ok_or_else(|| AppError::new(2, "Dataset is empty; no date range to select."))?;
    Ok(DateRange::from_selection(start, end, span)?)
}

/// Filter `dataset` to `range` and compute the four views, one after another.
pub fn compute_views(dataset: &RentalDataset, range: DateRange) -> DashboardViews {
    let filtered = filter_by_date(dataset, &range);
    log_filtered(dataset, &filtered, range);

    let temperature = temperature_table(&convert_temperature(&filtered));
    let working_day = summarize_by_working_day(&filtered);
    let yearly = extract_year(&filtered);
    let season = summarize_by_season(&filtered);

    assemble(range, &filtered, temperature, working_day, yearly, season)
}

/// Same as [`compute_views`], with the four independent transforms run on the
/// rayon pool. They only share `filtered` by reference.
pub fn compute_views_parallel(dataset: &RentalDataset, range: DateRange) -> DashboardViews {
    let filtered = filter_by_date(dataset, &range);
    log_filtered(dataset, &filtered, range);

    let ((temperature, working_day), (yearly, season)) = rayon::join(
        || {
            rayon::join(
                || temperature_table(&convert_temperature(&filtered)),
                || summarize_by_working_day(&filtered),
            )
        },
        || rayon::join(|| extract_year(&filtered), || summarize_by_season(&filtered)),
    );

    assemble(range, &filtered, temperature, working_day, yearly, season)
}

fn log_filtered(dataset: &RentalDataset, filtered: &RentalDataset, range: DateRange) {
    debug!(
        start = %range.start(),
        end = %range.end(),
        rows_in = dataset.len(),
        rows_out = filtered.len(),
        "Applied date filter"
    );
    if filtered.is_empty() {
        warn!(start = %range.start(), end = %range.end(), "No records in selected range");
    }
}

fn assemble(
    range: DateRange,
    filtered: &RentalDataset,
    temperature: Vec<TemperaturePoint>,
    working_day: Result<WorkingDaySummary, TransformError>,
    yearly: YearlySeries,
    season: Result<SeasonSummary, TransformError>,
) -> DashboardViews {
    let views = DashboardViews {
        range,
        filtered_rows: filtered.len(),
        filtered_total: filtered.total_count(),
        temperature,
        working_day,
        yearly,
        season,
    };
    for (view, err) in views.failures() {
        warn!(view, error = %err, "View computation failed");
    }
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DayType, RentalRecord, Season};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> RentalDataset {
        RentalDataset::new(vec![
            RentalRecord::new(d(2011, 12, 30), 0.2, 4, 1, 100),
            RentalRecord::new(d(2011, 12, 31), 0.1, 4, 0, 50),
            RentalRecord::new(d(2012, 1, 1), 0.0, 1, 0, 70),
            RentalRecord::new(d(2012, 6, 1), 0.8, 2, 1, 400),
        ])
    }

    #[test]
    fn full_span_views() {
        let ds = sample();
        let range = resolve_range(&ds, None, None).unwrap();
        let views = compute_views(&ds, range);

        assert_eq!(views.filtered_rows, 4);
        assert_eq!(views.filtered_total, 620);
        assert_eq!(views.temperature.len(), 4);
        assert_eq!(views.yearly.years(), vec![2011, 2012]);

        let wd = views.working_day.as_ref().unwrap();
        assert_eq!(wd.total_for(DayType::WorkingDay), Some(500));
        assert_eq!(wd.total_for(DayType::NonWorkingDay), Some(120));

        let season = views.season.as_ref().unwrap();
        assert_eq!(season.most_popular().unwrap().season, Season::Summer);
    }

    #[test]
    fn parallel_matches_sequential() {
        let ds = sample();
        let range = DateRange::new(d(2011, 12, 31), d(2012, 6, 1)).unwrap();
        let a = compute_views(&ds, range);
        let b = compute_views_parallel(&ds, range);
        assert_eq!(a.temperature, b.temperature);
        assert_eq!(a.working_day, b.working_day);
        assert_eq!(a.yearly, b.yearly);
        assert_eq!(a.season, b.season);
    }

    #[test]
    fn failing_view_does_not_affect_others() {
        let mut ds = sample().into_records();
        ds.push(RentalRecord::new(d(2012, 6, 2), 0.5, 9, 1, 1));
        let ds = RentalDataset::new(ds);

        let views = compute_views(&ds, ds.date_span().unwrap());
        assert!(views.working_day.is_ok());
        assert_eq!(views.temperature.len(), 5);
        assert_eq!(
            views.season.unwrap_err(),
            TransformError::UnmappedCategory { column: "season", code: 9 }
        );
    }

    #[test]
    fn empty_window_gives_empty_views() {
        let ds = RentalDataset::new(vec![
            RentalRecord::new(d(2011, 1, 1), 0.2, 1, 1, 1),
            RentalRecord::new(d(2011, 1, 10), 0.2, 1, 1, 1),
        ]);
        let range = DateRange::new(d(2011, 1, 3), d(2011, 1, 5)).unwrap();
        let views = compute_views(&ds, range);
        assert_eq!(views.filtered_rows, 0);
        assert!(views.working_day.as_ref().unwrap().is_empty());
        let season = views.season.as_ref().unwrap();
        assert!(season.is_empty());
        assert_eq!(
            season.most_popular().unwrap_err(),
            TransformError::EmptyAggregation("season")
        );
    }

    #[test]
    fn resolve_range_rejects_partial_and_reversed_selection() {
        let ds = sample();
        let err = resolve_range(&ds, Some(d(2012, 1, 1)), None).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        let err = resolve_range(&ds, Some(d(2012, 1, 2)), Some(d(2012, 1, 1))).unwrap_err();
        assert!(err.to_string().contains("invalid date range"));
    }
}
