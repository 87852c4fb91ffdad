//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the transform pipeline
//! - exported to CSV/JSON for downstream renderers
//! - rendered by the ASCII plotter and the TUI

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// Upper bound of the raw temperature scale (°C) the `temp` column was normalized with.
pub const TEMP_MAX_C: f64 = 39.0;
/// Lower bound of the raw temperature scale (°C).
pub const TEMP_MIN_C: f64 = -8.0;

/// One row of a rental dataset.
///
/// `temp_celsius` and `year` are derived columns: they stay `None` until the
/// corresponding transform has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalRecord {
    pub date: NaiveDate,
    /// Normalized temperature, nominally in `[0, 1]`.
    pub temp: f64,
    /// Raw season code (expected `1..=4`).
    pub season: i64,
    /// Raw working-day flag (expected `0` or `1`).
    pub workingday: i64,
    pub cnt: u64,
    /// Hour of day (`hr` column); only present in the hourly dataset.
    pub hour: Option<u8>,
    pub temp_celsius: Option<f64>,
    pub year: Option<i32>,
}

impl RentalRecord {
    pub fn new(date: NaiveDate, temp: f64, season: i64, workingday: i64, cnt: u64) -> Self {
        Self {
            date,
            temp,
            season,
            workingday,
            cnt,
            hour: None,
            temp_celsius: None,
            year: None,
        }
    }
}

/// Ordered, in-memory rental records.
///
/// Ordering by `date` is expected (the CSV exports are chronological) but not
/// enforced; transforms preserve whatever order they are given.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RentalDataset {
    records: Vec<RentalRecord>,
}

impl RentalDataset {
    pub fn new(records: Vec<RentalRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[RentalRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RentalRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<RentalRecord> {
        self.records
    }

    /// Sum of `cnt` over all rows.
    pub fn total_count(&self) -> u64 {
        self.records.iter().map(|r| r.cnt).sum()
    }

    /// Earliest and latest date as a range, or `None` for an empty dataset.
    pub fn date_span(&self) -> Option<DateRange> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some(DateRange { start: min, end: max })
    }
}

impl From<Vec<RentalRecord>> for RentalDataset {
    fn from(records: Vec<RentalRecord>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<RentalRecord> for RentalDataset {
    fn from_iter<I: IntoIterator<Item = RentalRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Inclusive calendar-date window. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

/// Unchecked wire form of [`DateRange`]; deserialization goes through `DateRange::new`.
#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = TransformError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TransformError> {
        if start > end {
            return Err(TransformError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Resolve a (possibly partial) user selection against the dataset span.
    ///
    /// - no endpoints: the full span
    /// - one endpoint: rejected, the caller must complete the selection
    /// - both endpoints: must be ordered and lie inside `span`
    pub fn from_selection(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        span: DateRange,
    ) -> Result<Self, TransformError> {
        match (start, end) {
            (None, None) => Ok(span),
            (Some(start), Some(end)) => {
                let range = Self::new(start, end)?;
                if !span.covers(&range) {
                    return Err(TransformError::OutOfSpan {
                        start,
                        end,
                        min: span.start,
                        max: span.end,
                    });
                }
                Ok(range)
            }
            _ => Err(TransformError::IncompleteRange),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// `true` if `other` lies entirely inside this range.
    pub fn covers(&self, other: &DateRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Number of calendar days in the window (both ends counted).
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Move the start date by `days`, clamped to `span` and to the current end.
    pub fn shift_start(&self, days: i64, span: DateRange) -> Self {
        let moved = add_days(self.start, days);
        let start = moved.max(span.start).min(self.end);
        Self { start, end: self.end }
    }

    /// Move the end date by `days`, clamped to the current start and to `span`.
    pub fn shift_end(&self, days: i64, span: DateRange) -> Self {
        let moved = add_days(self.end, days);
        let end = moved.min(span.end).max(self.start);
        Self { start: self.start, end }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let delta = chrono::Duration::days(days);
    if days >= 0 {
        date.checked_add_signed(delta).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_add_signed(delta).unwrap_or(NaiveDate::MIN)
    }
}

/// Meteorological season, decoded from the `season` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    pub fn from_code(code: i64) -> Result<Self, TransformError> {
        match code {
            1 => Ok(Season::Spring),
            2 => Ok(Season::Summer),
            3 => Ok(Season::Fall),
            4 => Ok(Season::Winter),
            _ => Err(TransformError::UnmappedCategory {
                column: "season",
                code,
            }),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Season::Spring => 1,
            Season::Summer => 2,
            Season::Fall => 3,
            Season::Winter => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

/// Working-day flag decoded from the `workingday` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayType {
    #[serde(rename = "Non-Working Day")]
    NonWorkingDay,
    #[serde(rename = "Working Day")]
    WorkingDay,
}

impl DayType {
    pub fn from_code(code: i64) -> Result<Self, TransformError> {
        match code {
            0 => Ok(DayType::NonWorkingDay),
            1 => Ok(DayType::WorkingDay),
            _ => Err(TransformError::UnmappedCategory {
                column: "workingday",
                code,
            }),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            DayType::NonWorkingDay => 0,
            DayType::WorkingDay => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayType::NonWorkingDay => "Non-Working Day",
            DayType::WorkingDay => "Working Day",
        }
    }
}

/// One `{label, total}` entry of a working-day summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDayTotal {
    pub day_type: DayType,
    pub total: u64,
}

/// Rental totals per working-day flag.
///
/// Holds one entry per flag present in the input (so at most two). Consumers
/// should look entries up by [`DayType`] rather than by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkingDaySummary {
    pub entries: Vec<WorkingDayTotal>,
}

impl WorkingDaySummary {
    pub fn total_for(&self, day_type: DayType) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.day_type == day_type)
            .map(|e| e.total)
    }

    pub fn grand_total(&self) -> u64 {
        self.entries.iter().map(|e| e.total).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One `{season, total}` entry of a season summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonTotal {
    pub season: Season,
    pub total: u64,
}

/// Rental totals per season, sorted descending by total.
///
/// Only built by `summarize_by_season`, which owns the sort order that
/// [`SeasonSummary::most_popular`] relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeasonSummary {
    pub(crate) entries: Vec<SeasonTotal>,
}

impl SeasonSummary {
    pub fn entries(&self) -> &[SeasonTotal] {
        &self.entries
    }

    /// The season with the highest total (first entry after sorting).
    pub fn most_popular(&self) -> Result<&SeasonTotal, TransformError> {
        self.entries
            .first()
            .ok_or(TransformError::EmptyAggregation("season"))
    }

    pub fn total_for(&self, season: Season) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.season == season)
            .map(|e| e.total)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Temperature-correlation point: one per filtered row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperaturePoint {
    pub date: NaiveDate,
    pub temp_celsius: f64,
    pub cnt: u64,
}

/// Filtered rows with the `year` column populated.
///
/// This is a row-level pass-through used to group a time-series rendering by
/// year; no aggregation happens here.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearlySeries {
    pub records: Vec<RentalRecord>,
}

impl YearlySeries {
    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(record_year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// One `(year, [(date, cnt)])` line per year, rows kept in input order.
    pub fn by_year(&self) -> Vec<(i32, Vec<(NaiveDate, u64)>)> {
        self.years()
            .into_iter()
            .map(|year| {
                let points = self
                    .records
                    .iter()
                    .filter(|r| record_year(r) == year)
                    .map(|r| (r.date, r.cnt))
                    .collect();
                (year, points)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn record_year(r: &RentalRecord) -> i32 {
    r.year.unwrap_or_else(|| r.date.year())
}

/// Fixed title and axis labels attached to each derived table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartSpec {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

pub const TEMPERATURE_CHART: ChartSpec = ChartSpec {
    title: "Daily Bike Rentals vs Temperature",
    x_label: "Temperature (°C)",
    y_label: "Number of Bike Rentals",
};

pub const WORKING_DAY_CHART: ChartSpec = ChartSpec {
    title: "Daily Bike Rentals vs Working Day",
    x_label: "Day Type",
    y_label: "Total Rentals",
};

pub const YEARLY_CHART: ChartSpec = ChartSpec {
    title: "Daily Bike Rentals Over the Years",
    x_label: "Date",
    y_label: "Number of Rentals",
};

pub const SEASON_CHART: ChartSpec = ChartSpec {
    title: "Daily Bike Rentals vs Season",
    x_label: "Season",
    y_label: "Total Rentals",
};

/// Which loaded dataset the views are computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Daily,
    Hourly,
}

impl DataSource {
    pub fn label(self) -> &'static str {
        match self {
            DataSource::Daily => "daily",
            DataSource::Hourly => "hourly",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            DataSource::Daily => DataSource::Hourly,
            DataSource::Hourly => DataSource::Daily,
        }
    }
}

/// Resolved run configuration (CLI flags + environment defaults).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub daily_path: PathBuf,
    /// `None` when the hourly file was not given and the default does not exist.
    pub hourly_path: Option<PathBuf>,
    pub source: DataSource,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub parallel: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}
