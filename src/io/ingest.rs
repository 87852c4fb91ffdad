//! CSV ingest for the daily and hourly rental exports.
//!
//! Unlike a best-effort loader, ingest here is **fail fast**: a missing
//! required column or any unparseable row aborts the load with the offending
//! line number. The transforms downstream assume every row is well formed.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{DashboardConfig, DataSource, RentalDataset, RentalRecord};
use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 5] = ["dteday", "temp", "season", "workingday", "cnt"];

/// Both loaded datasets. The hourly file is optional.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub daily: RentalDataset,
    pub hourly: Option<RentalDataset>,
    pub daily_path: PathBuf,
    pub hourly_path: Option<PathBuf>,
}

impl LoadedData {
    /// The dataset selected by `source`, if it was loaded.
    pub fn dataset(&self, source: DataSource) -> Option<&RentalDataset> {
        match source {
            DataSource::Daily => Some(&self.daily),
            DataSource::Hourly => self.hourly.as_ref(),
        }
    }
}

/// Load the daily file and, when configured, the hourly file.
pub fn load_datasets(config: &DashboardConfig) -> Result<LoadedData, AppError> {
    let daily = load_rentals(&config.daily_path, DataSource::Daily)?;
    let hourly = match &config.hourly_path {
        Some(path) => Some(load_rentals(path, DataSource::Hourly)?),
        None => None,
    };

    Ok(LoadedData {
        daily,
        hourly,
        daily_path: config.daily_path.clone(),
        hourly_path: config.hourly_path.clone(),
    })
}

/// Load one rental CSV file.
pub fn load_rentals(path: &Path, source: DataSource) -> Result<RentalDataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let dataset = read_rentals(file, source)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;

    info!(
        path = %path.display(),
        source = source.label(),
        rows = dataset.len(),
        "Loaded rental dataset"
    );
    Ok(dataset)
}

/// Parse rental rows from any reader. The hourly source additionally requires `hr`.
pub fn read_rentals<R: Read>(reader: R, source: DataSource) -> Result<RentalDataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map, source)?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line, CSV lines are 1-based.
        let line = idx + 2;

        let record = result.map_err(|e| AppError::new(2, format!("line {line}: CSV parse error: {e}")))?;
        let row = parse_row(&record, &header_map).map_err(|e| AppError::new(2, format!("line {line}: {e}")))?;
        records.push(row);
    }

    if records.is_empty() {
        return Err(AppError::new(2, "CSV contains no data rows."));
    }

    debug!(rows = records.len(), "Parsed rental rows");
    Ok(RentalDataset::new(records))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>, source: DataSource) -> Result<(), AppError> {
    for name in REQUIRED_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(AppError::new(2, format!("Missing required column: `{name}`")));
        }
    }
    if source == DataSource::Hourly && !header_map.contains_key("hr") {
        return Err(AppError::new(2, "Missing required column for hourly data: `hr`"));
    }
    Ok(())
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<RentalRecord, String> {
    let date = parse_date(get_required(record, header_map, "dteday")?)?;

    let temp = get_required(record, header_map, "temp")?;
    let temp = temp
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("Invalid `temp` value '{temp}'."))?;

    let season = parse_int(get_required(record, header_map, "season")?, "season")?;
    let workingday = parse_int(get_required(record, header_map, "workingday")?, "workingday")?;

    let cnt = get_required(record, header_map, "cnt")?;
    let cnt = cnt
        .parse::<u64>()
        .map_err(|_| format!("Invalid `cnt` value '{cnt}' (expected a non-negative integer)."))?;

    let hour = match get_optional(record, header_map, "hr") {
        Some(s) => Some(
            s.parse::<u8>()
                .ok()
                .filter(|h| *h < 24)
                .ok_or_else(|| format!("Invalid `hr` value '{s}' (expected 0-23)."))?,
        ),
        None => None,
    };

    let mut row = RentalRecord::new(date, temp, season, workingday, cnt);
    row.hour = hour;
    Ok(row)
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_int(s: &str, name: &str) -> Result<i64, String> {
    s.parse::<i64>()
        .map_err(|_| format!("Invalid `{name}` value '{s}' (expected an integer)."))
}

/// Parse a calendar date in one of the accepted formats.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY, DD-MM-YYYY."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY: &str = "\
instant,dteday,season,yr,mnth,holiday,weekday,workingday,weathersit,temp,atemp,hum,windspeed,casual,registered,cnt
1,2011-01-01,1,0,1,0,6,0,2,0.344167,0.363625,0.805833,0.160446,331,654,985
2,2011-01-02,1,0,1,0,0,0,2,0.363478,0.353739,0.696087,0.248539,131,670,801
3,2011-01-03,1,0,1,0,1,1,1,0.196364,0.189405,0.437273,0.248309,120,1229,1349
";

    #[test]
    fn reads_daily_rows_ignoring_extra_columns() {
        let ds = read_rentals(DAILY.as_bytes(), DataSource::Daily).unwrap();
        assert_eq!(ds.len(), 3);
        let first = &ds.records()[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2011, 1, 1).unwrap());
        assert_eq!(first.season, 1);
        assert_eq!(first.workingday, 0);
        assert_eq!(first.cnt, 985);
        assert!((first.temp - 0.344167).abs() < 1e-12);
        assert_eq!(first.hour, None);
        assert_eq!(first.temp_celsius, None);
    }

    #[test]
    fn header_names_are_case_insensitive_and_bom_tolerant() {
        let csv = "\u{feff}DTEDAY,Temp,Season,WorkingDay,CNT\n2011-01-01,0.5,2,1,10\n";
        let ds = read_rentals(csv.as_bytes(), DataSource::Daily).unwrap();
        assert_eq!(ds.records()[0].season, 2);
    }

    #[test]
    fn missing_column_fails_fast() {
        let csv = "dteday,temp,season,cnt\n2011-01-01,0.5,1,10\n";
        let err = read_rentals(csv.as_bytes(), DataSource::Daily).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("workingday"));
    }

    #[test]
    fn bad_date_reports_line() {
        let csv = "dteday,temp,season,workingday,cnt\n2011-01-01,0.5,1,1,10\nnot-a-date,0.5,1,1,10\n";
        let err = read_rentals(csv.as_bytes(), DataSource::Daily).unwrap_err();
        assert!(err.to_string().starts_with("line 3:"), "{err}");
    }

    #[test]
    fn negative_count_is_rejected() {
        let csv = "dteday,temp,season,workingday,cnt\n2011-01-01,0.5,1,1,-3\n";
        assert!(read_rentals(csv.as_bytes(), DataSource::Daily).is_err());
    }

    #[test]
    fn hourly_requires_hr_column() {
        let csv = "dteday,temp,season,workingday,cnt\n2011-01-01,0.5,1,1,3\n";
        assert!(read_rentals(csv.as_bytes(), DataSource::Hourly).is_err());

        let csv = "dteday,hr,temp,season,workingday,cnt\n2011-01-01,0,0.24,1,0,16\n2011-01-01,1,0.22,1,0,40\n";
        let ds = read_rentals(csv.as_bytes(), DataSource::Hourly).unwrap();
        assert_eq!(ds.records()[1].hour, Some(1));
    }

    #[test]
    fn header_only_file_is_an_error() {
        let csv = "dteday,temp,season,workingday,cnt\n";
        assert!(read_rentals(csv.as_bytes(), DataSource::Daily).is_err());
    }

    #[test]
    fn alternative_date_formats() {
        assert_eq!(parse_date("2011/02/03").unwrap(), NaiveDate::from_ymd_opt(2011, 2, 3).unwrap());
        assert_eq!(parse_date("03/02/2011").unwrap(), NaiveDate::from_ymd_opt(2011, 2, 3).unwrap());
        assert!(parse_date("2011-13-01").is_err());
    }
}
