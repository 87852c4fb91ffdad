//! Dataset path resolution.
//!
//! Precedence for each file: explicit flag, then environment (`.env` is loaded
//! with dotenvy), then the conventional `data/` location.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AppError;

pub const DAILY_ENV: &str = "RENTALS_DAILY_CSV";
pub const HOURLY_ENV: &str = "RENTALS_HOURLY_CSV";
pub const DEFAULT_DAILY: &str = "data/day.csv";
pub const DEFAULT_HOURLY: &str = "data/hour.csv";

/// Resolve the daily CSV. The file is required.
pub fn resolve_daily_path(flag: Option<&Path>) -> Result<PathBuf, AppError> {
    dotenvy::dotenv().ok();
    let path = flag
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(DAILY_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DAILY));
    debug!(path = %path.display(), "Resolved daily CSV");
    validate_csv_path(&path)
}

/// Resolve the hourly CSV.
///
/// An explicit flag or env value must point at a valid file; the conventional
/// default is used only if it exists.
pub fn resolve_hourly_path(flag: Option<&Path>) -> Result<Option<PathBuf>, AppError> {
    dotenvy::dotenv().ok();
    if let Some(path) = flag
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(HOURLY_ENV).map(PathBuf::from))
    {
        return validate_csv_path(&path).map(Some);
    }

    let default = PathBuf::from(DEFAULT_HOURLY);
    if default.is_file() {
        debug!(path = %default.display(), "Using default hourly CSV");
        return validate_csv_path(&default).map(Some);
    }
    Ok(None)
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(
            2,
            format!("CSV file not found: {}", path.display()),
        ));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        != Some(true)
    {
        return Err(AppError::new(
            2,
            format!("Expected a .csv file (got: {}).", path.display()),
        ));
    }

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn rejects_missing_and_non_csv_paths() {
        let missing = env::temp_dir().join("bike_rentals_missing_file.csv");
        let _ = fs::remove_file(&missing);
        assert_eq!(validate_csv_path(&missing).unwrap_err().exit_code(), 2);

        let txt = env::temp_dir().join("bike_rentals_not_csv.txt");
        fs::write(&txt, "x").unwrap();
        assert!(validate_csv_path(&txt).is_err());
        fs::remove_file(&txt).unwrap();

        assert!(validate_csv_path(&env::temp_dir()).is_err());
    }

    #[test]
    fn explicit_flag_wins() {
        let path = env::temp_dir().join("bike_rentals_flag.CSV");
        fs::write(&path, "dteday\n").unwrap();
        assert_eq!(resolve_daily_path(Some(&path)).unwrap(), path);
        assert_eq!(resolve_hourly_path(Some(&path)).unwrap(), Some(path.clone()));
        fs::remove_file(&path).unwrap();
    }
}
