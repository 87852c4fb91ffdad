use chrono::NaiveDate;
use thiserror::Error;

/// Application-level failure carrying the process exit code.
///
/// Exit codes:
/// - `2`: input/config (unreadable or malformed CSV, bad flags)
/// - `3`: transform (invalid range, unmapped category, empty aggregation)
/// - `4`: terminal/UI
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures raised by the pure transforms and by date-range construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("incomplete date range: both a start and an end date are required")]
    IncompleteRange,

    #[error("date range {start}..={end} is outside the dataset span {min}..={max}")]
    OutOfSpan {
        start: NaiveDate,
        end: NaiveDate,
        min: NaiveDate,
        max: NaiveDate,
    },

    #[error("cannot take the first entry of an empty {0} summary")]
    EmptyAggregation(&'static str),

    #[error("unmapped `{column}` code: {code}")]
    UnmappedCategory { column: &'static str, code: i64 },
}

impl From<TransformError> for AppError {
    fn from(err: TransformError) -> Self {
        AppError::new(3, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_errors_map_to_exit_code_3() {
        let err: AppError = TransformError::EmptyAggregation("season").into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("season"));
    }

    #[test]
    fn unmapped_category_names_column_and_code() {
        let err = TransformError::UnmappedCategory {
            column: "workingday",
            code: 7,
        };
        assert_eq!(err.to_string(), "unmapped `workingday` code: 7");
    }
}
