//! Calendar-year column for the time-series view.

use chrono::Datelike;

use crate::domain::{RentalDataset, YearlySeries};

/// Attach the calendar year of `date` to every row. No aggregation.
pub fn extract_year(dataset: &RentalDataset) -> YearlySeries {
    let records = dataset
        .iter()
        .map(|r| {
            let mut row = r.clone();
            row.year = Some(r.date.year());
            row
        })
        .collect();
    YearlySeries { records }
}
