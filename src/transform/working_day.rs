//! Rental totals grouped by the working-day flag.

use std::collections::BTreeMap;

use crate::domain::{DayType, RentalDataset, WorkingDaySummary, WorkingDayTotal};
use crate::error::TransformError;

/// Sum `cnt` per `workingday` flag and label each group.
///
/// Only flags present in `dataset` get an entry. Entries come out in ascending
/// flag order, but consumers should look them up by [`DayType`].
///
/// Fails with [`TransformError::UnmappedCategory`] on a flag other than 0/1.
pub fn summarize_by_working_day(dataset: &RentalDataset) -> Result<WorkingDaySummary, TransformError> {
    let mut totals: BTreeMap<DayType, u64> = BTreeMap::new();
    for r in dataset.iter() {
        let day_type = DayType::from_code(r.workingday)?;
        *totals.entry(day_type).or_default() += r.cnt;
    }

    let entries = totals
        .into_iter()
        .map(|(day_type, total)| WorkingDayTotal { day_type, total })
        .collect();
    Ok(WorkingDaySummary { entries })
}
