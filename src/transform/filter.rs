//! Date-window restriction.

use crate::domain::{DateRange, RentalDataset};

/// Keep the records whose `date` lies in `range` (both ends inclusive).
///
/// Record order and all columns are preserved. An empty result is a valid
/// outcome. Reversed or incomplete windows cannot reach this function: they are
/// rejected when the [`DateRange`] is built.
pub fn filter_by_date(dataset: &RentalDataset, range: &DateRange) -> RentalDataset {
    dataset
        .iter()
        .filter(|r| range.contains(r.date))
        .cloned()
        .collect()
}
