//! Rental totals grouped by season.

use std::collections::BTreeMap;

use crate::domain::{RentalDataset, Season, SeasonSummary, SeasonTotal};
use crate::error::TransformError;

/// Sum `cnt` per season, label, and sort descending by total.
///
/// Groups are collected in season-code order before a stable sort, so equal
/// totals keep Spring < Summer < Fall < Winter order regardless of row order.
///
/// Fails with [`TransformError::UnmappedCategory`] on a code outside `1..=4`.
pub fn summarize_by_season(dataset: &RentalDataset) -> Result<SeasonSummary, TransformError> {
    let mut totals: BTreeMap<Season, u64> = BTreeMap::new();
    for r in dataset.iter() {
        let season = Season::from_code(r.season)?;
        *totals.entry(season).or_default() += r.cnt;
    }

    let mut entries: Vec<SeasonTotal> = totals
        .into_iter()
        .map(|(season, total)| SeasonTotal { season, total })
        .collect();
    entries.sort_by(|a, b| b.total.cmp(&a.total));

    Ok(SeasonSummary { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RentalRecord;
    use chrono::NaiveDate;

    fn row(season: i64, cnt: u64) -> RentalRecord {
        RentalRecord::new(NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(), 0.5, season, 1, cnt)
    }

    fn labels(summary: &SeasonSummary) -> Vec<(&'static str, u64)> {
        summary.entries.iter().map(|e| (e.season.label(), e.total)).collect()
    }

    #[test]
    fn groups_labels_and_sorts_descending() {
        let ds = RentalDataset::new(vec![row(1, 10), row(2, 30), row(1, 5)]);
        let summary = summarize_by_season(&ds).unwrap();
        assert_eq!(labels(&summary), vec![("Summer", 30), ("Spring", 15)]);
        assert_eq!(summary.most_popular().unwrap().season, Season::Summer);
    }

    #[test]
    fn adjacent_entries_are_non_increasing() {
        let ds = RentalDataset::new(vec![row(4, 7), row(3, 90), row(1, 12), row(2, 55), row(4, 70)]);
        let summary = summarize_by_season(&ds).unwrap();
        assert_eq!(summary.len(), 4);
        assert!(summary.entries.windows(2).all(|w| w[0].total >= w[1].total));
        assert_eq!(labels(&summary)[0], ("Fall", 90));
    }

    #[test]
    fn ties_follow_season_code_order() {
        let ds = RentalDataset::new(vec![row(4, 20), row(2, 20), row(3, 5), row(1, 20)]);
        let summary = summarize_by_season(&ds).unwrap();
        assert_eq!(
            labels(&summary),
            vec![("Spring", 20), ("Summer", 20), ("Winter", 20), ("Fall", 5)]
        );
    }

    #[test]
    fn empty_input_has_no_most_popular_season() {
        let summary = summarize_by_season(&RentalDataset::default()).unwrap();
        assert!(summary.is_empty());
        assert_eq!(
            summary.most_popular().unwrap_err(),
            TransformError::EmptyAggregation("season")
        );
    }

    #[test]
    fn unmapped_code_fails() {
        let ds = RentalDataset::new(vec![row(5, 1)]);
        assert_eq!(
            summarize_by_season(&ds).unwrap_err(),
            TransformError::UnmappedCategory { column: "season", code: 5 }
        );
    }
}
