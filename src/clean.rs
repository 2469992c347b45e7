//! Report cleaning: group-median imputation, deduplication, and empty-row removal.

use std::collections::{BTreeMap, HashSet};

use tracing::{info, warn};

use crate::report::{DamageField, Report};
use crate::stats::median;

/// Fills missing damage values with the median of the same field within the
/// report's group.
///
/// A group whose field has no observed values has no median, so those values
/// remain missing. Returns the number of values filled.
pub fn fill_group_median<K, F>(reports: &mut [Report], key: F) -> usize
where
    K: Ord,
    F: Fn(&Report) -> K,
{
    let mut observed: BTreeMap<(K, DamageField), Vec<f64>> = BTreeMap::new();
    for report in reports.iter() {
        for field in DamageField::ALL {
            if let Some(v) = report.get(field) {
                observed.entry((key(report), field)).or_default().push(v);
            }
        }
    }

    let medians: BTreeMap<(K, DamageField), f64> = observed
        .into_iter()
        .filter_map(|(k, values)| median(&values).map(|m| (k, m)))
        .collect();

    let mut filled = 0;
    let mut unfillable = 0;
    for report in reports.iter_mut() {
        for field in DamageField::ALL {
            if report.get(field).is_some() {
                continue;
            }
            match medians.get(&(key(report), field)) {
                Some(m) => {
                    *report.slot(field) = Some(*m);
                    filled += 1;
                }
                None => unfillable += 1,
            }
        }
    }

    if unfillable > 0 {
        warn!(unfillable, "Groups without observed values left missing");
    }
    filled
}

/// Median fill grouped by district.
#[tracing::instrument(skip_all, fields(rows = reports.len()))]
pub fn fill_location_median(reports: &mut [Report]) -> usize {
    let filled = fill_group_median(reports, |r| r.location);
    info!(filled, "Filled missing values with per-location medians");
    filled
}

/// Median fill grouped by calendar day and district.
#[tracing::instrument(skip_all, fields(rows = reports.len()))]
pub fn fill_daily_location_median(reports: &mut [Report]) -> usize {
    let filled = fill_group_median(reports, |r| (r.date(), r.location));
    info!(
        filled,
        "Filled missing values with per-day, per-location medians"
    );
    filled
}

/// Removes exact duplicate rows, keeping the first occurrence in input order.
/// Returns the remaining rows and the number removed.
pub fn dedupe(reports: Vec<Report>) -> (Vec<Report>, usize) {
    let before = reports.len();
    let mut seen = HashSet::new();
    let unique: Vec<Report> = reports
        .into_iter()
        .filter(|r| seen.insert(r.identity()))
        .collect();
    let removed = before - unique.len();
    (unique, removed)
}

/// Row accounting for one [`clean_reports`] run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanSummary {
    pub input_rows: usize,
    pub duplicates: usize,
    pub empty_rows: usize,
    pub zero_filled: usize,
}

/// Drops duplicate rows and rows without any damage value, then replaces
/// every remaining missing damage value with 0.
///
/// Whitespace stripping happens when rows are read, since every cell is
/// trimmed before it is parsed.
#[tracing::instrument(skip_all, fields(rows = reports.len()))]
pub fn clean_reports(reports: Vec<Report>) -> (Vec<Report>, CleanSummary) {
    let input_rows = reports.len();
    let (unique, duplicates) = dedupe(reports);

    let (mut kept, empty): (Vec<Report>, Vec<Report>) =
        unique.into_iter().partition(Report::has_any_damage);

    let mut zero_filled = 0;
    for report in kept.iter_mut() {
        for field in DamageField::ALL {
            let slot = report.slot(field);
            if slot.is_none() {
                *slot = Some(0.0);
                zero_filled += 1;
            }
        }
    }

    let summary = CleanSummary {
        input_rows,
        duplicates,
        empty_rows: empty.len(),
        zero_filled,
    };
    info!(
        input_rows,
        duplicates,
        empty_rows = summary.empty_rows,
        zero_filled,
        output_rows = kept.len(),
        "Reports cleaned"
    );

    (kept, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::parse_time;

    fn report(location: u32, time: &str) -> Report {
        Report::new(location, parse_time(time).unwrap())
    }

    #[test]
    fn test_fill_single_observed_value() {
        let mut reports = vec![
            report(1, "06/04/2020 00:00").with(DamageField::ShakeIntensity, 5.0),
            report(1, "06/04/2020 00:05"),
        ];
        fill_location_median(&mut reports);
        assert_eq!(reports[1].get(DamageField::ShakeIntensity), Some(5.0));
    }

    #[test]
    fn test_fill_uses_own_group_median() {
        let mut reports = vec![
            report(1, "06/04/2020 00:00").with(DamageField::Power, 1.0),
            report(1, "06/04/2020 00:01").with(DamageField::Power, 3.0),
            report(1, "06/04/2020 00:02"),
            report(2, "06/04/2020 00:03").with(DamageField::Power, 10.0),
            report(2, "06/04/2020 00:04"),
        ];
        fill_location_median(&mut reports);
        assert_eq!(reports[2].get(DamageField::Power), Some(2.0));
        assert_eq!(reports[4].get(DamageField::Power), Some(10.0));
    }

    #[test]
    fn test_fill_all_missing_group_stays_missing() {
        let mut reports = vec![
            report(3, "06/04/2020 00:00"),
            report(3, "06/04/2020 00:05"),
            report(4, "06/04/2020 00:05").with(DamageField::Medical, 2.0),
        ];
        let filled = fill_location_median(&mut reports);
        assert_eq!(filled, 0);
        assert!(reports[..2].iter().all(|r| r.missing_count() == 6));
    }

    #[test]
    fn test_fill_leaves_no_gaps_where_group_observed() {
        let mut reports = vec![
            report(1, "06/04/2020 00:00").with(DamageField::Medical, 4.0),
            report(1, "06/04/2020 00:01"),
            report(2, "06/04/2020 00:02"),
        ];
        fill_location_median(&mut reports);
        for r in &reports {
            let group_observed = r.location == 1;
            assert_eq!(r.get(DamageField::Medical).is_some(), group_observed);
        }
    }

    #[test]
    fn test_daily_fill_separates_days() {
        let mut reports = vec![
            report(1, "06/04/2020 10:00").with(DamageField::Buildings, 2.0),
            report(1, "07/04/2020 10:00").with(DamageField::Buildings, 8.0),
            report(1, "07/04/2020 11:00"),
        ];
        fill_daily_location_median(&mut reports);
        assert_eq!(reports[2].get(DamageField::Buildings), Some(8.0));
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let a = report(1, "06/04/2020 00:00").with(DamageField::Power, 1.0);
        let b = report(2, "06/04/2020 00:00").with(DamageField::Power, 1.0);
        let (unique, removed) = dedupe(vec![a.clone(), b.clone(), a.clone(), a.clone()]);
        assert_eq!(removed, 2);
        assert_eq!(unique, vec![a, b]);
    }

    #[test]
    fn test_clean_reports_counts() {
        let full = report(1, "06/04/2020 00:00").with(DamageField::Power, 1.0);
        let empty = report(2, "06/04/2020 00:00");
        let input = vec![full.clone(), full.clone(), empty.clone(), empty];

        let (cleaned, summary) = clean_reports(input);
        assert_eq!(summary.input_rows, 4);
        assert_eq!(summary.duplicates, 2);
        assert_eq!(summary.empty_rows, 1);
        assert_eq!(summary.zero_filled, 5);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].get(DamageField::Medical), Some(0.0));
        assert_eq!(cleaned[0].get(DamageField::Power), Some(1.0));
    }
}
