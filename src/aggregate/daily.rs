//! Per-day, per-district statistics restricted to a date window.

use tracing::info;

use super::{DayLocation, GroupStat, field_columns, field_values, group_by, summarize};
use crate::clean::fill_daily_location_median;
use crate::config::DateWindow;
use crate::output::{CsvTable, format_cell};
use crate::report::{DamageField, Report};
use crate::stats::{FiveNumber, mean};

/// Box-plot summary of every damage field for one `(date, location)` group.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxplotGroup {
    pub key: DayLocation,
    /// Indexed like [`DamageField::ALL`]; `None` when the field has no values.
    pub fields: [Option<FiveNumber>; 6],
}

impl BoxplotGroup {
    pub fn get(&self, field: DamageField) -> Option<&FiveNumber> {
        self.fields[field.index()].as_ref()
    }
}

fn within(reports: &[Report], window: DateWindow) -> Vec<Report> {
    let kept: Vec<Report> = reports
        .iter()
        .filter(|r| window.contains(r.date()))
        .cloned()
        .collect();
    info!(
        kept = kept.len(),
        dropped = reports.len() - kept.len(),
        start = %window.start,
        end = %window.end,
        "Applied date window"
    );
    kept
}

/// Box-plot statistics per `(date, location)` within `window`.
///
/// Missing values are first filled with their own `(date, location)` median,
/// so the summaries describe the imputed series.
#[tracing::instrument(skip_all, fields(rows = reports.len()))]
pub fn boxplot(reports: &[Report], window: DateWindow) -> Vec<BoxplotGroup> {
    let mut kept = within(reports, window);
    fill_daily_location_median(&mut kept);

    group_by(&kept, |r| DayLocation {
        date: r.date(),
        location: r.location,
    })
    .into_iter()
    .map(|(key, group)| BoxplotGroup {
        key,
        fields: DamageField::ALL.map(|f| FiveNumber::of(&field_values(&group, f))),
    })
    .collect()
}

/// Long-form box-plot table: one row per group and summary statistic.
pub fn boxplot_table(groups: &[BoxplotGroup]) -> CsvTable {
    let mut header = vec![
        "date".to_string(),
        "location".to_string(),
        "stat".to_string(),
    ];
    header.extend(field_columns(""));

    let mut table = CsvTable::new(header);
    for group in groups {
        let date = group.key.date.format(super::DATE_FORMAT).to_string();
        for (i, label) in FiveNumber::LABELS.iter().enumerate() {
            let mut cells = vec![
                date.clone(),
                group.key.location.to_string(),
                label.to_string(),
            ];
            cells.extend(
                group
                    .fields
                    .iter()
                    .map(|summary| format_cell(summary.map(|s| s.values()[i]))),
            );
            table.push(cells);
        }
    }
    table
}

/// Mean of every damage field per `(date, location)` within `window`.
#[tracing::instrument(skip_all, fields(rows = reports.len()))]
pub fn daily_mean(reports: &[Report], window: DateWindow) -> Vec<GroupStat<DayLocation>> {
    let kept = within(reports, window);
    summarize(
        &kept,
        |r| DayLocation {
            date: r.date(),
            location: r.location,
        },
        mean,
    )
}
