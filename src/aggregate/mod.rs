//! Grouped descriptive statistics over damage reports.
//!
//! Each public transform corresponds to one derived dataset consumed by the
//! dashboard. Groups are keyed by district, calendar day, and/or fixed-width
//! time bucket; only groups with at least one report appear in the output,
//! ordered by key.

pub mod bucket;
pub mod counts;
pub mod daily;
pub mod spread;
pub mod windows;

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

use crate::output::{CsvTable, format_cell};
use crate::report::{DamageField, Report};

pub use bucket::Bucket;

/// Output format of date key columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Output format of bucket key columns.
pub const BUCKET_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Key of a statistics group, able to render itself as leading CSV columns.
pub trait GroupKey: Ord + Clone {
    /// Header names for the key; `time_column` names the bucket column, if any.
    fn columns(time_column: &str) -> Vec<String>;
    fn cells(&self) -> Vec<String>;
}

/// Reports of one district.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Location(pub u32);

/// Reports of one district on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DayLocation {
    pub date: NaiveDate,
    pub location: u32,
}

/// Reports of one district within one time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocationBucket {
    pub location: u32,
    pub start: NaiveDateTime,
}

/// Reports of every district within one time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeBucket(pub NaiveDateTime);

impl GroupKey for Location {
    fn columns(_: &str) -> Vec<String> {
        vec!["location".into()]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.0.to_string()]
    }
}

impl GroupKey for DayLocation {
    fn columns(_: &str) -> Vec<String> {
        vec!["date".into(), "location".into()]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.date.format(DATE_FORMAT).to_string(),
            self.location.to_string(),
        ]
    }
}

impl GroupKey for LocationBucket {
    fn columns(time_column: &str) -> Vec<String> {
        vec!["location".into(), time_column.into()]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.location.to_string(),
            self.start.format(BUCKET_FORMAT).to_string(),
        ]
    }
}

impl GroupKey for TimeBucket {
    fn columns(time_column: &str) -> Vec<String> {
        vec![time_column.into()]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.0.format(BUCKET_FORMAT).to_string()]
    }
}

/// One statistic per damage field for a single group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStat<K> {
    pub key: K,
    /// Indexed like [`DamageField::ALL`].
    pub values: [Option<f64>; 6],
}

impl<K> GroupStat<K> {
    pub fn get(&self, field: DamageField) -> Option<f64> {
        self.values[field.index()]
    }
}

/// Partitions reports by `key`, preserving input order within each group.
pub fn group_by<'a, K, F>(reports: &'a [Report], key: F) -> BTreeMap<K, Vec<&'a Report>>
where
    K: Ord,
    F: Fn(&Report) -> K,
{
    let mut groups: BTreeMap<K, Vec<&Report>> = BTreeMap::new();
    for report in reports {
        groups.entry(key(report)).or_default().push(report);
    }
    groups
}

/// Observed (non-missing) values of `field` within a group.
pub fn field_values(group: &[&Report], field: DamageField) -> Vec<f64> {
    group.iter().filter_map(|r| r.get(field)).collect()
}

/// Applies `stat` to every damage field of every group.
pub fn summarize<K, F, S>(reports: &[Report], key: F, stat: S) -> Vec<GroupStat<K>>
where
    K: Ord,
    F: Fn(&Report) -> K,
    S: Fn(&[f64]) -> Option<f64>,
{
    group_by(reports, key)
        .into_iter()
        .map(|(key, group)| GroupStat {
            key,
            values: DamageField::ALL.map(|f| stat(&field_values(&group, f))),
        })
        .collect()
}

/// Damage field column names with an optional suffix, e.g. `power_min`.
pub fn field_columns(suffix: &str) -> Vec<String> {
    DamageField::ALL
        .iter()
        .map(|f| format!("{}{}", f.name(), suffix))
        .collect()
}

/// Renders grouped statistics as a table: key columns, then one column per field.
pub fn stat_table<K: GroupKey>(rows: &[GroupStat<K>], time_column: &str) -> CsvTable {
    let mut header = K::columns(time_column);
    header.extend(field_columns(""));

    let mut table = CsvTable::new(header);
    for row in rows {
        let mut cells = row.key.cells();
        cells.extend(row.values.iter().map(|v| format_cell(*v)));
        table.push(cells);
    }
    table
}
