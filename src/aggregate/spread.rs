//! Spread of reported damage: standard deviations and value ranges.

use super::{
    Bucket, GroupKey, GroupStat, LocationBucket, TimeBucket, field_columns, field_values, group_by,
    summarize,
};
use crate::output::{CsvTable, format_cell};
use crate::report::{DamageField, Report};
use crate::stats::{max, min, sample_stddev};

/// Sample standard deviation per `(location, 5-minute bucket)`.
///
/// Buckets with a single report for a field have no deviation for it.
#[tracing::instrument(skip_all, fields(rows = reports.len()))]
pub fn uncertainty(reports: &[Report]) -> Vec<GroupStat<LocationBucket>> {
    let bucket = Bucket::FiveMinutes;
    summarize(
        reports,
        |r| LocationBucket {
            location: r.location,
            start: bucket.floor(r.time),
        },
        sample_stddev,
    )
}

/// Sample standard deviation per 5-minute bucket, across all districts.
#[tracing::instrument(skip_all, fields(rows = reports.len()))]
pub fn uncertainty_by_time(reports: &[Report]) -> Vec<GroupStat<TimeBucket>> {
    let bucket = Bucket::FiveMinutes;
    summarize(reports, |r| TimeBucket(bucket.floor(r.time)), sample_stddev)
}

/// Lowest and highest value of every damage field in one group.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeRow {
    pub key: LocationBucket,
    pub min: [Option<f64>; 6],
    pub max: [Option<f64>; 6],
}

impl RangeRow {
    pub fn range(&self, field: DamageField) -> (Option<f64>, Option<f64>) {
        (self.min[field.index()], self.max[field.index()])
    }
}

/// Minimum and maximum per `(location, 30-minute bucket)`.
#[tracing::instrument(skip_all, fields(rows = reports.len()))]
pub fn minmax(reports: &[Report]) -> Vec<RangeRow> {
    let bucket = Bucket::ThirtyMinutes;
    group_by(reports, |r| LocationBucket {
        location: r.location,
        start: bucket.floor(r.time),
    })
    .into_iter()
    .map(|(key, group)| RangeRow {
        key,
        min: DamageField::ALL.map(|f| min(&field_values(&group, f))),
        max: DamageField::ALL.map(|f| max(&field_values(&group, f))),
    })
    .collect()
}

/// Key columns, then `<field>_min` columns, then `<field>_max` columns.
pub fn minmax_table(rows: &[RangeRow]) -> CsvTable {
    let mut header = LocationBucket::columns(&Bucket::ThirtyMinutes.column());
    header.extend(field_columns("_min"));
    header.extend(field_columns("_max"));

    let mut table = CsvTable::new(header);
    for row in rows {
        let mut cells = row.key.cells();
        cells.extend(row.min.iter().map(|v| format_cell(*v)));
        cells.extend(row.max.iter().map(|v| format_cell(*v)));
        table.push(cells);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::parse_time;

    fn report(location: u32, time: &str) -> Report {
        Report::new(location, parse_time(time).unwrap())
    }

    #[test]
    fn test_uncertainty_needs_two_values() {
        let reports = vec![
            report(1, "06/04/2020 10:00").with(DamageField::Medical, 2.0),
            report(1, "06/04/2020 10:03").with(DamageField::Medical, 4.0),
            report(2, "06/04/2020 10:03").with(DamageField::Medical, 4.0),
        ];
        let rows = uncertainty(&reports);
        assert_eq!(rows.len(), 2);
        let sd = rows[0].get(DamageField::Medical).unwrap();
        assert!((sd - std::f64::consts::SQRT_2).abs() < 1e-12);
        assert_eq!(rows[1].get(DamageField::Medical), None);
    }

    #[test]
    fn test_uncertainty_by_time_pools_districts() {
        let reports = vec![
            report(1, "06/04/2020 10:00").with(DamageField::Medical, 2.0),
            report(2, "06/04/2020 10:03").with(DamageField::Medical, 4.0),
        ];
        let rows = uncertainty_by_time(&reports);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].get(DamageField::Medical).is_some());
    }

    #[test]
    fn test_minmax_per_half_hour() {
        let reports = vec![
            report(5, "06/04/2020 10:00").with(DamageField::Buildings, 3.0),
            report(5, "06/04/2020 10:29").with(DamageField::Buildings, 7.0),
            report(5, "06/04/2020 10:30").with(DamageField::Buildings, 1.0),
        ];
        let rows = minmax(&reports);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].range(DamageField::Buildings),
            (Some(3.0), Some(7.0))
        );
        assert_eq!(
            rows[1].range(DamageField::Buildings),
            (Some(1.0), Some(1.0))
        );
        assert_eq!(rows[0].range(DamageField::Power), (None, None));
    }

    #[test]
    fn test_minmax_table_columns() {
        let only = report(5, "06/04/2020 10:00").with(DamageField::Buildings, 3.0);
        let reports = vec![only];
        let table = minmax_table(&minmax(&reports));
        assert_eq!(table.header().len(), 2 + 12);
        assert_eq!(table.header()[1], "time_30min");
        let col = table.column("buildings_max").unwrap();
        assert_eq!(table.rows()[0][col], "3.0");
        assert!(table.column("shake_intensity_min").is_some());
    }
}
