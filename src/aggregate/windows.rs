//! Mean damage per district over fixed-width time buckets.

use super::{Bucket, GroupStat, LocationBucket, summarize};
use crate::report::Report;
use crate::stats::mean;

/// Mean of every damage field per `(location, bucket)`.
pub fn bucket_mean(reports: &[Report], bucket: Bucket) -> Vec<GroupStat<LocationBucket>> {
    summarize(
        reports,
        |r| LocationBucket {
            location: r.location,
            start: bucket.floor(r.time),
        },
        mean,
    )
}

/// Heatmap cells: mean damage per district over 10-minute buckets.
#[tracing::instrument(skip_all, fields(rows = reports.len()))]
pub fn heatmap(reports: &[Report]) -> Vec<GroupStat<LocationBucket>> {
    bucket_mean(reports, Bucket::TenMinutes)
}

/// Average damage per district over 5-minute buckets.
#[tracing::instrument(skip_all, fields(rows = reports.len()))]
pub fn avg_damage(reports: &[Report]) -> Vec<GroupStat<LocationBucket>> {
    bucket_mean(reports, Bucket::FiveMinutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{DamageField, parse_time};

    fn report(location: u32, time: &str, power: f64) -> Report {
        Report::new(location, parse_time(time).unwrap()).with(DamageField::Power, power)
    }

    #[test]
    fn test_avg_damage_buckets() {
        let reports = vec![
            report(1, "06/04/2020 10:01", 2.0),
            report(1, "06/04/2020 10:04", 4.0),
            report(1, "06/04/2020 10:06", 8.0),
        ];
        let rows = avg_damage(&reports);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key.start, parse_time("06/04/2020 10:00").unwrap());
        assert_eq!(rows[0].get(DamageField::Power), Some(3.0));
        assert_eq!(rows[1].get(DamageField::Power), Some(8.0));
    }

    #[test]
    fn test_heatmap_uses_ten_minute_buckets() {
        let reports = vec![
            report(1, "06/04/2020 10:01", 2.0),
            report(1, "06/04/2020 10:09", 4.0),
            report(2, "06/04/2020 10:09", 1.0),
        ];
        let rows = heatmap(&reports);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key.location, 1);
        assert_eq!(rows[0].get(DamageField::Power), Some(3.0));
    }

    #[test]
    fn test_empty_buckets_are_absent() {
        let reports = vec![
            report(1, "06/04/2020 10:00", 1.0),
            report(1, "06/04/2020 12:00", 1.0),
        ];
        assert_eq!(avg_damage(&reports).len(), 2);
    }
}
