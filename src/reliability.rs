//! Per-district reliability metrics.
//!
//! A district's reports are considered less reliable the more values they
//! leave missing and the more they disagree with each other. Reporting
//! cadence is computed alongside for context but does not enter the score.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregate::{field_values, group_by};
use crate::district::DistrictTable;
use crate::report::{DamageField, Report};
use crate::stats::{mean, normalize, pct, sample_stddev};

/// Raw metrics for one district.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistrictMetrics {
    /// Percentage (0-100) of damage values left missing.
    pub missing_data_rate: f64,
    /// Mean gap in minutes between consecutive reports.
    pub report_frequency: Option<f64>,
    /// Mean of the per-field sample standard deviations.
    pub damage_variability: Option<f64>,
}

impl DistrictMetrics {
    pub fn of(group: &[&Report]) -> Self {
        let missing: usize = group.iter().map(|r| r.missing_count()).sum();
        let missing_data_rate = pct(missing, group.len() * DamageField::ALL.len());

        let deviations: Vec<f64> = DamageField::ALL
            .iter()
            .filter_map(|f| sample_stddev(&field_values(group, *f)))
            .collect();

        DistrictMetrics {
            missing_data_rate,
            report_frequency: mean_gap_minutes(group),
            damage_variability: mean(&deviations),
        }
    }

    /// Composite score; `None` when variability is undefined.
    pub fn reliability_score(&self) -> Option<f64> {
        self.damage_variability
            .map(|v| reliability_score(self.missing_data_rate, v))
    }
}

/// `1 / (1 + missing_rate + variability)`: 1 for complete, consistent
/// reports, decreasing strictly as either penalty grows.
pub fn reliability_score(missing_rate: f64, variability: f64) -> f64 {
    1.0 / (1.0 + missing_rate + variability)
}

/// Mean gap in minutes between consecutive reports, in time order.
fn mean_gap_minutes(group: &[&Report]) -> Option<f64> {
    let mut times: Vec<_> = group.iter().map(|r| r.time).collect();
    times.sort();
    let gaps: Vec<f64> = times
        .windows(2)
        .map(|w| (w[1] - w[0]).num_seconds() as f64 / 60.0)
        .collect();
    mean(&gaps)
}

fn normalize_metric<G, S>(records: &mut [ReliabilityRecord], metric: &str, get: G, set: S)
where
    G: Fn(&ReliabilityRecord) -> Option<f64>,
    S: Fn(&mut ReliabilityRecord, Option<f64>),
{
    let raw: Vec<Option<f64>> = records.iter().map(&get).collect();
    let scaled = normalize(&raw);
    if !records.is_empty() && scaled.iter().all(Option::is_none) {
        warn!(
            metric,
            "Metric is identical across districts, normalized values left missing"
        );
    }
    for (record, value) in records.iter_mut().zip(scaled) {
        set(record, value);
    }
}

/// One row of `processed_neighborhood_reliability.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityRecord {
    pub location: u32,
    pub missing_data_rate: f64,
    pub report_frequency: Option<f64>,
    pub damage_variability: Option<f64>,
    pub reliability_score: Option<f64>,
    pub neighborhood: Option<String>,
    pub missing_data_rate_norm: Option<f64>,
    pub report_frequency_norm: Option<f64>,
    pub damage_variability_norm: Option<f64>,
    pub reliability_score_norm: Option<f64>,
}

/// Scores every district present in `reports`, normalizing each metric
/// across districts into `[0, 1]`.
///
/// A metric whose values are identical across all districts cannot be
/// normalized; its `_norm` column is left missing and a warning is logged.
#[tracing::instrument(skip_all, fields(rows = reports.len()))]
pub fn score_districts(reports: &[Report], districts: &DistrictTable) -> Vec<ReliabilityRecord> {
    let mut records: Vec<ReliabilityRecord> = group_by(reports, |r| r.location)
        .into_iter()
        .map(|(location, group)| {
            let metrics = DistrictMetrics::of(&group);
            ReliabilityRecord {
                location,
                missing_data_rate: metrics.missing_data_rate,
                report_frequency: metrics.report_frequency,
                damage_variability: metrics.damage_variability,
                reliability_score: metrics.reliability_score(),
                neighborhood: districts.name(location).map(str::to_string),
                missing_data_rate_norm: None,
                report_frequency_norm: None,
                damage_variability_norm: None,
                reliability_score_norm: None,
            }
        })
        .collect();

    normalize_metric(
        &mut records,
        "missing_data_rate",
        |r| Some(r.missing_data_rate),
        |r, v| r.missing_data_rate_norm = v,
    );
    normalize_metric(
        &mut records,
        "report_frequency",
        |r| r.report_frequency,
        |r, v| r.report_frequency_norm = v,
    );
    normalize_metric(
        &mut records,
        "damage_variability",
        |r| r.damage_variability,
        |r, v| r.damage_variability_norm = v,
    );
    normalize_metric(
        &mut records,
        "reliability_score",
        |r| r.reliability_score,
        |r, v| r.reliability_score_norm = v,
    );

    info!(districts = records.len(), "Reliability scored");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::parse_time;

    fn report(location: u32, time: &str) -> Report {
        Report::new(location, parse_time(time).unwrap())
    }

    fn full(location: u32, time: &str, value: f64) -> Report {
        DamageField::ALL
            .iter()
            .fold(report(location, time), |r, f| r.with(*f, value))
    }

    #[test]
    fn test_score_bounds_and_monotonic() {
        assert_eq!(reliability_score(0.0, 0.0), 1.0);
        let base = reliability_score(10.0, 1.5);
        assert!(base > 0.0 && base < 1.0);
        assert!(reliability_score(11.0, 1.5) < base);
        assert!(reliability_score(10.0, 2.0) < base);
    }

    #[test]
    fn test_metrics_missing_rate() {
        let a = report(1, "06/04/2020 10:00").with(DamageField::Power, 1.0);
        let b = report(1, "06/04/2020 10:10").with(DamageField::Power, 3.0);
        let metrics = DistrictMetrics::of(&[&a, &b]);
        // 10 of 12 values missing
        assert!((metrics.missing_data_rate - 1000.0 / 12.0).abs() < 1e-9);
        assert_eq!(metrics.report_frequency, Some(10.0));
        assert_eq!(metrics.damage_variability, Some(std::f64::consts::SQRT_2));
    }

    #[test]
    fn test_metrics_gaps_sorted_by_time() {
        let a = full(1, "06/04/2020 10:30", 1.0);
        let b = full(1, "06/04/2020 10:00", 1.0);
        let c = full(1, "06/04/2020 10:10", 1.0);
        let metrics = DistrictMetrics::of(&[&a, &b, &c]);
        assert_eq!(metrics.report_frequency, Some(15.0));
        assert_eq!(metrics.damage_variability, Some(0.0));
        assert_eq!(metrics.reliability_score(), Some(1.0));
    }

    #[test]
    fn test_single_report_has_undefined_spread() {
        let a = full(1, "06/04/2020 10:00", 1.0);
        let metrics = DistrictMetrics::of(&[&a]);
        assert_eq!(metrics.report_frequency, None);
        assert_eq!(metrics.damage_variability, None);
        assert_eq!(metrics.reliability_score(), None);
    }

    #[test]
    fn test_score_districts_normalizes() {
        let reports = vec![
            full(1, "06/04/2020 10:00", 1.0),
            full(1, "06/04/2020 10:10", 3.0),
            full(2, "06/04/2020 10:00", 1.0),
            full(2, "06/04/2020 10:25", 1.0),
            report(3, "06/04/2020 10:00").with(DamageField::Power, 5.0),
            report(3, "06/04/2020 10:40").with(DamageField::Power, 9.0),
        ];
        let records = score_districts(&reports, &DistrictTable::builtin());
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].neighborhood.as_deref(), Some("Palace Hills"));

        for record in &records {
            let score = record.reliability_score.unwrap();
            assert!(score > 0.0 && score <= 1.0);
        }

        let norms: Vec<f64> = records
            .iter()
            .map(|r| r.reliability_score_norm.unwrap())
            .collect();
        let lo = norms.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = norms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(lo, 0.0);
        assert_eq!(hi, 1.0);

        // district 2 is complete and perfectly consistent
        assert_eq!(records[1].reliability_score, Some(1.0));
        assert_eq!(records[1].reliability_score_norm, Some(1.0));
        assert_eq!(records[1].report_frequency_norm, Some(0.5));
    }

    #[test]
    fn test_identical_metric_is_not_normalized() {
        let reports = vec![
            full(1, "06/04/2020 10:00", 1.0),
            full(1, "06/04/2020 10:05", 2.0),
            full(2, "06/04/2020 10:00", 1.0),
            full(2, "06/04/2020 10:05", 3.0),
        ];
        let records = score_districts(&reports, &DistrictTable::builtin());
        // both districts are complete and report every 5 minutes
        assert!(records.iter().all(|r| r.missing_data_rate_norm.is_none()));
        assert!(records.iter().all(|r| r.report_frequency_norm.is_none()));
        assert_eq!(records[0].damage_variability_norm, Some(0.0));
        assert_eq!(records[1].damage_variability_norm, Some(1.0));
    }
}
