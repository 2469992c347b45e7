//! Whole-period, per-district summaries.

use std::cmp::Reverse;

use serde::Serialize;
use tracing::warn;

use super::{Location, group_by, summarize};
use crate::district::DistrictTable;
use crate::report::{DamageProfile, Report};
use crate::stats::mean;

/// Number of reports received from one neighbourhood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportCount {
    pub location: u32,
    pub neighborhood: Option<String>,
    pub reports: usize,
}

/// Reports per district, most-reporting first; ties are ordered by district ID.
#[tracing::instrument(skip_all, fields(rows = reports.len()))]
pub fn report_counts(reports: &[Report], districts: &DistrictTable) -> Vec<ReportCount> {
    let mut counts: Vec<ReportCount> = group_by(reports, |r| r.location)
        .into_iter()
        .map(|(location, group)| {
            let neighborhood = districts.name(location).map(str::to_string);
            if neighborhood.is_none() {
                warn!(location, "Reports from an unknown district");
            }
            ReportCount {
                location,
                neighborhood,
                reports: group.len(),
            }
        })
        .collect();

    counts.sort_by_key(|c| (Reverse(c.reports), c.location));
    counts
}

/// Mean of every damage field per district, the radar-chart input.
#[tracing::instrument(skip_all, fields(rows = reports.len()))]
pub fn radar_profiles(reports: &[Report]) -> Vec<DamageProfile> {
    summarize(reports, |r| Location(r.location), mean)
        .into_iter()
        .map(|row| DamageProfile::from_values(row.key.0, row.values))
        .collect()
}
