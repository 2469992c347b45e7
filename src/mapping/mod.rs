//! Geographic mapping of district-level results.
//!
//! Boundary datasets are GeoJSON feature collections whose integer feature
//! `id` is the district ID. Results are joined onto features by that ID.

pub mod boundaries;
pub mod centroids;
pub mod scores;

use std::collections::{BTreeSet, HashMap};

use geojson::FeatureCollection;

use crate::reliability::ReliabilityRecord;
use crate::report::DamageProfile;

pub use boundaries::{attach_scores, feature_id, read_boundaries, retain_districts};
pub use centroids::{MappedProfile, map_centroids};
pub use scores::{ScoredProfile, damage_scores};

/// Restricts `boundaries` to the districts present in `profiles` and sets
/// each feature's `damage_score` to that district's shake intensity.
#[tracing::instrument(
    skip_all,
    fields(features = boundaries.features.len(), districts = profiles.len())
)]
pub fn filter_by_damage(
    boundaries: FeatureCollection,
    profiles: &[DamageProfile],
) -> FeatureCollection {
    let scores: HashMap<i64, Option<f64>> = profiles
        .iter()
        .map(|p| (i64::from(p.location), p.shake_intensity))
        .collect();
    let keep: BTreeSet<i64> = scores.keys().copied().collect();

    let mut filtered = retain_districts(boundaries, &keep);
    attach_scores(&mut filtered, "damage_score", &scores);
    filtered
}

/// Sets `damage_score` on every boundary feature; districts without a
/// score get 0.
#[tracing::instrument(skip_all, fields(features = boundaries.features.len()))]
pub fn update_with_damage(boundaries: &mut FeatureCollection, scored: &[ScoredProfile]) {
    let scores: HashMap<i64, Option<f64>> = scored
        .iter()
        .map(|s| (i64::from(s.profile.location), s.damage_score))
        .collect();
    attach_scores(boundaries, "damage_score", &scores);
}

/// Restricts `boundaries` to scored districts and sets each feature's
/// `reliability_score`.
#[tracing::instrument(
    skip_all,
    fields(features = boundaries.features.len(), districts = records.len())
)]
pub fn attach_reliability(
    boundaries: FeatureCollection,
    records: &[ReliabilityRecord],
) -> FeatureCollection {
    let scores: HashMap<i64, Option<f64>> = records
        .iter()
        .map(|r| (i64::from(r.location), r.reliability_score))
        .collect();
    let keep: BTreeSet<i64> = scores.keys().copied().collect();

    let mut filtered = retain_districts(boundaries, &keep);
    attach_scores(&mut filtered, "reliability_score", &scores);
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn boundaries(ids: &[i64]) -> FeatureCollection {
        let features: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| {
                json!({
                    "type": "Feature",
                    "id": id,
                    "properties": {},
                    "geometry": null
                })
            })
            .collect();
        let collection = json!({ "type": "FeatureCollection", "features": features });
        serde_json::from_value(collection).unwrap()
    }

    fn profile(location: u32, shake: Option<f64>) -> DamageProfile {
        DamageProfile::from_values(location, [shake, Some(1.0), None, None, None, None])
    }

    #[test]
    fn test_filter_by_damage_keeps_damage_locations_only() {
        let fc = boundaries(&[1, 2, 3, 500, 501]);
        let profiles = vec![
            profile(3, Some(4.0)),
            profile(1, None),
            profile(19, Some(2.0)),
        ];
        let filtered = filter_by_damage(fc, &profiles);

        let ids: Vec<Option<i64>> = filtered.features.iter().map(feature_id).collect();
        assert_eq!(ids, vec![Some(1), Some(3)]);
        assert_eq!(
            filtered.features[1].property("damage_score"),
            Some(&json!(4.0))
        );
        assert_eq!(
            filtered.features[0].property("damage_score"),
            Some(&serde_json::Value::Null)
        );
    }

    #[test]
    fn test_update_with_damage_keeps_every_feature() {
        let mut fc = boundaries(&[1, 2, 600]);
        let scored = damage_scores(vec![profile(1, Some(1.0)), profile(2, Some(5.0))]);
        update_with_damage(&mut fc, &scored);

        assert_eq!(fc.features.len(), 3);
        let values: Vec<_> = fc
            .features
            .iter()
            .map(|f| f.property("damage_score").cloned().unwrap())
            .collect();
        assert_eq!(values, vec![json!(0.0), json!(10.0), json!(0.0)]);
    }
}
