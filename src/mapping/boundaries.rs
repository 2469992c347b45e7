//! District boundary collections: reading, filtering, and score attachment.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection};
use tracing::{debug, info};

use crate::input::read_json;

/// Reads a GeoJSON `FeatureCollection` from disk.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_boundaries(path: &Path) -> Result<FeatureCollection> {
    let collection: FeatureCollection =
        read_json(path).with_context(|| format!("reading boundaries from {}", path.display()))?;
    info!(features = collection.features.len(), "Boundaries loaded");
    Ok(collection)
}

/// Integer ID of a feature. String IDs are not district IDs and yield `None`.
pub fn feature_id(feature: &Feature) -> Option<i64> {
    match &feature.id {
        Some(Id::Number(n)) => n.as_i64(),
        _ => None,
    }
}

/// Keeps exactly the features whose ID is in `keep`, in their original order.
pub fn retain_districts(collection: FeatureCollection, keep: &BTreeSet<i64>) -> FeatureCollection {
    let before = collection.features.len();
    let features: Vec<Feature> = collection
        .features
        .into_iter()
        .filter(|f| feature_id(f).is_some_and(|id| keep.contains(&id)))
        .collect();
    info!(before, after = features.len(), "Boundaries filtered");

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Sets `property` on every feature from `scores`, keyed by feature ID.
///
/// Features without an entry get 0. An entry holding `None` is written as `null`.
pub fn attach_scores(
    collection: &mut FeatureCollection,
    property: &str,
    scores: &HashMap<i64, Option<f64>>,
) {
    let mut defaulted = 0;
    for feature in collection.features.iter_mut() {
        let score = match feature_id(feature).and_then(|id| scores.get(&id)) {
            Some(score) => *score,
            None => {
                defaulted += 1;
                Some(0.0)
            }
        };
        feature.set_property(property, score);
    }
    debug!(property, defaulted, "Scores attached");
}
