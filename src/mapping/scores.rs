use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::report::DamageProfile;
use crate::stats::min_max_scale;

/// Upper bound of the damage score scale.
pub const DAMAGE_SCORE_MAX: f64 = 10.0;

/// A radar-chart row with its combined damage score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProfile {
    #[serde(flatten)]
    pub profile: DamageProfile,
    pub damage_score: Option<f64>,
}

/// Scores each profile by the sum of its damage fields, min-max scaled to
/// `[0, 10]` across all profiles.
///
/// If every sum is identical there is no spread to scale and every score is 0.
#[tracing::instrument(skip_all, fields(districts = profiles.len()))]
pub fn damage_scores(profiles: Vec<DamageProfile>) -> Vec<ScoredProfile> {
    let totals: Vec<Option<f64>> = profiles.iter().map(|p| Some(p.total())).collect();
    let mut scaled = min_max_scale(&totals, 0.0, DAMAGE_SCORE_MAX);

    if !profiles.is_empty() && scaled.iter().all(Option::is_none) {
        warn!(
            "Damage totals are identical across districts, scoring all as 0"
        );
        scaled = vec![Some(0.0); profiles.len()];
    }

    profiles
        .into_iter()
        .zip(scaled)
        .map(|(profile, damage_score)| ScoredProfile {
            profile,
            damage_score,
        })
        .collect()
}
