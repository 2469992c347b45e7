use serde::Serialize;
use tracing::warn;

use crate::district::DistrictTable;
use crate::report::DamageProfile;

/// A radar-chart row placed at its district's centroid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedProfile {
    #[serde(flatten)]
    pub profile: DamageProfile,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Attaches centroid coordinates by district ID. Unknown districts keep
/// `null` coordinates.
#[tracing::instrument(skip_all, fields(rows = profiles.len()))]
pub fn map_centroids(
    profiles: Vec<DamageProfile>,
    districts: &DistrictTable,
) -> Vec<MappedProfile> {
    profiles
        .into_iter()
        .map(|profile| {
            let centroid = districts.centroid(profile.location);
            if centroid.is_none() {
                warn!(location = profile.location, "No centroid for district");
            }
            MappedProfile {
                latitude: centroid.map(|(lat, _)| lat),
                longitude: centroid.map(|(_, lon)| lon),
                profile,
            }
        })
        .collect()
}
