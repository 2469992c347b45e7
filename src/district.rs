//! Static reference data for the 19 St. Himark districts.

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// `(id, name, latitude, longitude)`; centroids are approximate, read off the city map.
const BUILTIN: [(u32, &str, f64, f64); 19] = [
    (1, "Palace Hills", 0.180, -119.970),
    (2, "Northwest", 0.185, -119.928),
    (3, "Old Town", 0.193, -119.870),
    (4, "Safe Town", 0.180, -119.810),
    (5, "Southwest", 0.120, -119.930),
    (6, "Downtown", 0.153, -119.925),
    (7, "Wilson Forest", 0.110, -119.727),
    (8, "Scenic Vista", 0.045, -119.755),
    (9, "Broadview", 0.058, -119.845),
    (10, "Chapparal", 0.055, -119.790),
    (11, "Terrapin Springs", 0.075, -119.769),
    (12, "Pepper Mill", 0.120, -119.760),
    (13, "Cheddarford", 0.115, -119.805),
    (14, "Easton", 0.160, -119.869),
    (15, "Weston", 0.160, -119.895),
    (16, "Southton", 0.132, -119.895),
    (17, "Oak Willow", 0.090, -119.842),
    (18, "East Parton", 0.130, -119.840),
    (19, "West Parton", 0.130, -119.870),
];

/// A named district with an optional centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub id: u32,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl District {
    /// `(latitude, longitude)` when both coordinates are known.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Lookup table from district ID to [`District`].
///
/// The built-in table covers the 19 exercise districts. A replacement can be
/// loaded from a JSON array on disk:
/// ```json
/// [
///   { "id": 1, "name": "Palace Hills", "latitude": 0.18, "longitude": -119.97 }
/// ]
/// ```
#[derive(Debug, Clone)]
pub struct DistrictTable {
    entries: BTreeMap<u32, District>,
}

impl DistrictTable {
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(id, name, lat, lon)| {
                (
                    *id,
                    District {
                        id: *id,
                        name: (*name).to_string(),
                        latitude: Some(*lat),
                        longitude: Some(*lon),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Loads the table from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading district table {}", path.display()))?;
        let districts: Vec<District> = serde_json::from_str(&content)
            .with_context(|| format!("parsing district table {}", path.display()))?;
        let table = Self::from_districts(districts);
        ensure!(
            !table.is_empty(),
            "district table {} is empty",
            path.display()
        );
        Ok(table)
    }

    pub fn from_districts(districts: impl IntoIterator<Item = District>) -> Self {
        let entries = districts.into_iter().map(|d| (d.id, d)).collect();
        Self { entries }
    }

    pub fn get(&self, id: u32) -> Option<&District> {
        self.entries.get(&id)
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.get(id).map(|d| d.name.as_str())
    }

    pub fn centroid(&self, id: u32) -> Option<(f64, f64)> {
        self.get(id).and_then(District::centroid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_builtin_covers_all_districts() {
        let table = DistrictTable::builtin();
        assert_eq!(table.len(), 19);
        assert!((1..=19).all(|id| table.get(id).is_some_and(|d| d.id == id)));
        assert!(table.get(0).is_none());
    }

    #[test]
    fn test_builtin_lookup() {
        let table = DistrictTable::builtin();
        assert_eq!(table.name(3), Some("Old Town"));
        assert_eq!(table.centroid(7), Some((0.110, -119.727)));
        assert_eq!(table.name(20), None);
        assert_eq!(table.centroid(0), None);
    }

    #[test]
    fn test_load_from_json() {
        let path = env::temp_dir().join("himark_prep_test_districts.json");
        fs::write(
            &path,
            r#"[{"id": 1, "name": "Uptown", "latitude": 1.5, "longitude": 2.5},
                {"id": 2, "name": "Nowhere", "latitude": null, "longitude": null}]"#,
        )
        .unwrap();

        let table = DistrictTable::load(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.name(1), Some("Uptown"));
        assert_eq!(table.centroid(1), Some((1.5, 2.5)));
        assert_eq!(table.centroid(2), None);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_empty_table_fails() {
        let path = env::temp_dir().join("himark_prep_test_empty_districts.json");
        fs::write(&path, "[]").unwrap();

        let err = DistrictTable::load(&path).unwrap_err();
        assert!(err.to_string().contains("is empty"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file_fails() {
        let path = env::temp_dir().join("himark_prep_test_no_such_table.json");
        assert!(DistrictTable::load(&path).is_err());
    }
}
