//! Damage report records and the six damage-severity fields.

use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp format used by the report CSVs (`DD/MM/YYYY HH:MM`).
pub const REPORT_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";
/// Written instead of [`REPORT_TIME_FORMAT`] when a timestamp has seconds.
pub const REPORT_TIME_SECONDS_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Formats accepted when reading a `time` cell, tried in order.
const ACCEPTED_TIME_FORMATS: &[&str] = &[
    REPORT_TIME_FORMAT,
    REPORT_TIME_SECONDS_FORMAT,
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// One of the six damage-severity columns carried by every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DamageField {
    ShakeIntensity,
    SewerAndWater,
    Power,
    RoadsAndBridges,
    Medical,
    Buildings,
}

impl DamageField {
    /// All fields, in the column order used by every derived output.
    pub const ALL: [DamageField; 6] = [
        DamageField::ShakeIntensity,
        DamageField::SewerAndWater,
        DamageField::Power,
        DamageField::RoadsAndBridges,
        DamageField::Medical,
        DamageField::Buildings,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DamageField::ShakeIntensity => "shake_intensity",
            DamageField::SewerAndWater => "sewer_and_water",
            DamageField::Power => "power",
            DamageField::RoadsAndBridges => "roads_and_bridges",
            DamageField::Medical => "medical",
            DamageField::Buildings => "buildings",
        }
    }

    /// Position of this field inside [`DamageField::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single citizen/sensor observation.
///
/// Field order matches the column order of `mc1-reports-data.csv`, so a
/// cleaned file keeps the layout of its source. Columns are matched by header
/// name when reading, so inputs with a different order are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(with = "report_time")]
    pub time: NaiveDateTime,
    pub sewer_and_water: Option<f64>,
    pub power: Option<f64>,
    pub roads_and_bridges: Option<f64>,
    pub medical: Option<f64>,
    pub buildings: Option<f64>,
    pub shake_intensity: Option<f64>,
    pub location: u32,
}

impl Report {
    pub fn new(location: u32, time: NaiveDateTime) -> Self {
        Report {
            time,
            sewer_and_water: None,
            power: None,
            roads_and_bridges: None,
            medical: None,
            buildings: None,
            shake_intensity: None,
            location,
        }
    }

    /// Builder-style setter, mostly useful for constructing fixtures.
    pub fn with(mut self, field: DamageField, value: f64) -> Self {
        *self.slot(field) = Some(value);
        self
    }

    pub fn get(&self, field: DamageField) -> Option<f64> {
        match field {
            DamageField::ShakeIntensity => self.shake_intensity,
            DamageField::SewerAndWater => self.sewer_and_water,
            DamageField::Power => self.power,
            DamageField::RoadsAndBridges => self.roads_and_bridges,
            DamageField::Medical => self.medical,
            DamageField::Buildings => self.buildings,
        }
    }

    pub fn slot(&mut self, field: DamageField) -> &mut Option<f64> {
        match field {
            DamageField::ShakeIntensity => &mut self.shake_intensity,
            DamageField::SewerAndWater => &mut self.sewer_and_water,
            DamageField::Power => &mut self.power,
            DamageField::RoadsAndBridges => &mut self.roads_and_bridges,
            DamageField::Medical => &mut self.medical,
            DamageField::Buildings => &mut self.buildings,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.time.date()
    }

    /// Number of damage fields with no value.
    pub fn missing_count(&self) -> usize {
        DamageField::ALL
            .iter()
            .filter(|f| self.get(**f).is_none())
            .count()
    }

    pub fn has_any_damage(&self) -> bool {
        self.missing_count() < DamageField::ALL.len()
    }

    /// Hashable identity used to detect exact duplicate rows.
    pub fn identity(&self) -> (NaiveDateTime, u32, [Option<u64>; 6]) {
        (
            self.time,
            self.location,
            DamageField::ALL.map(|f| self.get(f).map(f64::to_bits)),
        )
    }
}

/// Per-location damage values, the record shape of `radar_chart_data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageProfile {
    pub location: u32,
    pub sewer_and_water: Option<f64>,
    pub power: Option<f64>,
    pub roads_and_bridges: Option<f64>,
    pub medical: Option<f64>,
    pub buildings: Option<f64>,
    pub shake_intensity: Option<f64>,
}

impl DamageProfile {
    /// Builds a profile from values ordered like [`DamageField::ALL`].
    pub fn from_values(location: u32, values: [Option<f64>; 6]) -> Self {
        DamageProfile {
            location,
            shake_intensity: values[DamageField::ShakeIntensity.index()],
            sewer_and_water: values[DamageField::SewerAndWater.index()],
            power: values[DamageField::Power.index()],
            roads_and_bridges: values[DamageField::RoadsAndBridges.index()],
            medical: values[DamageField::Medical.index()],
            buildings: values[DamageField::Buildings.index()],
        }
    }

    pub fn get(&self, field: DamageField) -> Option<f64> {
        match field {
            DamageField::ShakeIntensity => self.shake_intensity,
            DamageField::SewerAndWater => self.sewer_and_water,
            DamageField::Power => self.power,
            DamageField::RoadsAndBridges => self.roads_and_bridges,
            DamageField::Medical => self.medical,
            DamageField::Buildings => self.buildings,
        }
    }

    /// Sum of all damage fields, missing values counting as zero.
    pub fn total(&self) -> f64 {
        DamageField::ALL
            .iter()
            .filter_map(|f| self.get(*f))
            .sum()
    }
}

/// Parses a report timestamp in any of the accepted formats.
///
/// # Errors
///
/// Returns an error if the text matches none of the accepted formats.
pub fn parse_time(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    ACCEPTED_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .ok_or_else(|| anyhow!("unrecognized report timestamp {text:?}"))
}

pub(crate) mod report_time {
    use chrono::{NaiveDateTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::{REPORT_TIME_FORMAT, REPORT_TIME_SECONDS_FORMAT};

    /// Minute precision unless the timestamp carries seconds, which are kept.
    pub fn serialize<S: Serializer>(time: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        let format = if time.second() == 0 {
            REPORT_TIME_FORMAT
        } else {
            REPORT_TIME_SECONDS_FORMAT
        };
        s.collect_str(&time.format(format))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(d)?;
        super::parse_time(&text).map_err(D::Error::custom)
    }
}
