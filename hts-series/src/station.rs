//! Station kinds and the numeric id namespaces reserved for each of them.
//!
//! Station ids are allocated inside a per-kind range. Some kinds share a
//! namespace (weather stations and water level gauges both draw from the
//! `1xx xxx` block), so the mapping is an explicit lookup table rather than an
//! enum discriminant.

use crate::error::SeriesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A contiguous block of station ids: `start ..= start + width - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdRange {
    pub start: u64,
    pub width: u64,
}

impl IdRange {
    pub fn last(&self) -> u64 {
        self.start + self.width - 1
    }

    pub fn contains(&self, id: u64) -> bool {
        id >= self.start && id <= self.last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StationKind {
    CurwWeatherStation,
    CurwWaterLevelGauge,
    CurwCrossSection,
    IrrigationDepartment,
    Satellite,
    Hechms,
    Wrf,
    Flo2d250,
    Flo2d150,
    Flo2d150V2,
    Flo2d10,
    Mike11,
    Public,
    Other,
}

const REGISTRY: &[(StationKind, &str, IdRange)] = &[
    (StationKind::CurwWeatherStation, "CUrW_WeatherStation", IdRange { start: 100_000, width: 200_000 }),
    (StationKind::CurwWaterLevelGauge, "CUrW_WaterLevelGauge", IdRange { start: 100_000, width: 200_000 }),
    (StationKind::CurwCrossSection, "CUrW_CrossSection", IdRange { start: 300_000, width: 100_000 }),
    (StationKind::IrrigationDepartment, "Irrigation_Department", IdRange { start: 400_000, width: 100_000 }),
    (StationKind::Satellite, "Satellite", IdRange { start: 500_000, width: 500_000 }),
    (StationKind::Hechms, "HECHMS", IdRange { start: 1_000_000, width: 100_000 }),
    (StationKind::Wrf, "WRF", IdRange { start: 1_100_000, width: 100_000 }),
    (StationKind::Flo2d250, "FLO2D_250", IdRange { start: 1_200_000, width: 100_000 }),
    (StationKind::Flo2d150, "FLO2D_150", IdRange { start: 1_300_000, width: 100_000 }),
    (StationKind::Flo2d150V2, "FLO2D_150_v2", IdRange { start: 1_400_000, width: 100_000 }),
    (StationKind::Flo2d10, "FLO2D_10", IdRange { start: 1_500_000, width: 100_000 }),
    (StationKind::Mike11, "MIKE11", IdRange { start: 1_800_000, width: 100_000 }),
    (StationKind::Public, "Public", IdRange { start: 2_000_000, width: 8_000_000 }),
    (StationKind::Other, "Other", IdRange { start: 10_000_000, width: 1_000_000 }),
];

// Short names accepted on input in addition to the canonical labels.
const ALIASES: &[(&str, StationKind)] = &[
    ("Sat", StationKind::Satellite),
    ("Irrigation", StationKind::IrrigationDepartment),
];

impl StationKind {
    fn entry(&self) -> &'static (StationKind, &'static str, IdRange) {
        // Every variant has exactly one registry row.
        REGISTRY
            .iter()
            .find(|(kind, _, _)| kind == self)
            .unwrap_or(&REGISTRY[REGISTRY.len() - 1])
    }

    /// The canonical label stored in the `station_type` column.
    pub fn as_str(&self) -> &'static str {
        self.entry().1
    }

    pub fn id_range(&self) -> IdRange {
        self.entry().2
    }

    /// All kinds whose namespace contains `id`. Shared namespaces return more
    /// than one kind.
    pub fn kinds_for_id(id: u64) -> Vec<StationKind> {
        REGISTRY
            .iter()
            .filter(|(_, _, range)| range.contains(id))
            .map(|(kind, _, _)| *kind)
            .collect()
    }

    pub fn all() -> impl Iterator<Item = StationKind> {
        REGISTRY.iter().map(|(kind, _, _)| *kind)
    }
}

impl FromStr for StationKind {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        REGISTRY
            .iter()
            .find(|(_, label, _)| label.eq_ignore_ascii_case(s))
            .map(|(kind, _, _)| *kind)
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| alias.eq_ignore_ascii_case(s))
                    .map(|(_, kind)| *kind)
            })
            .ok_or_else(|| SeriesError::UnknownLabel {
                kind: "station kind",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for StationKind {
    type Error = SeriesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StationKind> for String {
    fn from(kind: StationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for StationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_registry_row() {
        for kind in StationKind::all() {
            assert_eq!(kind.as_str().parse::<StationKind>().unwrap(), kind);
        }
        assert_eq!(StationKind::all().count(), REGISTRY.len());
    }

    #[test]
    fn test_shared_namespace() {
        let kinds = StationKind::kinds_for_id(100_123);
        assert_eq!(
            kinds,
            vec![
                StationKind::CurwWeatherStation,
                StationKind::CurwWaterLevelGauge
            ]
        );
        assert_eq!(StationKind::kinds_for_id(1_234_567), vec![StationKind::Flo2d250]);
        assert!(StationKind::kinds_for_id(42).is_empty());
    }

    #[test]
    fn test_range_bounds() {
        let range = StationKind::Wrf.id_range();
        assert_eq!(range.start, 1_100_000);
        assert_eq!(range.last(), 1_199_999);
        assert!(range.contains(1_199_999));
        assert!(!range.contains(1_200_000));
    }

    #[test]
    fn test_parse_aliases_and_unknown() {
        assert_eq!("Sat".parse::<StationKind>().unwrap(), StationKind::Satellite);
        assert_eq!("flo2d_250".parse::<StationKind>().unwrap(), StationKind::Flo2d250);
        assert!(matches!(
            "Radar".parse::<StationKind>(),
            Err(SeriesError::UnknownLabel { .. })
        ));
    }
}
