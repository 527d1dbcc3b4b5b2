//! Labels that travel with a simulation run: how the values were produced
//! and which spatial method mapped the station onto the model grid.
//!
//! Unrecognised labels are kept verbatim so they pass through to the store.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Value population method of a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Method {
    /// Multi model ensemble
    Mme,
    Other(String),
}

impl Method {
    /// Abbreviation, which is what goes into run metadata hashes.
    pub fn abbreviation(&self) -> &str {
        match self {
            Method::Mme => "MME",
            Method::Other(label) => label,
        }
    }

    pub fn meaning(&self) -> &str {
        match self {
            Method::Mme => "Multi_Model_Ensemble",
            Method::Other(label) => label,
        }
    }
}

impl FromStr for Method {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "MME" | "Multi_Model_Ensemble" => Method::Mme,
            other => Method::Other(other.to_string()),
        })
    }
}

/// Spatial method used upstream to map a station onto a grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GridInterpolation {
    /// Minimum distance point approximation
    Mdpa,
    Other(String),
}

impl GridInterpolation {
    pub fn abbreviation(&self) -> &str {
        match self {
            GridInterpolation::Mdpa => "MDPA",
            GridInterpolation::Other(label) => label,
        }
    }

    pub fn meaning(&self) -> &str {
        match self {
            GridInterpolation::Mdpa => "Minimum_Distance_Point_Approximation",
            GridInterpolation::Other(label) => label,
        }
    }
}

impl FromStr for GridInterpolation {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "MDPA" | "Minimum_Distance_Point_Approximation" => GridInterpolation::Mdpa,
            other => GridInterpolation::Other(other.to_string()),
        })
    }
}

macro_rules! string_conversions {
    ($ty:ty) => {
        impl From<String> for $ty {
            fn from(value: String) -> Self {
                match value.parse() {
                    Ok(parsed) => parsed,
                    Err(never) => match never {},
                }
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.abbreviation().to_string()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.abbreviation())
            }
        }
    };
}

string_conversions!(Method);
string_conversions!(GridInterpolation);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_aliases() {
        assert_eq!("Multi_Model_Ensemble".parse::<Method>().unwrap(), Method::Mme);
        assert_eq!(Method::Mme.to_string(), "MME");
        assert_eq!(Method::Mme.meaning(), "Multi_Model_Ensemble");
    }

    #[test]
    fn test_unknown_labels_pass_through() {
        let method: Method = "OBS".parse().unwrap();
        assert_eq!(method, Method::Other("OBS".to_string()));
        assert_eq!(method.abbreviation(), "OBS");
        let grid = GridInterpolation::from("IDW".to_string());
        assert_eq!(grid.to_string(), "IDW");
    }

    #[test]
    fn test_grid_interpolation() {
        let grid: GridInterpolation = "Minimum_Distance_Point_Approximation".parse().unwrap();
        assert_eq!(grid, GridInterpolation::Mdpa);
        assert_eq!(String::from(grid), "MDPA");
    }
}
