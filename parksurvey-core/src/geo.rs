//! Geo-index resolution on the H3 hexagonal grid.
//!
//! Every survey row is keyed by the resolution-9 cell (~0.1 km²) containing
//! the respondent's home location. Distances are measured in grid steps to a
//! fixed reference cell (the park).

use std::fmt;
use std::str::FromStr;

use h3o::{CellIndex, LatLng, Resolution};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SurveyError};

/// Grid resolution used for every stored cell.
pub const CELL_RESOLUTION: Resolution = Resolution::Nine;

/// Validated H3 cell identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(CellIndex);

impl CellId {
    /// Parse a cell id and require it to sit at [`CELL_RESOLUTION`].
    ///
    /// # Example
    /// ```
    /// use parksurvey_core::geo::CellId;
    ///
    /// assert!(CellId::parse_at_resolution("8928308280fffff").is_ok());
    /// assert!(CellId::parse_at_resolution("872830828ffffff").is_err()); // resolution 7
    /// ```
    pub fn parse_at_resolution(s: &str) -> Result<Self> {
        let cell: CellId = s.parse()?;
        if cell.0.resolution() != CELL_RESOLUTION {
            return Err(SurveyError::invalid_cell(
                s,
                format!(
                    "expected resolution {}, got {}",
                    u8::from(CELL_RESOLUTION),
                    u8::from(cell.0.resolution())
                ),
            ));
        }
        Ok(cell)
    }

    pub fn index(&self) -> CellIndex {
        self.0
    }

    /// Resolution of this cell (0-15).
    pub fn resolution(&self) -> u8 {
        u8::from(self.0.resolution())
    }

    /// Centroid of the cell as `(lat, lng)` in degrees.
    pub fn center(&self) -> (f64, f64) {
        let ll = LatLng::from(self.0);
        (ll.lat(), ll.lng())
    }
}

impl From<CellIndex> for CellId {
    fn from(index: CellIndex) -> Self {
        Self(index)
    }
}

impl FromStr for CellId {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SurveyError::invalid_cell(s, "cell id is empty"));
        }
        trimmed
            .parse::<CellIndex>()
            .map(Self)
            .map_err(|e| SurveyError::invalid_cell(s, e.to_string()))
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for CellId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Map a WGS84 coordinate (degrees) to its resolution-9 cell.
///
/// Pure and deterministic: no I/O, same input always yields the same cell.
pub fn resolve_cell(lat: f64, lng: f64) -> Result<CellId> {
    if !lat.is_finite() || !lng.is_finite() {
        return Err(SurveyError::invalid_coordinate(lat, lng, "not a finite number"));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(SurveyError::invalid_coordinate(
            lat,
            lng,
            "latitude must be within [-90, 90]",
        ));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(SurveyError::invalid_coordinate(
            lat,
            lng,
            "longitude must be within [-180, 180]",
        ));
    }

    let ll = LatLng::new(lat, lng)
        .map_err(|e| SurveyError::invalid_coordinate(lat, lng, e.to_string()))?;
    Ok(CellId(ll.to_cell(CELL_RESOLUTION)))
}

/// Minimum number of edge-adjacent hops between two cells.
///
/// Undefined (and reported as [`SurveyError::InvalidCell`]) when the cells
/// sit at different resolutions or too far apart for a local IJ frame.
pub fn grid_distance(a: CellId, b: CellId) -> Result<u32> {
    if a.0.resolution() != b.0.resolution() {
        return Err(SurveyError::invalid_cell(
            b.to_string(),
            format!(
                "resolution {} is incompatible with {} (resolution {})",
                b.resolution(),
                a,
                a.resolution()
            ),
        ));
    }

    let distance = a
        .0
        .grid_distance(b.0)
        .map_err(|e| SurveyError::invalid_cell(b.to_string(), format!("no grid distance from {a}: {e}")))?;

    u32::try_from(distance)
        .map_err(|_| SurveyError::invalid_cell(b.to_string(), "negative grid distance"))
}

/// The fixed point of interest that distances are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceCell(CellId);

impl ReferenceCell {
    /// Environment variable holding the reference location.
    pub const ENV_VAR: &'static str = "PARK_H3_INDEX";

    /// Parse a reference location.
    ///
    /// Accepts either a resolution-9 H3 index or a `"lat,lng"` pair which is
    /// resolved to its cell. Anything else is a configuration error.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SurveyError::configuration(format!(
                "{} is empty",
                Self::ENV_VAR
            )));
        }

        let cell = match value.split_once(',') {
            Some((lat, lng)) => {
                let lat: f64 = lat.trim().parse().map_err(|_| {
                    SurveyError::configuration(format!("{}: invalid latitude '{lat}'", Self::ENV_VAR))
                })?;
                let lng: f64 = lng.trim().parse().map_err(|_| {
                    SurveyError::configuration(format!("{}: invalid longitude '{lng}'", Self::ENV_VAR))
                })?;
                resolve_cell(lat, lng)
            }
            None => CellId::parse_at_resolution(value),
        }
        .map_err(|e| SurveyError::configuration(format!("{}: {e}", Self::ENV_VAR)))?;

        Ok(Self(cell))
    }

    /// Read and parse [`Self::ENV_VAR`]. Absence is fatal.
    pub fn from_env() -> Result<Self> {
        let value = std::env::var(Self::ENV_VAR).map_err(|_| {
            SurveyError::configuration(format!("{} environment variable not set", Self::ENV_VAR))
        })?;
        Self::parse(&value)
    }

    pub fn cell(&self) -> CellId {
        self.0
    }

    /// Grid distance from `cell` to the reference cell.
    pub fn distance_from(&self, cell: CellId) -> Result<u32> {
        grid_distance(cell, self.0)
    }
}

impl From<CellId> for ReferenceCell {
    fn from(cell: CellId) -> Self {
        Self(cell)
    }
}

impl fmt::Display for ReferenceCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
