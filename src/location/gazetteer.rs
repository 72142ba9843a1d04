//! Built-in reference points used as the last step of reverse geocoding.
//!
//! A `Gazetteer` is an immutable, versioned table. It is guaranteed non-empty,
//! so `locate` always has a nearest point to report.

use super::types::{Confidence, LocationResult};
use crate::geo::{distance, Coordinate};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// A named place with known coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub key: Cow<'static, str>,
    pub name: Cow<'static, str>,
    #[serde(flatten)]
    pub coord: Coordinate,
}

const fn point(key: &'static str, name: &'static str, lat: f64, lon: f64) -> ReferencePoint {
    ReferencePoint {
        key: Cow::Borrowed(key),
        name: Cow::Borrowed(name),
        coord: Coordinate { lat, lon },
    }
}

const SOUTH_AFRICA: &[ReferencePoint] = &[
    point("johannesburg", "Johannesburg, Gauteng, South Africa", -26.2041, 28.0473),
    point("cape_town", "Cape Town, Western Cape, South Africa", -33.9249, 18.4241),
    point("durban", "Durban, KwaZulu-Natal, South Africa", -29.8587, 31.0218),
    point("pretoria", "Pretoria, Gauteng, South Africa", -25.7479, 28.2293),
    point("bloemfontein", "Bloemfontein, Free State, South Africa", -29.0852, 26.1596),
    point("polokwane", "Polokwane, Limpopo, South Africa", -23.9045, 29.4689),
];

pub const BUILTIN_VERSION: &str = "za-2024.1";

#[derive(Debug, thiserror::Error)]
pub enum GazetteerError {
    #[error("gazetteer '{0}' has no reference points")]
    Empty(String),
    #[error("invalid coordinate for reference point '{key}': {source}")]
    InvalidPoint {
        key: String,
        source: crate::geo::CoordinateError,
    },
    #[error("cannot read gazetteer file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse gazetteer file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Versioned, non-empty reference table.
#[derive(Debug, Clone, Serialize)]
pub struct Gazetteer {
    version: Cow<'static, str>,
    points: Cow<'static, [ReferencePoint]>,
}

/// On-disk shape of a replacement gazetteer.
#[derive(Deserialize)]
struct GazetteerFile {
    version: String,
    points: Vec<ReferencePoint>,
}

impl Gazetteer {
    /// The built-in South African table.
    pub const fn builtin() -> Self {
        Self {
            version: Cow::Borrowed(BUILTIN_VERSION),
            points: Cow::Borrowed(SOUTH_AFRICA),
        }
    }

    /// Build a custom table. Rejects empty tables and out-of-range points.
    pub fn new(version: impl Into<String>, points: Vec<ReferencePoint>) -> Result<Self, GazetteerError> {
        let version = version.into();
        if points.is_empty() {
            return Err(GazetteerError::Empty(version));
        }
        for p in &points {
            Coordinate::new(p.coord.lat, p.coord.lon).map_err(|source| GazetteerError::InvalidPoint {
                key: p.key.to_string(),
                source,
            })?;
        }
        Ok(Self {
            version: Cow::Owned(version),
            points: Cow::Owned(points),
        })
    }

    /// Load a table from a JSON file: `{"version": "...", "points": [{"key", "name", "lat", "lon"}]}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GazetteerError> {
        let data = fs::read_to_string(path)?;
        let file: GazetteerFile = serde_json::from_str(&data)?;
        Self::new(file.version, file.points)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn points(&self) -> &[ReferencePoint] {
        &self.points
    }

    /// The reference point closest to `coord`. Ties go to the earlier entry.
    pub fn nearest(&self, coord: Coordinate) -> (&ReferencePoint, f64) {
        let first = &self.points[0];
        let mut best = (first, distance(coord, first.coord));
        for p in &self.points[1..] {
            let d = distance(coord, p.coord);
            if d < best.1 {
                best = (p, d);
            }
        }
        best
    }

    /// Describe `coord` relative to its nearest reference point. Never fails.
    pub fn locate(&self, coord: Coordinate) -> LocationResult {
        let (point, _) = self.nearest(coord);
        LocationResult {
            formatted_address: format!("Near {}", point.name),
            city: None,
            province: None,
            country: None,
            confidence: Confidence::Low,
        }
    }
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::builtin()
    }
}
