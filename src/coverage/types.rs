//! Coverage areas as stored by the backend, and match results.

use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};

/// A service region: a center point and a radius within which a provider can connect.
///
/// Field names follow the backend's `coverage_areas` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageArea {
    pub id: String,
    #[serde(rename = "area_name")]
    pub name: String,
    #[serde(default)]
    pub area_type: Option<String>,
    #[serde(default)]
    pub center_lat: Option<f64>,
    #[serde(default)]
    pub center_lng: Option<f64>,
    #[serde(default)]
    pub radius_km: Option<f64>,
    #[serde(rename = "coverage_quality", default)]
    pub quality: Option<String>,
    #[serde(rename = "is_active", default = "default_active")]
    pub active: bool,
}

pub(crate) fn default_active() -> bool {
    true
}

impl CoverageArea {
    /// The area center, when both components are present and in range.
    pub fn center(&self) -> Option<Coordinate> {
        Coordinate::new(self.center_lat?, self.center_lng?).ok()
    }

    /// A usable radius: present, finite, and positive.
    pub fn radius(&self) -> Option<f64> {
        self.radius_km.filter(|r| r.is_finite() && *r > 0.0)
    }
}

/// A network operator offering service inside a coverage area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceProvider {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Outcome of a coverage lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageMatch {
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<CoverageArea>,
    /// Kilometers from the query point to the area center (coordinate lookups only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl CoverageMatch {
    pub fn not_found() -> Self {
        Self {
            found: false,
            area: None,
            distance_km: None,
        }
    }

    pub fn within(area: CoverageArea, distance_km: f64) -> Self {
        Self {
            found: true,
            area: Some(area),
            distance_km: Some(distance_km),
        }
    }

    pub fn by_name(area: CoverageArea) -> Self {
        Self {
            found: true,
            area: Some(area),
            distance_km: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_row() {
        let row = r#"{
            "id": "7d1c",
            "area_name": "Greater Johannesburg Metro",
            "area_type": "metro",
            "center_lat": -26.2041,
            "center_lng": 28.0473,
            "radius_km": 50,
            "coverage_quality": "excellent",
            "is_active": true
        }"#;
        let area: CoverageArea = serde_json::from_str(row).unwrap();
        assert_eq!(area.name, "Greater Johannesburg Metro");
        assert_eq!(area.radius(), Some(50.0));
        assert_eq!(area.center(), Some(Coordinate { lat: -26.2041, lon: 28.0473 }));
        assert_eq!(area.quality.as_deref(), Some("excellent"));
        assert!(area.active);
    }

    #[test]
    fn test_null_geometry() {
        let row = r#"{ "id": "1", "area_name": "Rural Limpopo", "center_lat": null, "center_lng": 29.4, "radius_km": null }"#;
        let area: CoverageArea = serde_json::from_str(row).unwrap();
        assert!(area.center().is_none());
        assert!(area.radius().is_none());
        assert!(area.active);
    }

    #[test]
    fn test_unusable_radius() {
        let mut area: CoverageArea =
            serde_json::from_str(r#"{ "id": "1", "area_name": "X", "radius_km": 0 }"#).unwrap();
        assert!(area.radius().is_none());
        area.radius_km = Some(-3.0);
        assert!(area.radius().is_none());
        area.radius_km = Some(f64::INFINITY);
        assert!(area.radius().is_none());
    }

    #[test]
    fn test_provider_without_description() {
        let p: ServiceProvider = serde_json::from_str(r#"{ "id": "openserve", "name": "Openserve", "description": null }"#).unwrap();
        assert_eq!(p.name, "Openserve");
        assert!(p.description.is_none());
    }

    #[test]
    fn test_match_serialization() {
        let json = serde_json::to_value(CoverageMatch::not_found()).unwrap();
        assert_eq!(json, serde_json::json!({ "found": false }));
    }
}
