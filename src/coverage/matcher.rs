//! Coverage matching over a candidate list supplied by the caller.
//!
//! Matching is read-only and never fails: "no candidates" and "no match" both
//! come back as `CoverageMatch::not_found()`.

use super::types::{CoverageArea, CoverageMatch};
use crate::geo::{distance, Coordinate};
use tracing::debug;

/// Nearest active area whose radius covers `coord`.
///
/// Areas without a center or radius are skipped. Equidistant areas resolve to
/// the first one in `candidates` order.
pub fn find_by_coordinate(coord: Coordinate, candidates: &[CoverageArea]) -> CoverageMatch {
    let mut best: Option<(&CoverageArea, f64)> = None;

    for area in candidates.iter().filter(|a| a.active) {
        let (Some(center), Some(radius)) = (area.center(), area.radius()) else {
            continue;
        };
        let d = distance(coord, center);
        if d <= radius && best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((area, d));
        }
    }

    match best {
        Some((area, d)) => {
            debug!(%coord, area = %area.name, distance_km = d, "coordinate inside coverage area");
            CoverageMatch::within(area.clone(), d)
        }
        None => {
            debug!(%coord, candidates = candidates.len(), "no coverage area contains coordinate");
            CoverageMatch::not_found()
        }
    }
}

/// First active area whose name contains `query`, case-insensitively.
///
/// The query is trimmed; a blank query matches nothing.
pub fn find_by_text(query: &str, candidates: &[CoverageArea]) -> CoverageMatch {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return CoverageMatch::not_found();
    }

    candidates
        .iter()
        .filter(|a| a.active)
        .find(|a| a.name.to_lowercase().contains(&needle))
        .map(|area| {
            debug!(query, area = %area.name, "location text matched coverage area");
            CoverageMatch::by_name(area.clone())
        })
        .unwrap_or_else(CoverageMatch::not_found)
}

/// Coordinate match first, then free-text match.
pub fn check_coverage(
    coord: Option<Coordinate>,
    location: Option<&str>,
    candidates: &[CoverageArea],
) -> CoverageMatch {
    if let Some(coord) = coord {
        let m = find_by_coordinate(coord, candidates);
        if m.found {
            return m;
        }
    }
    if let Some(text) = location {
        return find_by_text(text, candidates);
    }
    CoverageMatch::not_found()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const JOHANNESBURG: Coordinate = Coordinate { lat: -26.2041, lon: 28.0473 };

    fn area(id: &str, name: &str, center: Coordinate, radius_km: f64) -> CoverageArea {
        CoverageArea {
            id: id.to_string(),
            name: name.to_string(),
            area_type: None,
            center_lat: Some(center.lat),
            center_lng: Some(center.lon),
            radius_km: Some(radius_km),
            quality: Some("good".into()),
            active: true,
        }
    }

    /// A point `km` kilometers due north of `from`.
    fn north_of(from: Coordinate, km: f64) -> Coordinate {
        let dlat = (km / crate::geo::EARTH_RADIUS_KM).to_degrees();
        Coordinate { lat: from.lat + dlat, lon: from.lon }
    }

    #[test]
    fn test_point_inside_radius() {
        let jhb = area("jhb", "Greater Johannesburg Metro", JOHANNESBURG, 50.0);
        let query = north_of(JOHANNESBURG, 10.0);

        let m = find_by_coordinate(query, &[jhb.clone()]);
        assert!(m.found);
        assert_eq!(m.area, Some(jhb));
        assert_abs_diff_eq!(m.distance_km.unwrap(), 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_point_outside_every_radius() {
        let candidates = vec![
            area("jhb", "Johannesburg", JOHANNESBURG, 50.0),
            area("pta", "Pretoria", Coordinate { lat: -25.7479, lon: 28.2293 }, 80.0),
        ];
        let query = north_of(JOHANNESBURG, 1000.0);
        assert_eq!(find_by_coordinate(query, &candidates), CoverageMatch::not_found());
    }

    #[test]
    fn test_overlapping_areas_pick_nearest() {
        let wide = area("wide", "Gauteng Wide", north_of(JOHANNESBURG, 30.0), 100.0);
        let near = area("near", "Johannesburg Central", JOHANNESBURG, 50.0);
        let query = north_of(JOHANNESBURG, 5.0);

        let m = find_by_coordinate(query, &[wide, near]);
        assert_eq!(m.area.unwrap().id, "near");
        assert_abs_diff_eq!(m.distance_km.unwrap(), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_equidistant_picks_first() {
        let a = area("a", "First", JOHANNESBURG, 20.0);
        let b = area("b", "Second", JOHANNESBURG, 40.0);
        let query = north_of(JOHANNESBURG, 10.0);

        assert_eq!(find_by_coordinate(query, &[a.clone(), b.clone()]).area.unwrap().id, "a");
        assert_eq!(find_by_coordinate(query, &[b, a]).area.unwrap().id, "b");
    }

    #[test]
    fn test_nearer_center_but_too_small_radius_is_skipped() {
        let tiny = area("tiny", "Sandton Pocket", north_of(JOHANNESBURG, 8.0), 1.0);
        let big = area("big", "Johannesburg", JOHANNESBURG, 50.0);
        let query = north_of(JOHANNESBURG, 10.0);

        let m = find_by_coordinate(query, &[tiny, big]);
        assert_eq!(m.area.unwrap().id, "big");
    }

    #[test]
    fn test_inactive_and_incomplete_areas_skipped() {
        let mut inactive = area("off", "Switched Off", JOHANNESBURG, 50.0);
        inactive.active = false;
        let mut no_center = area("nc", "No Center", JOHANNESBURG, 50.0);
        no_center.center_lat = None;
        let mut no_radius = area("nr", "No Radius", JOHANNESBURG, 50.0);
        no_radius.radius_km = None;

        let m = find_by_coordinate(JOHANNESBURG, &[inactive, no_center, no_radius]);
        assert!(!m.found);
    }

    #[test]
    fn test_empty_candidates() {
        assert!(!find_by_coordinate(JOHANNESBURG, &[]).found);
        assert!(!find_by_text("johannesburg", &[]).found);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let a = area("edge", "Edge", JOHANNESBURG, 10.0);
        let query = north_of(JOHANNESBURG, 9.999_999);
        assert!(find_by_coordinate(query, &[a]).found);
    }

    #[test]
    fn test_text_case_insensitive() {
        let candidates = vec![
            area("ct", "Cape Town CBD", Coordinate { lat: -33.9249, lon: 18.4241 }, 30.0),
            area("jhb", "Greater Johannesburg Metro", JOHANNESBURG, 50.0),
        ];
        let m = find_by_text("johannesburg", &candidates);
        assert!(m.found);
        assert_eq!(m.area.unwrap().name, "Greater Johannesburg Metro");
        assert!(m.distance_km.is_none());

        assert!(find_by_text("  CAPE town ", &candidates).found);
        assert!(!find_by_text("durban", &candidates).found);
    }

    #[test]
    fn test_text_first_match_wins_and_skips_inactive() {
        let mut old = area("old", "Pretoria East", JOHANNESBURG, 10.0);
        old.active = false;
        let candidates = vec![
            old,
            area("pn", "Pretoria North", JOHANNESBURG, 10.0),
            area("pe", "Pretoria East", JOHANNESBURG, 10.0),
        ];
        assert_eq!(find_by_text("pretoria", &candidates).area.unwrap().id, "pn");
    }

    #[test]
    fn test_blank_text_never_matches() {
        let candidates = vec![area("jhb", "Johannesburg", JOHANNESBURG, 50.0)];
        assert!(!find_by_text("", &candidates).found);
        assert!(!find_by_text("   ", &candidates).found);
    }

    #[test]
    fn test_check_coverage_prefers_coordinate() {
        let candidates = vec![
            area("ct", "Cape Town", Coordinate { lat: -33.9249, lon: 18.4241 }, 30.0),
            area("jhb", "Johannesburg", JOHANNESBURG, 50.0),
        ];
        let m = check_coverage(Some(JOHANNESBURG), Some("cape town"), &candidates);
        assert_eq!(m.area.unwrap().id, "jhb");
        assert!(m.distance_km.is_some());
    }

    #[test]
    fn test_check_coverage_falls_back_to_text() {
        let candidates = vec![area("ct", "Cape Town", Coordinate { lat: -33.9249, lon: 18.4241 }, 30.0)];
        let m = check_coverage(Some(JOHANNESBURG), Some("cape town"), &candidates);
        assert_eq!(m.area.unwrap().id, "ct");
        assert!(m.distance_km.is_none());
    }

    #[test]
    fn test_check_coverage_nothing_given() {
        let candidates = vec![area("jhb", "Johannesburg", JOHANNESBURG, 50.0)];
        assert!(!check_coverage(None, None, &candidates).found);
    }
}
