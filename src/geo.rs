//! Distance from the fixed reference point (Nagoya Station).

use crate::types::Coords;

/// Reference point all displayed distances are measured from.
pub const NAGOYA_STATION: Coords = Coords(35.1706, 136.8817);

/// Shown when a record has no resolved coordinates.
pub const UNKNOWN_DISTANCE: &str = "不明";

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two points (haversine).
pub fn haversine_meters(a: Coords, b: Coords) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Display label for the distance from the reference point, truncated to
/// whole meters. Total: unresolved coordinates get the unknown sentinel.
pub fn distance_label(coords: Option<Coords>) -> String {
    match coords {
        Some(coords) => format!("{}m", haversine_meters(NAGOYA_STATION, coords) as u64),
        None => UNKNOWN_DISTANCE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_point_is_zero_meters() {
        assert_eq!(distance_label(Some(NAGOYA_STATION)), "0m");
    }

    #[test]
    fn test_unresolved_coords_are_unknown() {
        assert_eq!(distance_label(None), "不明");
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = Coords(35.1706, 136.8817);
        let b = Coords(35.1815, 136.9066);
        let forward = haversine_meters(a, b);
        let backward = haversine_meters(b, a);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn test_distance_magnitude() {
        // Roughly 0.0094 degrees of latitude north of the station, a bit
        // over a kilometer.
        let label = distance_label(Some(Coords(35.1800, 136.8817)));
        let meters: u64 = label.trim_end_matches('m').parse().unwrap();
        assert!((1000..1100).contains(&meters), "got {}", label);
    }
}
