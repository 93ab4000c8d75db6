//! Spatial math for travel-time estimates.

use crate::models::Coordinate;

/// Earth radius in meters (mean).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Cruise speed of every drone in the fleet, km/h.
pub const DEFAULT_CRUISE_SPEED_KMH: f64 = 50.0;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Great-circle distance between two points in meters.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Distance between two coordinates in kilometers.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    haversine_distance(a.lat, a.lon, b.lat, b.lon) / 1000.0
}

/// Seconds needed to fly in a straight line from `a` to `b` at `cruise_speed_kmh`.
///
/// Symmetric in its coordinate arguments and zero when they coincide.
pub fn travel_seconds(a: Coordinate, b: Coordinate, cruise_speed_kmh: f64) -> f64 {
    distance_km(a, b) / cruise_speed_kmh * SECONDS_PER_HOUR
}

/// Calculate the destination point given start, distance and bearing.
///
/// # Arguments
/// * `origin` - Start point
/// * `distance_m` - Distance to travel in meters
/// * `bearing_rad` - Bearing in radians (0 = north, π/2 = east)
pub fn offset_by_bearing(origin: Coordinate, distance_m: f64, bearing_rad: f64) -> Coordinate {
    if distance_m.abs() <= f64::EPSILON {
        return origin;
    }

    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    Coordinate::new(lat2.to_degrees(), lon2.to_degrees())
}

/// Point reached after flying `seconds` due north from `origin` at `cruise_speed_kmh`.
pub fn point_after_seconds(origin: Coordinate, seconds: f64, cruise_speed_kmh: f64) -> Coordinate {
    let distance_m = seconds / SECONDS_PER_HOUR * cruise_speed_kmh * 1000.0;
    offset_by_bearing(origin, distance_m, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MELBOURNE: Coordinate = Coordinate::new(-37.8152065, 144.963937);

    #[test]
    fn test_haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111_194.0).abs() < 100.0);
    }

    #[test]
    fn travel_time_at_cruise_speed() {
        // 50 km at 50 km/h is one hour
        let dest = offset_by_bearing(MELBOURNE, 50_000.0, 1.0);
        let secs = travel_seconds(MELBOURNE, dest, DEFAULT_CRUISE_SPEED_KMH);
        assert!((secs - 3600.0).abs() < 0.01, "got {secs}");
    }

    #[test]
    fn travel_time_is_symmetric() {
        let a = Coordinate::new(-37.78, 144.85);
        let b = Coordinate::new(-37.70, 145.10);
        let ab = travel_seconds(a, b, DEFAULT_CRUISE_SPEED_KMH);
        let ba = travel_seconds(b, a, DEFAULT_CRUISE_SPEED_KMH);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn travel_time_grows_with_distance() {
        let near = offset_by_bearing(MELBOURNE, 1_000.0, 0.3);
        let far = offset_by_bearing(MELBOURNE, 2_000.0, 0.3);
        assert!(
            travel_seconds(MELBOURNE, near, DEFAULT_CRUISE_SPEED_KMH)
                < travel_seconds(MELBOURNE, far, DEFAULT_CRUISE_SPEED_KMH)
        );
        assert_eq!(travel_seconds(MELBOURNE, MELBOURNE, DEFAULT_CRUISE_SPEED_KMH), 0.0);
    }

    #[test]
    fn point_after_seconds_round_trips_through_travel_time() {
        let origin = Coordinate::new(0.0, 0.0);
        let dest = point_after_seconds(origin, 3600.0, DEFAULT_CRUISE_SPEED_KMH);
        let secs = travel_seconds(origin, dest, DEFAULT_CRUISE_SPEED_KMH);
        assert!((secs - 3600.0).abs() < 0.01);
    }
}
