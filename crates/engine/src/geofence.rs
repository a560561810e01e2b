//! Geofence validation against a challenge's registered location
//!
//! Pure arithmetic: no I/O, no state. The result is advisory — the backend
//! re-validates every submission and is the only authority for whether an
//! evidence record is ultimately marked location-valid.

use habitleague_core::{Coordinate, GeofenceLocation};

/// Mean Earth radius in meters, as used by the backend's own check
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Outcome of a local geofence check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationValidation {
    /// Whether the observed point lies within the tolerance radius
    /// (closed boundary: exactly at the radius is accepted)
    pub valid: bool,
    /// Great-circle distance from the registered point, in meters
    pub distance: f64,
    /// The challenge's tolerance radius, in meters
    pub tolerance_radius: f64,
}

/// Great-circle distance between two coordinates using the haversine
/// formula. Symmetric, non-negative, zero for coincident points.
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Check an observed coordinate against a challenge's registered geofence.
///
/// A challenge without a registered location is vacuously valid — the
/// check reports zero distance and zero tolerance. Coincident and
/// antipodal points resolve naturally; there are no error conditions.
pub fn validate_location(
    location: Option<&GeofenceLocation>,
    observed: Coordinate,
) -> LocationValidation {
    let Some(location) = location else {
        return LocationValidation {
            valid: true,
            distance: 0.0,
            tolerance_radius: 0.0,
        };
    };

    let registered = Coordinate::new(location.latitude, location.longitude);
    let distance = haversine_distance(registered, observed);

    LocationValidation {
        valid: distance <= location.tolerance_radius,
        distance,
        tolerance_radius: location.tolerance_radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geofence(latitude: f64, longitude: f64, tolerance_radius: f64) -> GeofenceLocation {
        GeofenceLocation {
            latitude,
            longitude,
            location_name: "Test point".to_string(),
            tolerance_radius,
        }
    }

    #[test]
    fn test_no_registered_location_is_vacuously_valid() {
        let result = validate_location(None, Coordinate::new(48.8566, 2.3522));
        assert!(result.valid);
        assert_eq!(result.distance, 0.0);
        assert_eq!(result.tolerance_radius, 0.0);
    }

    #[test]
    fn test_coincident_points_have_zero_distance() {
        let fence = geofence(0.0, 0.0, 100.0);
        let result = validate_location(Some(&fence), Coordinate::new(0.0, 0.0));
        assert!(result.valid);
        assert_eq!(result.distance, 0.0);
        assert_eq!(result.tolerance_radius, 100.0);
    }

    #[test]
    fn test_one_hundredth_degree_latitude_is_rejected_at_100m() {
        // 0.01° of latitude ≈ 1113 m, well outside a 100 m fence
        let fence = geofence(0.0, 0.0, 100.0);
        let result = validate_location(Some(&fence), Coordinate::new(0.01, 0.0));
        assert!(!result.valid);
        assert!((result.distance - 1113.19).abs() < 1.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinate::new(40.4168, -3.7038);
        let b = Coordinate::new(41.3874, 2.1686);
        assert_eq!(haversine_distance(a, b), haversine_distance(b, a));
    }

    #[test]
    fn test_distance_is_non_negative() {
        let points = [
            (Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.0)),
            (Coordinate::new(-33.86, 151.20), Coordinate::new(51.50, -0.12)),
            (Coordinate::new(89.9, 0.0), Coordinate::new(-89.9, 180.0)),
        ];
        for (a, b) in points {
            assert!(haversine_distance(a, b) >= 0.0);
        }
    }

    #[test]
    fn test_antipodal_points_resolve_without_special_casing() {
        let distance =
            haversine_distance(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!((distance - half_circumference).abs() < 1.0);
    }

    #[test]
    fn test_boundary_is_closed() {
        let observed = Coordinate::new(0.001, 0.0);
        let distance =
            haversine_distance(Coordinate::new(0.0, 0.0), observed);

        // Exactly at the tolerance radius: accepted
        let at_boundary = geofence(0.0, 0.0, distance);
        assert!(validate_location(Some(&at_boundary), observed).valid);

        // One meter inside the observed distance: rejected
        let beyond_boundary = geofence(0.0, 0.0, distance - 1.0);
        assert!(!validate_location(Some(&beyond_boundary), observed).valid);
    }

    #[test]
    fn test_validator_is_idempotent() {
        let fence = geofence(40.4168, -3.7038, 150.0);
        let observed = Coordinate::new(40.4178, -3.7048);

        let first = validate_location(Some(&fence), observed);
        let second = validate_location(Some(&fence), observed);
        assert_eq!(first, second);
    }
}
