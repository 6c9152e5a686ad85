// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::Coordinates;

/// Mean Earth radius in meters used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two points, in meters.
#[must_use]
pub fn haversine_distance_meters(a: Coordinates, b: Coordinates) -> f64 {
    let lat1: f64 = a.latitude().to_radians();
    let lat2: f64 = b.latitude().to_radians();
    let d_lat: f64 = (b.latitude() - a.latitude()).to_radians();
    let d_lon: f64 = (b.longitude() - a.longitude()).to_radians();

    let h: f64 =
        (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c: f64 = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Outcome of comparing a GPS reading with the booking's service location.
///
/// Both fields are `None` when the booking has no recorded coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeofenceCheck {
    pub distance_meters: Option<f64>,
    pub is_within_geofence: Option<bool>,
}

/// Evaluates a reading against an optional service location.
///
/// Being outside the radius is recorded, never rejected.
#[must_use]
pub fn evaluate_geofence(
    service_location: Option<Coordinates>,
    reading: Coordinates,
    radius_meters: f64,
) -> GeofenceCheck {
    match service_location {
        Some(location) => {
            let distance: f64 = haversine_distance_meters(location, reading);
            GeofenceCheck {
                distance_meters: Some(distance),
                is_within_geofence: Some(distance <= radius_meters),
            }
        }
        None => GeofenceCheck {
            distance_meters: None,
            is_within_geofence: None,
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn at(latitude: f64, longitude: f64) -> Coordinates {
        Coordinates::new(latitude, longitude).unwrap()
    }

    #[test]
    fn test_same_point_is_zero() {
        let p = at(-33.8688, 151.2093);
        assert!(haversine_distance_meters(p, p).abs() < 1e-9);
    }

    #[test]
    fn test_known_distance() {
        // Sydney to Melbourne is roughly 713 km.
        let sydney = at(-33.8688, 151.2093);
        let melbourne = at(-37.8136, 144.9631);
        let d = haversine_distance_meters(sydney, melbourne);
        assert!((d - 713_000.0).abs() < 5_000.0, "got {d}");
    }

    #[test]
    fn test_within_and_outside_radius() {
        let site = at(-33.8688, 151.2093);
        // ~0.0005 degrees of latitude is about 55 m.
        let near = at(-33.8693, 151.2093);
        // ~0.002 degrees of latitude is about 222 m.
        let far = at(-33.8708, 151.2093);

        let inside = evaluate_geofence(Some(site), near, 100.0);
        assert_eq!(inside.is_within_geofence, Some(true));

        let outside = evaluate_geofence(Some(site), far, 100.0);
        assert_eq!(outside.is_within_geofence, Some(false));
        assert!(outside.distance_meters.unwrap() > 100.0);
    }

    #[test]
    fn test_radius_is_configurable() {
        let site = at(-33.8688, 151.2093);
        let far = at(-33.8708, 151.2093);
        let check = evaluate_geofence(Some(site), far, 250.0);
        assert_eq!(check.is_within_geofence, Some(true));
    }

    #[test]
    fn test_missing_location_yields_nulls() {
        let check = evaluate_geofence(None, at(0.0, 0.0), 100.0);
        assert_eq!(check.distance_meters, None);
        assert_eq!(check.is_within_geofence, None);
    }
}
