//! Coordinates and great-circle distance.
//!
//! Latitude is degrees north (-90 to 90), longitude degrees east
//! (-180 to 180). Distances use a spherical Earth.

use serde::{Deserialize, Serialize};

use super::error::{DomainError, DomainResult};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A caller's position, taken once and treated as an immutable snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Build a location, rejecting out-of-range or non-finite coordinates.
    pub fn new(latitude: f64, longitude: f64) -> DomainResult<Self> {
        validate_coordinates(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Haversine distance to another location in kilometres.
    pub fn distance_km(&self, other: &Location) -> f64 {
        haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Check that a coordinate pair lies within ±90 / ±180 degrees.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> DomainResult<()> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(DomainError::Validation(format!(
            "latitude must be within [-90, 90], got {}",
            latitude
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(DomainError::Validation(format!(
            "longitude must be within [-180, 180], got {}",
            longitude
        )));
    }
    Ok(())
}

/// Great-circle distance between two points in kilometres.
///
/// Uses the haversine formula on a sphere of radius [`EARTH_RADIUS_KM`].
/// The result is symmetric in its arguments and zero for identical points.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` marginally above 1 for antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARIS: (f64, f64) = (48.8566, 2.3522);
    const NEW_YORK: (f64, f64) = (40.7128, -74.0060);

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_km(PARIS.0, PARIS.1, PARIS.0, PARIS.1), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let there = haversine_km(PARIS.0, PARIS.1, NEW_YORK.0, NEW_YORK.1);
        let back = haversine_km(NEW_YORK.0, NEW_YORK.1, PARIS.0, PARIS.1);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn paris_to_new_york() {
        // ~5837 km great-circle
        let dist = haversine_km(PARIS.0, PARIS.1, NEW_YORK.0, NEW_YORK.1);
        assert!((dist - 5837.0).abs() < 10.0, "got {}", dist);
    }

    #[test]
    fn short_hop_within_city() {
        // Louvre to Eiffel Tower, a bit over 3 km
        let dist = haversine_km(48.8606, 2.3376, 48.8584, 2.2945);
        assert!(dist > 3.0 && dist < 3.5, "got {}", dist);
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let dist = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!(dist.is_finite());
        assert!((dist - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn location_rejects_out_of_range() {
        assert!(matches!(
            Location::new(91.0, 0.0),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            Location::new(0.0, -180.5),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            Location::new(f64::NAN, 0.0),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn location_accepts_boundaries() {
        assert!(Location::new(90.0, 180.0).is_ok());
        assert!(Location::new(-90.0, -180.0).is_ok());
    }
}
