//! Proximity filter: which spots can be offered to a caller.

use super::model::ParkingSpot;
use crate::domain::geo::Location;

/// Radius used when the caller does not supply one.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Available spots within `radius_km` of `location`, in input order.
///
/// A missing location yields an empty list: nothing can be shown until
/// the caller's position is known.
pub fn filter_nearby(
    spots: &[ParkingSpot],
    location: Option<&Location>,
    radius_km: f64,
) -> Vec<ParkingSpot> {
    let Some(location) = location else {
        return Vec::new();
    };

    spots
        .iter()
        .filter(|spot| spot.available && location.distance_km(&spot.location()) <= radius_km)
        .cloned()
        .collect()
}
