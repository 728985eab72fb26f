//! Parking spot domain entity

use serde::{Deserialize, Serialize};

use crate::domain::geo::{validate_coordinates, Location};
use crate::domain::DomainResult;

/// System-assigned spot identifier
pub type SpotId = i64;

/// A parking location record with availability state.
///
/// This is also the persisted form: `{id, latitude, longitude, available, address?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingSpot {
    pub id: SpotId,
    pub latitude: f64,
    pub longitude: f64,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ParkingSpot {
    pub fn location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Apply the fields present in `patch`, leaving the rest untouched.
    ///
    /// The id never changes. Returns an error without modifying `self`
    /// if the patched coordinates would be invalid.
    pub fn apply(&mut self, patch: &SpotPatch) -> DomainResult<()> {
        let latitude = patch.latitude.unwrap_or(self.latitude);
        let longitude = patch.longitude.unwrap_or(self.longitude);
        validate_coordinates(latitude, longitude)?;

        self.latitude = latitude;
        self.longitude = longitude;
        if let Some(available) = patch.available {
            self.available = available;
        }
        if let Some(address) = &patch.address {
            self.address = address.clone();
        }
        Ok(())
    }
}

/// A spot that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewParkingSpot {
    pub latitude: f64,
    pub longitude: f64,
    pub available: bool,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewParkingSpot {
    /// A freshly reported spot: available, address not yet known.
    pub fn at(location: Location) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            available: true,
            address: None,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_coordinates(self.latitude, self.longitude)
    }

    pub(crate) fn into_spot(self, id: SpotId) -> ParkingSpot {
        ParkingSpot {
            id,
            latitude: self.latitude,
            longitude: self.longitude,
            available: self.available,
            address: self.address,
        }
    }
}

/// Partial update of a spot. `None` leaves a field unchanged.
///
/// `address` is doubly optional: `Some(None)` clears the address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpotPatch {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub available: Option<bool>,
    pub address: Option<Option<String>>,
}

impl SpotPatch {
    pub fn availability(available: bool) -> Self {
        Self {
            available: Some(available),
            ..Self::default()
        }
    }

    pub fn address(address: impl Into<String>) -> Self {
        Self {
            address: Some(Some(address.into())),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.latitude.is_none()
            && self.longitude.is_none()
            && self.available.is_none()
            && self.address.is_none()
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    fn sample_spot() -> ParkingSpot {
        NewParkingSpot {
            latitude: 48.8566,
            longitude: 2.3522,
            available: true,
            address: Some("12 Rue de Rivoli, 75001 Paris, France".into()),
        }
        .into_spot(7)
    }

    #[test]
    fn new_spot_at_location_is_available_without_address() {
        let spot = NewParkingSpot::at(Location {
            latitude: 1.0,
            longitude: 2.0,
        });
        assert!(spot.available);
        assert!(spot.address.is_none());
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let mut spot = sample_spot();
        spot.apply(&SpotPatch::availability(false)).unwrap();

        assert!(!spot.available);
        assert_eq!(spot.id, 7);
        assert_eq!(spot.latitude, 48.8566);
        assert_eq!(
            spot.address.as_deref(),
            Some("12 Rue de Rivoli, 75001 Paris, France")
        );
    }

    #[test]
    fn patch_can_clear_address() {
        let mut spot = sample_spot();
        let patch = SpotPatch {
            address: Some(None),
            ..SpotPatch::default()
        };
        spot.apply(&patch).unwrap();
        assert!(spot.address.is_none());
    }

    #[test]
    fn invalid_patch_leaves_spot_unchanged() {
        let mut spot = sample_spot();
        let before = spot.clone();
        let patch = SpotPatch {
            latitude: Some(120.0),
            available: Some(false),
            ..SpotPatch::default()
        };

        let err = spot.apply(&patch).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(spot, before);
    }

    #[test]
    fn empty_patch() {
        assert!(SpotPatch::default().is_empty());
        assert!(!SpotPatch::address("x").is_empty());
    }

    #[test]
    fn serialized_form_omits_missing_address() {
        let mut spot = sample_spot();
        spot.address = None;
        let json = serde_json::to_value(&spot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "latitude": 48.8566,
                "longitude": 2.3522,
                "available": true
            })
        );
    }
}
