//! Request and response bodies for the spot API

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::application::AddedSpot;
use crate::domain::{Location, ParkingSpot, SpotPatch};

/// Add a spot. Without coordinates the device location is used.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AddSpotRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// Partial update; absent fields stay unchanged, `"address": null` clears it.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSpotRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub available: Option<bool>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub address: Option<Option<String>>,
}

impl From<UpdateSpotRequest> for SpotPatch {
    fn from(req: UpdateSpotRequest) -> Self {
        SpotPatch {
            latitude: req.latitude,
            longitude: req.longitude,
            available: req.available,
            address: req.address,
        }
    }
}

/// Distinguish a field set to `null` (`Some(None)`) from an absent one (`None`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `?lat=..&lon=..&radius_km=..`; no coordinates means no spots.
#[derive(Debug, Default, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NearbyResponse {
    pub location: Option<Location>,
    pub radius_km: f64,
    pub spots: Vec<ParkingSpot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddedSpotResponse {
    pub spot: ParkingSpot,
    /// Address lookup failure; the spot was saved regardless
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_error: Option<String>,
}

impl From<AddedSpot> for AddedSpotResponse {
    fn from(added: AddedSpot) -> Self {
        Self {
            spot: added.spot,
            address_error: added.address_error.map(|e| e.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub spots: usize,
    pub update_feeds: usize,
}
