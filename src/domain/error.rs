//! Domain errors

use thiserror::Error;

use super::spot::SpotId;

/// Domain-level error types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    /// Malformed coordinates or request fields
    #[error("Validation: {0}")]
    Validation(String),

    /// Unknown spot id, or the resolver had no answer
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// Spot is already reserved or marked unavailable
    #[error("Parking spot {0} is not available")]
    SpotUnavailable(SpotId),

    /// Resolver or location provider unreachable
    #[error("Network error: {0}")]
    Network(String),

    /// Location access refused
    #[error("Location permission denied: {0}")]
    PermissionDenied(String),

    /// Location could not be determined
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    /// Snapshot could not be written
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn spot_not_found(id: SpotId) -> Self {
        Self::NotFound {
            entity: "ParkingSpot",
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn address_not_found(latitude: f64, longitude: f64) -> Self {
        Self::NotFound {
            entity: "Address",
            field: "coordinates",
            value: format!("{},{}", latitude, longitude),
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
