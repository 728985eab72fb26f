//! Outbound ports: external collaborators the spot service calls out to

use async_trait::async_trait;

use crate::domain::geo::Location;
use crate::domain::DomainResult;

/// Reverse geocoding: coordinates to a human-readable address.
///
/// Fails with `DomainError::Network` when the service is unreachable and
/// `DomainError::NotFound` when it has no address for the point.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    async fn resolve(&self, latitude: f64, longitude: f64) -> DomainResult<String>;
}

/// One-shot device position.
///
/// Fails with `DomainError::PermissionDenied` or
/// `DomainError::LocationUnavailable`.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> DomainResult<Location>;
}
