//! Device location providers
//!
//! A server has no GPS of its own; the device position is configured
//! (`[location]` in the config file) or supplied per request.

use async_trait::async_trait;

use crate::domain::{DomainError, DomainResult, Location, LocationProvider};

/// Always reports the same configured position.
#[derive(Debug, Clone)]
pub struct FixedLocationProvider {
    location: Location,
}

impl FixedLocationProvider {
    pub fn new(location: Location) -> Self {
        Self { location }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_location(&self) -> DomainResult<Location> {
        Ok(self.location)
    }
}

/// Provider for when no location source is available.
#[derive(Debug, Clone)]
pub struct NoLocationProvider {
    error: DomainError,
}

impl NoLocationProvider {
    /// No position was configured.
    pub fn unavailable() -> Self {
        Self {
            error: DomainError::LocationUnavailable("no device location configured".into()),
        }
    }

    /// Location access was refused.
    pub fn denied() -> Self {
        Self {
            error: DomainError::PermissionDenied("location access disabled".into()),
        }
    }
}

#[async_trait]
impl LocationProvider for NoLocationProvider {
    async fn current_location(&self) -> DomainResult<Location> {
        Err(self.error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_provider_returns_location() {
        let here = Location::new(48.8566, 2.3522).unwrap();
        let provider = FixedLocationProvider::new(here);
        assert_eq!(provider.current_location().await.unwrap(), here);
    }

    #[tokio::test]
    async fn no_location_provider_reports_failure_kind() {
        assert!(matches!(
            NoLocationProvider::unavailable().current_location().await,
            Err(DomainError::LocationUnavailable(_))
        ));
        assert!(matches!(
            NoLocationProvider::denied().current_location().await,
            Err(DomainError::PermissionDenied(_))
        ));
    }
}
