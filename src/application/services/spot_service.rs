//! Parking spot use cases
//!
//! Composes the registry with the address resolver and the location
//! provider. Registry access goes through one async mutex so mutations
//! commit one at a time; the mutex is never held across resolver I/O, so
//! a slow geocoder does not stall other callers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::application::events::{Subscription, UpdateBroadcaster, UpdateFeed};
use crate::application::registry::SpotRegistry;
use crate::domain::{
    filter_nearby, AddressResolver, DomainError, DomainResult, Location, LocationProvider,
    NewParkingSpot, ParkingSpot, SpotCollection, SpotId, SpotPatch, SpotsUpdated,
    DEFAULT_RADIUS_KM,
};

const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of adding a spot.
///
/// The spot is committed even when the address lookup fails; the lookup
/// error is reported alongside it.
#[derive(Debug, Clone)]
pub struct AddedSpot {
    pub spot: ParkingSpot,
    pub address_error: Option<DomainError>,
}

/// Service for parking spot operations
pub struct SpotService {
    registry: Mutex<SpotRegistry>,
    broadcaster: UpdateBroadcaster,
    resolver: Arc<dyn AddressResolver>,
    location: Arc<dyn LocationProvider>,
    radius_km: f64,
    resolve_timeout: Duration,
}

/// Shared, reference-counted spot service
pub type SharedSpotService = Arc<SpotService>;

impl SpotService {
    pub fn new(
        registry: SpotRegistry,
        resolver: Arc<dyn AddressResolver>,
        location: Arc<dyn LocationProvider>,
    ) -> Self {
        let broadcaster = registry.broadcaster().clone();
        Self {
            registry: Mutex::new(registry),
            broadcaster,
            resolver,
            location,
            radius_km: DEFAULT_RADIUS_KM,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }

    /// Default radius for [`SpotService::nearby`]
    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    // ── Queries ────────────────────────────────────────────────

    pub async fn list(&self) -> SpotCollection {
        self.registry.lock().await.snapshot()
    }

    pub async fn get(&self, id: SpotId) -> DomainResult<ParkingSpot> {
        self.registry
            .lock()
            .await
            .get(id)
            .ok_or_else(|| DomainError::spot_not_found(id))
    }

    /// Available spots within `radius_km` (or the default) of `location`.
    ///
    /// No location means nothing can be shown yet: an empty list, not an error.
    pub async fn nearby(
        &self,
        location: Option<Location>,
        radius_km: Option<f64>,
    ) -> DomainResult<Vec<ParkingSpot>> {
        let radius_km = radius_km.unwrap_or(self.radius_km);
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(DomainError::Validation(format!(
                "radius_km must be a non-negative number, got {}",
                radius_km
            )));
        }

        let spots = self.list().await;
        Ok(filter_nearby(&spots, location.as_ref(), radius_km))
    }

    pub async fn current_location(&self) -> DomainResult<Location> {
        self.location.current_location().await
    }

    // ── Mutations ──────────────────────────────────────────────

    /// Add a spot at the device's current location.
    pub async fn add_spot_here(&self) -> DomainResult<AddedSpot> {
        let location = self.current_location().await?;
        self.add_spot(location).await
    }

    /// Commit a new available spot, then attach its resolved address.
    pub async fn add_spot(&self, location: Location) -> DomainResult<AddedSpot> {
        let spot = self
            .registry
            .lock()
            .await
            .create(NewParkingSpot::at(location))?;

        match self.resolve(spot.latitude, spot.longitude).await {
            Ok(address) => {
                let enriched = self
                    .registry
                    .lock()
                    .await
                    .update(spot.id, SpotPatch::address(address));
                match enriched {
                    Ok(spot) => Ok(AddedSpot {
                        spot,
                        address_error: None,
                    }),
                    Err(e) => {
                        warn!(spot_id = spot.id, error = %e, "Failed to attach address to spot");
                        Ok(AddedSpot {
                            spot,
                            address_error: Some(e),
                        })
                    }
                }
            }
            Err(e) => {
                warn!(spot_id = spot.id, error = %e, "Address lookup failed, spot kept without address");
                Ok(AddedSpot {
                    spot,
                    address_error: Some(e),
                })
            }
        }
    }

    pub async fn update(&self, id: SpotId, patch: SpotPatch) -> DomainResult<ParkingSpot> {
        self.registry.lock().await.update(id, patch)
    }

    /// Take an available spot.
    pub async fn reserve(&self, id: SpotId) -> DomainResult<ParkingSpot> {
        let mut registry = self.registry.lock().await;
        let spot = registry
            .get(id)
            .ok_or_else(|| DomainError::spot_not_found(id))?;
        if !spot.available {
            return Err(DomainError::SpotUnavailable(id));
        }

        let reserved = registry.update(id, SpotPatch::availability(false))?;
        info!(spot_id = id, "Parking spot reserved");
        Ok(reserved)
    }

    /// Release a spot back to the available pool.
    pub async fn unreserve(&self, id: SpotId) -> DomainResult<ParkingSpot> {
        let released = self.update(id, SpotPatch::availability(true)).await?;
        info!(spot_id = id, "Parking spot released");
        Ok(released)
    }

    /// Report a spot as taken by someone else.
    pub async fn mark_unavailable(&self, id: SpotId) -> DomainResult<ParkingSpot> {
        let spot = self.update(id, SpotPatch::availability(false)).await?;
        info!(spot_id = id, "Parking spot marked unavailable");
        Ok(spot)
    }

    /// Look up the address of an existing spot again and store it.
    pub async fn refresh_address(&self, id: SpotId) -> DomainResult<ParkingSpot> {
        let spot = self.get(id).await?;
        let address = self.resolve(spot.latitude, spot.longitude).await?;
        self.update(id, SpotPatch::address(address)).await
    }

    // ── Observers ──────────────────────────────────────────────

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SpotsUpdated) + Send + Sync + 'static,
    {
        self.broadcaster.subscribe(callback)
    }

    /// Async feed of every update committed from now on
    pub fn updates(&self) -> UpdateFeed {
        self.broadcaster.feed()
    }

    /// Number of open [`UpdateFeed`]s (e.g. connected WebSocket clients)
    pub fn update_feed_count(&self) -> usize {
        self.broadcaster.feed_count()
    }

    async fn resolve(&self, latitude: f64, longitude: f64) -> DomainResult<String> {
        match tokio::time::timeout(self.resolve_timeout, self.resolver.resolve(latitude, longitude))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(DomainError::Network(format!(
                "address lookup timed out after {:?}",
                self.resolve_timeout
            ))),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
