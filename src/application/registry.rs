//! Spot registry: sole owner and writer of the canonical spot collection
//!
//! Every mutation follows the same commit path: build the next collection,
//! persist it, swap it in, then broadcast it. A mutation that fails at any
//! step before the swap leaves the collection exactly as it was.
//!
//! Updates are last-write-wins. There is no version check: two callers
//! patching the same spot both succeed and the later commit is what stays.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::events::{Subscription, UpdateBroadcaster};
use crate::domain::{
    DomainError, DomainResult, NewParkingSpot, ParkingSpot, SpotChange, SpotCollection, SpotId,
    SpotPatch, SpotStore, SpotsUpdated,
};

/// Canonical in-memory collection of parking spots.
///
/// Mutating methods take `&mut self`, so there is exactly one writer at a time.
pub struct SpotRegistry {
    spots: Vec<ParkingSpot>,
    next_id: SpotId,
    sequence: u64,
    store: Arc<dyn SpotStore>,
    broadcaster: UpdateBroadcaster,
}

impl SpotRegistry {
    /// Build the registry from the store's last snapshot.
    ///
    /// This is the only place the snapshot is read; an unreadable or
    /// inconsistent snapshot yields an empty collection.
    pub fn load_initial(store: Arc<dyn SpotStore>, broadcaster: UpdateBroadcaster) -> Self {
        let mut spots = store.load();
        let next_id = match spots.iter().map(|s| s.id).max().unwrap_or(0).checked_add(1) {
            Some(id) => id,
            None => {
                warn!("Spot ids in snapshot are exhausted, starting empty");
                spots.clear();
                1
            }
        };
        info!(count = spots.len(), next_id, "Spot registry loaded");

        Self {
            spots,
            next_id,
            sequence: 0,
            store,
            broadcaster,
        }
    }

    /// Add a new spot with a freshly assigned id.
    pub fn create(&mut self, new_spot: NewParkingSpot) -> DomainResult<ParkingSpot> {
        new_spot.validate()?;

        let following = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| DomainError::Storage("spot id space exhausted".into()))?;

        let spot = new_spot.into_spot(self.next_id);
        let mut next = self.spots.clone();
        next.push(spot.clone());

        self.commit(next, SpotChange::Created(spot.id))?;
        self.next_id = following;

        info!(
            spot_id = spot.id,
            latitude = spot.latitude,
            longitude = spot.longitude,
            "Parking spot created"
        );
        Ok(spot)
    }

    /// Apply the supplied fields of `patch` to spot `id`.
    pub fn update(&mut self, id: SpotId, patch: SpotPatch) -> DomainResult<ParkingSpot> {
        let index = self
            .position(id)
            .ok_or_else(|| DomainError::spot_not_found(id))?;

        let mut updated = self.spots[index].clone();
        updated.apply(&patch)?;

        let mut next = self.spots.clone();
        next[index] = updated.clone();

        self.commit(next, SpotChange::Updated(id))?;

        debug!(spot_id = id, available = updated.available, "Parking spot updated");
        Ok(updated)
    }

    pub fn get(&self, id: SpotId) -> Option<ParkingSpot> {
        self.position(id).map(|i| self.spots[i].clone())
    }

    /// Immutable copy of the current collection
    pub fn snapshot(&self) -> SpotCollection {
        self.spots.clone().into()
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    /// Number of mutations committed since the registry was loaded
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SpotsUpdated) + Send + Sync + 'static,
    {
        self.broadcaster.subscribe(callback)
    }

    pub fn broadcaster(&self) -> &UpdateBroadcaster {
        &self.broadcaster
    }

    fn position(&self, id: SpotId) -> Option<usize> {
        self.spots.iter().position(|s| s.id == id)
    }

    fn commit(&mut self, next: Vec<ParkingSpot>, change: SpotChange) -> DomainResult<()> {
        if let Err(e) = self.store.save(&next) {
            warn!(error = %e, spot_id = change.spot_id(), "Failed to persist spot collection");
            return Err(e.into());
        }

        self.spots = next;
        self.sequence += 1;

        let update = SpotsUpdated::new(self.sequence, change, self.snapshot());
        self.broadcaster.publish(update);
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use crate::domain::StoreError;
    use crate::infrastructure::storage::InMemoryStore;

    /// Store that can be switched into a failing mode
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryStore,
        failing: AtomicBool,
    }

    impl SpotStore for FlakyStore {
        fn save(&self, spots: &[ParkingSpot]) -> Result<(), StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            self.inner.save(spots)
        }

        fn read(&self) -> Result<Option<Vec<ParkingSpot>>, StoreError> {
            self.inner.read()
        }
    }

    fn paris() -> NewParkingSpot {
        NewParkingSpot {
            latitude: 48.8566,
            longitude: 2.3522,
            available: true,
            address: Some("1 Rue de la Paix, 75002 Paris, France".into()),
        }
    }

    fn registry_with(store: Arc<dyn SpotStore>) -> SpotRegistry {
        SpotRegistry::load_initial(store, UpdateBroadcaster::new())
    }

    #[test]
    fn create_assigns_unique_increasing_ids() {
        let mut registry = registry_with(Arc::new(InMemoryStore::new()));
        let a = registry.create(paris()).unwrap();
        let b = registry.create(paris()).unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.sequence(), 2);
    }

    #[test]
    fn created_spot_survives_restart() {
        let store: Arc<dyn SpotStore> = Arc::new(InMemoryStore::new());

        let created = {
            let mut registry = registry_with(store.clone());
            registry.create(paris()).unwrap()
        };

        let reloaded = registry_with(store);
        assert_eq!(&*reloaded.snapshot(), &[created]);
    }

    #[test]
    fn ids_are_not_reused_after_restart() {
        let store: Arc<dyn SpotStore> = Arc::new(InMemoryStore::new());
        {
            let mut registry = registry_with(store.clone());
            registry.create(paris()).unwrap();
            registry.create(paris()).unwrap();
        }

        let mut registry = registry_with(store);
        assert_eq!(registry.create(paris()).unwrap().id, 3);
    }

    #[test]
    fn invalid_coordinates_leave_collection_unchanged() {
        let store = Arc::new(InMemoryStore::new());
        let mut registry = registry_with(store.clone());
        let events = Arc::new(Mutex::new(0));
        let events_clone = events.clone();
        let _sub = registry.subscribe(move |_| *events_clone.lock().unwrap() += 1);

        let err = registry
            .create(NewParkingSpot {
                latitude: 91.0,
                longitude: 0.0,
                available: true,
                address: None,
            })
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert!(registry.is_empty());
        assert_eq!(*events.lock().unwrap(), 0);
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut registry = registry_with(Arc::new(InMemoryStore::new()));
        registry.create(paris()).unwrap();

        let err = registry
            .update(42, SpotPatch::availability(false))
            .unwrap_err();
        assert_eq!(err, DomainError::spot_not_found(42));
        assert_eq!(registry.sequence(), 1);
    }

    #[test]
    fn availability_round_trip_preserves_identity() {
        let mut registry = registry_with(Arc::new(InMemoryStore::new()));
        let original = registry.create(paris()).unwrap();

        let reserved = registry
            .update(original.id, SpotPatch::availability(false))
            .unwrap();
        assert!(!reserved.available);

        let released = registry
            .update(original.id, SpotPatch::availability(true))
            .unwrap();
        assert_eq!(released, original);
        assert_eq!(registry.get(original.id), Some(original));
    }

    #[test]
    fn update_is_last_write_wins() {
        let mut registry = registry_with(Arc::new(InMemoryStore::new()));
        let spot = registry.create(paris()).unwrap();

        registry.update(spot.id, SpotPatch::address("first")).unwrap();
        registry.update(spot.id, SpotPatch::address("second")).unwrap();

        assert_eq!(
            registry.get(spot.id).unwrap().address.as_deref(),
            Some("second")
        );
    }

    #[test]
    fn subscribers_receive_identical_collection_in_order() {
        let mut registry = registry_with(Arc::new(InMemoryStore::new()));
        let received: Arc<Mutex<Vec<(&'static str, SpotCollection)>>> =
            Arc::new(Mutex::new(Vec::new()));

        let r1 = received.clone();
        let _first = registry.subscribe(move |u| r1.lock().unwrap().push(("first", u.spots.clone())));
        let r2 = received.clone();
        let _second = registry.subscribe(move |u| r2.lock().unwrap().push(("second", u.spots.clone())));

        let spot = registry.create(paris()).unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].0, "first");
        assert_eq!(received[1].0, "second");
        assert_eq!(received[0].1, received[1].1);
        assert_eq!(&*received[0].1, &[spot]);
    }

    #[test]
    fn broadcast_sequence_follows_commit_order() {
        let mut registry = registry_with(Arc::new(InMemoryStore::new()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _sub = registry.subscribe(move |u| {
            seen_clone.lock().unwrap().push((u.sequence, u.change));
        });

        let spot = registry.create(paris()).unwrap();
        registry.update(spot.id, SpotPatch::availability(false)).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (1, SpotChange::Created(spot.id)),
                (2, SpotChange::Updated(spot.id)),
            ]
        );
    }

    #[test]
    fn failed_save_rolls_back_and_broadcasts_nothing() {
        let store = Arc::new(FlakyStore::default());
        let mut registry = registry_with(store.clone());
        let spot = registry.create(paris()).unwrap();

        let events = Arc::new(Mutex::new(0));
        let events_clone = events.clone();
        let _sub = registry.subscribe(move |_| *events_clone.lock().unwrap() += 1);

        store.failing.store(true, Ordering::SeqCst);

        let err = registry
            .update(spot.id, SpotPatch::availability(false))
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
        assert!(matches!(registry.create(paris()), Err(DomainError::Storage(_))));

        assert_eq!(registry.get(spot.id), Some(spot));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.sequence(), 1);
        assert_eq!(*events.lock().unwrap(), 0);

        // The id consumed by the failed create is still free
        store.failing.store(false, Ordering::SeqCst);
        assert_eq!(registry.create(paris()).unwrap().id, 2);
    }

    fn seeded(spots: serde_json::Value) -> SpotRegistry {
        registry_with(Arc::new(InMemoryStore::with_raw(spots.to_string())))
    }

    #[test]
    fn duplicate_ids_in_snapshot_start_empty() {
        let mut registry = seeded(serde_json::json!([
            {"id": 1, "latitude": 48.85, "longitude": 2.35, "available": true},
            {"id": 1, "latitude": 48.86, "longitude": 2.36, "available": true}
        ]));

        assert!(registry.is_empty());
        assert_eq!(registry.create(paris()).unwrap().id, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn max_id_in_snapshot_does_not_overflow() {
        let mut registry = seeded(serde_json::json!([
            {"id": i64::MAX, "latitude": 48.85, "longitude": 2.35, "available": true}
        ]));

        assert!(registry.is_empty());
        assert_eq!(registry.create(paris()).unwrap().id, 1);
    }

    #[test]
    fn invalid_coordinates_in_snapshot_start_empty() {
        let registry = seeded(serde_json::json!([
            {"id": 1, "latitude": 48.85, "longitude": 2.35, "available": true},
            {"id": 2, "latitude": 500.0, "longitude": -999.0, "available": true}
        ]));

        assert!(registry.is_empty());
    }

    #[test]
    fn create_fails_when_ids_run_out() {
        let mut registry = seeded(serde_json::json!([
            {"id": i64::MAX - 1, "latitude": 48.85, "longitude": 2.35, "available": true}
        ]));
        assert_eq!(registry.len(), 1);

        let err = registry.create(paris()).unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.sequence(), 0);
    }

    #[test]
    fn snapshot_is_detached_from_registry() {
        let mut registry = registry_with(Arc::new(InMemoryStore::new()));
        let spot = registry.create(paris()).unwrap();
        let before = registry.snapshot();

        registry.update(spot.id, SpotPatch::availability(false)).unwrap();

        assert!(before[0].available);
        assert!(!registry.snapshot()[0].available);
    }
}
