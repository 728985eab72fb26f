//! In-memory snapshot store

use std::sync::{Mutex, PoisonError};

use crate::domain::{ParkingSpot, SpotStore, StoreError};

/// In-memory store for development and testing.
///
/// Holds the serialized snapshot, so it round-trips through the same
/// encoding as the file store and can be seeded with arbitrary raw data.
#[derive(Default)]
pub struct InMemoryStore {
    raw: Mutex<Option<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a raw serialized value, which need not be valid
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SpotStore for InMemoryStore {
    fn save(&self, spots: &[ParkingSpot]) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(spots)?;
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = Some(encoded);
        Ok(())
    }

    fn read(&self) -> Result<Option<Vec<ParkingSpot>>, StoreError> {
        match self.raw() {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot(id: i64) -> ParkingSpot {
        ParkingSpot {
            id,
            latitude: 48.8566,
            longitude: 2.3522,
            available: id % 2 == 0,
            address: None,
        }
    }

    #[test]
    fn empty_store_loads_empty() {
        assert!(InMemoryStore::new().load().is_empty());
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let store = InMemoryStore::new();
        store.save(&[spot(1), spot(2)]).unwrap();
        store.save(&[spot(3)]).unwrap();

        assert_eq!(store.load(), vec![spot(3)]);
    }

    #[test]
    fn corrupt_data_loads_empty() {
        let store = InMemoryStore::with_raw("{not json");
        assert!(matches!(store.read(), Err(StoreError::Corrupt(_))));
        assert!(store.load().is_empty());
    }

    #[test]
    fn wrong_shape_loads_empty() {
        let store = InMemoryStore::with_raw(r#"{"id": 1}"#);
        assert!(store.load().is_empty());
    }

    #[test]
    fn reads_snapshot_without_address_field() {
        let store = InMemoryStore::with_raw(
            r#"[{"id":5,"latitude":1.5,"longitude":-2.5,"available":false}]"#,
        );
        let spots = store.load();
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0].id, 5);
        assert!(spots[0].address.is_none());
    }

    #[test]
    fn inconsistent_snapshot_loads_empty() {
        let mut duplicate = spot(1);
        duplicate.latitude = 10.0;
        let store = InMemoryStore::new();
        store.save(&[spot(1), duplicate]).unwrap();

        // read() still returns the raw collection; only load() enforces invariants
        assert_eq!(store.read().unwrap().map(|s| s.len()), Some(2));
        assert!(store.load().is_empty());
        assert!(matches!(
            crate::domain::spot::store::check_snapshot(&[spot(1), spot(1)]),
            Err(StoreError::Inconsistent(_))
        ));
    }
}
