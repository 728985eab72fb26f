//! Persistence store interface

use std::collections::HashSet;

use thiserror::Error;

use super::model::{ParkingSpot, SpotId};
use crate::domain::geo::validate_coordinates;
use crate::domain::DomainError;

/// Errors raised by a snapshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt snapshot: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Parsed, but breaks a collection invariant.
    #[error("Inconsistent snapshot: {0}")]
    Inconsistent(String),
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        DomainError::Storage(e.to_string())
    }
}

/// Device-local store holding one flat snapshot of the spot collection.
///
/// Every `save` replaces the previous snapshot wholesale.
pub trait SpotStore: Send + Sync {
    /// Write the full collection, replacing any prior snapshot.
    fn save(&self, spots: &[ParkingSpot]) -> Result<(), StoreError>;

    /// Read the last snapshot. `Ok(None)` when nothing was ever saved.
    fn read(&self) -> Result<Option<Vec<ParkingSpot>>, StoreError>;

    /// Last saved collection, or empty if none exists, it cannot be read,
    /// or it fails [`check_snapshot`].
    fn load(&self) -> Vec<ParkingSpot> {
        let checked = self
            .read()
            .and_then(|spots| spots.map(|s| check_snapshot(&s).map(|_| s)).transpose());

        match checked {
            Ok(Some(spots)) => spots,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Spot snapshot unusable, starting empty");
                Vec::new()
            }
        }
    }
}

/// Reject snapshots a registry could not have written: repeated ids,
/// ids with no successor, or out-of-range coordinates.
pub fn check_snapshot(spots: &[ParkingSpot]) -> Result<(), StoreError> {
    let mut seen: HashSet<SpotId> = HashSet::with_capacity(spots.len());

    for spot in spots {
        if !seen.insert(spot.id) {
            return Err(StoreError::Inconsistent(format!(
                "duplicate spot id {}",
                spot.id
            )));
        }
        if spot.id == SpotId::MAX {
            return Err(StoreError::Inconsistent(format!(
                "spot id {} leaves no room for new ids",
                spot.id
            )));
        }
        validate_coordinates(spot.latitude, spot.longitude).map_err(|e| {
            StoreError::Inconsistent(format!("spot {}: {}", spot.id, e))
        })?;
    }
    Ok(())
}
