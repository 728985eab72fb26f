//! Spot collection change notifications

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::spot::{ParkingSpot, SpotId};

/// Immutable snapshot of the canonical collection.
pub type SpotCollection = Arc<[ParkingSpot]>;

/// What a committed mutation did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "spot_id", rename_all = "snake_case")]
pub enum SpotChange {
    Created(SpotId),
    Updated(SpotId),
}

impl SpotChange {
    pub fn event_type(&self) -> &'static str {
        match self {
            SpotChange::Created(_) => "spot_created",
            SpotChange::Updated(_) => "spot_updated",
        }
    }

    pub fn spot_id(&self) -> SpotId {
        match self {
            SpotChange::Created(id) | SpotChange::Updated(id) => *id,
        }
    }
}

/// One message per committed mutation, carrying the full updated collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotsUpdated {
    /// Commit sequence number, increasing by one per mutation
    pub sequence: u64,
    pub committed_at: DateTime<Utc>,
    pub change: SpotChange,
    pub spots: SpotCollection,
}

impl SpotsUpdated {
    pub fn new(sequence: u64, change: SpotChange, spots: SpotCollection) -> Self {
        Self {
            sequence,
            committed_at: Utc::now(),
            change,
            spots,
        }
    }
}
