//! Parking spot aggregate
//!
//! Contains the ParkingSpot entity, the proximity filter, and the
//! persistence store interface.

pub mod model;
pub mod proximity;
pub mod store;

pub use model::{NewParkingSpot, ParkingSpot, SpotId, SpotPatch};
pub use proximity::{filter_nearby, DEFAULT_RADIUS_KM};
pub use store::{SpotStore, StoreError};
