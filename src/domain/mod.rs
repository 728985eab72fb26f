pub mod error;
pub mod events;
pub mod geo;
pub mod ports;
pub mod spot;

// Re-export commonly used types
pub use error::{DomainError, DomainResult};
pub use events::{SpotChange, SpotCollection, SpotsUpdated};
pub use geo::{haversine_km, Location};
pub use ports::{AddressResolver, LocationProvider};
pub use spot::{
    filter_nearby, NewParkingSpot, ParkingSpot, SpotId, SpotPatch, SpotStore, StoreError,
    DEFAULT_RADIUS_KM,
};
