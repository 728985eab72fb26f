//! Infrastructure layer - external concerns

pub mod geocoding;
pub mod location;
pub mod storage;

pub use geocoding::{FailingAddressResolver, MockAddressResolver, NominatimResolver};
pub use location::{FixedLocationProvider, NoLocationProvider};
pub use storage::{InMemoryStore, JsonFileStore};
