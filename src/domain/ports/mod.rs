//! Domain ports

pub mod outbound;

pub use outbound::{AddressResolver, LocationProvider};
