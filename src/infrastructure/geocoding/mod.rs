//! Remote address resolvers

mod mock;
mod nominatim;

pub use mock::{FailingAddressResolver, MockAddressResolver};
pub use nominatim::{NominatimResolver, DEFAULT_NOMINATIM_URL};
