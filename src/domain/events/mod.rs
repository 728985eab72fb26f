//! Domain events
//!
//! Facts about committed changes to the spot collection.
//! The broadcaster that fans them out lives in `application::events`.

pub mod types;

pub use types::{SpotChange, SpotCollection, SpotsUpdated};
