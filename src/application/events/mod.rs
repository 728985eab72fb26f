//! Application events (pub/sub)
//!
//! Update types are defined in `domain::events`. The broadcaster
//! implementation lives here in the application layer.

pub mod broadcaster;

pub use crate::domain::events::{SpotChange, SpotCollection, SpotsUpdated};

pub use broadcaster::{Subscription, UpdateBroadcaster, UpdateFeed};
