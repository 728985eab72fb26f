//! Application layer - use cases over the spot registry
//!
//! - `events`: update broadcaster (callbacks + async feed)
//! - `registry`: canonical collection, commit path
//! - `services`: spot use cases combining registry, resolver and location

pub mod events;
pub mod registry;
pub mod services;

pub use events::{Subscription, UpdateBroadcaster, UpdateFeed};
pub use registry::SpotRegistry;
pub use services::{AddedSpot, SharedSpotService, SpotService};
