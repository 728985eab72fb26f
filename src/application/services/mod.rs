//! Application services

pub mod spot_service;

pub use spot_service::{AddedSpot, SharedSpotService, SpotService};
