//! # parkspot
//!
//! Shared parking spot registry with live update fan-out and proximity
//! search.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: spot model, geodesic math, proximity filter, ports
//! - **application**: registry commit path, update broadcaster, use cases
//! - **infrastructure**: snapshot stores, address resolvers, location providers
//! - **interfaces**: REST API and WebSocket update stream
//! - **server**: runtime wiring and lifecycle

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod support;

pub use config::{default_config_path, AppConfig};

pub use application::{SharedSpotService, SpotRegistry, SpotService, UpdateBroadcaster};
pub use domain::{DomainError, DomainResult, Location, ParkingSpot, SpotId, SpotsUpdated};

pub use interfaces::create_api_router;
pub use server::{build_service, init_tracing, ServerHandle, ServerOptions};
