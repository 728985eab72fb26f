//! Interface layer: REST API and WebSocket update stream

pub mod http;
pub mod ws;

pub use http::create_api_router;
