//! WebSocket interfaces
//!
//! - `notifications`: real-time spot update streaming to clients

pub mod notifications;

pub use notifications::{ws_spot_updates_handler, NotificationState, UpdateFilter};
