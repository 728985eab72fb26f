//! REST API handlers

pub mod health;
pub mod spots;

pub use spots::SpotAppState;
