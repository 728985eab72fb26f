//! HTTP REST API interfaces
//!
//! - `common`: response envelope, error mapping, validated JSON
//! - `dto`: request and response bodies
//! - `handlers`: request handlers
//! - `router`: route table

pub mod common;
pub mod dto;
pub mod handlers;
pub mod router;

pub use router::create_api_router;
