//! Shared utilities used on both sides of the boundary.
pub mod buf;
pub mod config;
pub mod error;
pub mod log;

pub use error::{AdapterCode, AdapterError, AdapterResult, SENTINEL_FAILURE};
