//! Entry points for the managed caller.
//!
//! [`adapter`] holds the operations themselves; [`ffi`] is the thin JNI skin
//! that turns their results into sentinels.

pub mod adapter;
pub mod ffi;

pub use adapter::{version_string, Adapter};
