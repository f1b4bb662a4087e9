//! JNI bridge between the Android `GoBackend` and the wireguard-go engine.
//!
//! Build with `--features libwg` to link the engine and export the natives.
pub mod api;
pub mod common;
pub mod engine;
pub mod runtime;
pub mod stats;

#[cfg(test)]
mod testing;

pub use api::Adapter;
pub use common::{AdapterError, AdapterResult};
pub use engine::{Engine, GoString, TunnelHandle};
pub use runtime::{BorrowedText, JniRuntime, ManagedRuntime};
