//! Per-peer transfer statistics read back from a running tunnel.

pub mod domain;
pub mod service;

pub use domain::{KeyFormatError, PeerStats, PublicKey, Statistics};
pub use service::{fetch, parse_statistics};
