//! Transfer statistics from UAPI `get` output.

use tracing::debug;

use super::domain::{PeerStats, PublicKey, Statistics};
use crate::common::buf::NativeBuffer;
use crate::engine::{Engine, TunnelHandle};

/// Read the configuration of `handle` and parse it. `None` when the engine
/// has no configuration for it.
pub fn fetch<E: Engine + ?Sized>(engine: &E, handle: TunnelHandle) -> Option<Statistics> {
    let text = unsafe { NativeBuffer::from_raw(engine, engine.config(handle)) }?;
    let stats = parse_statistics(&text.to_string_lossy());
    debug!(?handle, peers = stats.len(), "collected statistics");
    Some(stats)
}

/// Collect per-peer counters from UAPI text.
///
/// Lines before the first `public_key=` belong to the interface and are
/// skipped, as are the lines of a peer whose key does not parse.
pub fn parse_statistics(config: &str) -> Statistics {
    let mut stats = Statistics::new();
    let mut key: Option<PublicKey> = None;
    let mut current = PeerStats::default();

    for line in config.split('\n') {
        if let Some(value) = line.strip_prefix("public_key=") {
            if let Some(key) = key {
                stats.add(key, current);
            }
            current = PeerStats::default();
            key = PublicKey::from_hex(value).ok();
            continue;
        }
        if key.is_none() {
            continue;
        }

        if let Some(value) = line.strip_prefix("rx_bytes=") {
            current.rx_bytes = value.parse().unwrap_or(0);
        } else if let Some(value) = line.strip_prefix("tx_bytes=") {
            current.tx_bytes = value.parse().unwrap_or(0);
        } else if let Some(value) = line.strip_prefix("last_handshake_time_sec=") {
            current.latest_handshake_epoch_millis = match value.parse::<i64>() {
                Ok(sec) => current
                    .latest_handshake_epoch_millis
                    .saturating_add(sec.saturating_mul(1000)),
                Err(_) => 0,
            };
        } else if let Some(value) = line.strip_prefix("last_handshake_time_nsec=") {
            current.latest_handshake_epoch_millis = match value.parse::<i64>() {
                Ok(nsec) => current
                    .latest_handshake_epoch_millis
                    .saturating_add(nsec / 1_000_000),
                Err(_) => 0,
            };
        }
    }

    if let Some(key) = key {
        stats.add(key, current);
    }
    stats
}
