//! Peer keys and transfer counters.

use std::collections::HashMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

/// Length in bytes of a Curve25519 public key.
pub const KEY_LEN: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyFormatError {
    #[error("key must be {expected} hex characters, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("key is not valid hex")]
    Content,
}

/// A WireGuard peer public key.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; KEY_LEN]);

impl PublicKey {
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse the lowercase hex form used by the UAPI.
    pub fn from_hex(hex_key: &str) -> Result<Self, KeyFormatError> {
        if hex_key.len() != KEY_LEN * 2 {
            return Err(KeyFormatError::Length {
                expected: KEY_LEN * 2,
                actual: hex_key.len(),
            });
        }
        let mut bytes = [0u8; KEY_LEN];
        hex::decode_to_slice(hex_key, &mut bytes).map_err(|_| KeyFormatError::Content)?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The base64 form shown to users and used in wg-quick files.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_base64())
    }
}

/// Counters for one peer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PeerStats {
    pub rx_bytes: i64,
    pub tx_bytes: i64,
    pub latest_handshake_epoch_millis: i64,
}

/// Counters for every peer of one tunnel.
#[derive(Clone, Debug, Default)]
pub struct Statistics {
    peers: HashMap<PublicKey, PeerStats>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `stats` for `key`, replacing earlier values.
    pub fn add(&mut self, key: PublicKey, stats: PeerStats) {
        self.peers.insert(key, stats);
    }

    pub fn peer(&self, key: &PublicKey) -> Option<&PeerStats> {
        self.peers.get(key)
    }

    pub fn peers(&self) -> impl Iterator<Item = &PublicKey> {
        self.peers.keys()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Received bytes over all peers, saturating at `i64::MAX`.
    pub fn total_rx(&self) -> i64 {
        self.peers
            .values()
            .fold(0i64, |acc, p| acc.saturating_add(p.rx_bytes))
    }

    /// Transmitted bytes over all peers, saturating at `i64::MAX`.
    pub fn total_tx(&self) -> i64 {
        self.peers
            .values()
            .fold(0i64, |acc, p| acc.saturating_add(p.tx_bytes))
    }
}
