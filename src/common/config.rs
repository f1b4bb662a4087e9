//! Runtime configuration loaded from the process environment.
//!
//! Android gives native libraries no configuration channel besides the
//! environment, so every knob has a default that is correct for release builds.

use std::env;

/// Output format for log lines.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Snapshot of configuration values consumed by the adapter.
#[derive(Clone, Debug)]
pub struct AdapterCfg {
    /// `EnvFilter` directive, e.g. `info` or `wg_go=debug`.
    pub log_filter: String,
    pub log_format: LogFormat,
    pub log_target: bool,
}

impl Default for AdapterCfg {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            log_format: LogFormat::Text,
            log_target: false,
        }
    }
}

impl AdapterCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            log_filter: lookup("WG_GO_LOG")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_filter),
            log_format: lookup("WG_GO_LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.log_format),
            log_target: lookup("WG_GO_LOG_TARGET")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(defaults.log_target),
        }
    }
}
