//! Typed views over the merged config document.
//!
//! Only keys actually read by code appear here. Every accessor takes the
//! merged JSON from [`crate::LoadedConfig`] and falls back to a documented
//! default when the key is absent, so an empty config file is always valid.

use anyhow::{bail, Result};
use serde_json::Value;

/// Knobs consumed by the order-placement retry loop.
///
/// Config pointers read:
///   /placement/max_attempts
///   /placement/backoff_base_ms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementSettings {
    /// Total attempts for one submission, counting the first (>= 1).
    pub max_attempts: u32,
    /// Base of the exponential backoff between attempts.
    pub backoff_base_ms: u64,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_ms: 25,
        }
    }
}

impl PlacementSettings {
    pub fn from_config_json(config: &Value) -> Result<Self> {
        let defaults = Self::default();
        let max_attempts = read_u64(config, "/placement/max_attempts")?
            .unwrap_or(defaults.max_attempts as u64);
        if max_attempts == 0 {
            bail!("/placement/max_attempts must be >= 1");
        }
        let backoff_base_ms = read_u64(config, "/placement/backoff_base_ms")?
            .unwrap_or(defaults.backoff_base_ms);
        Ok(Self {
            max_attempts: max_attempts as u32,
            backoff_base_ms,
        })
    }
}

/// Knobs consumed by the daemon at boot.
///
/// Config pointers read:
///   /daemon/bind_addr
///   /daemon/db_max_connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonSettings {
    /// Socket address override; the `BPOS_DAEMON_ADDR` env var wins over this.
    pub bind_addr: Option<String>,
    pub db_max_connections: u32,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            db_max_connections: 10,
        }
    }
}

impl DaemonSettings {
    pub fn from_config_json(config: &Value) -> Result<Self> {
        let defaults = Self::default();
        let bind_addr = match config.pointer("/daemon/bind_addr") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => bail!("/daemon/bind_addr must be a string, got: {other}"),
        };
        let db_max_connections = read_u64(config, "/daemon/db_max_connections")?
            .unwrap_or(defaults.db_max_connections as u64);
        if db_max_connections == 0 {
            bail!("/daemon/db_max_connections must be >= 1");
        }
        Ok(Self {
            bind_addr,
            db_max_connections: db_max_connections as u32,
        })
    }
}

fn read_u64(config: &Value, pointer: &str) -> Result<Option<u64>> {
    match config.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => match v.as_u64() {
            Some(n) => Ok(Some(n)),
            None => bail!("{pointer} must be a non-negative integer, got: {v}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placement_defaults_on_empty_config() {
        let s = PlacementSettings::from_config_json(&json!({})).unwrap();
        assert_eq!(s, PlacementSettings::default());
    }

    #[test]
    fn placement_reads_configured_values() {
        let cfg = json!({"placement": {"max_attempts": 5, "backoff_base_ms": 100}});
        let s = PlacementSettings::from_config_json(&cfg).unwrap();
        assert_eq!(s.max_attempts, 5);
        assert_eq!(s.backoff_base_ms, 100);
    }

    #[test]
    fn placement_rejects_zero_attempts() {
        let cfg = json!({"placement": {"max_attempts": 0}});
        assert!(PlacementSettings::from_config_json(&cfg).is_err());
    }

    #[test]
    fn daemon_bind_addr_is_optional() {
        let s = DaemonSettings::from_config_json(&json!({})).unwrap();
        assert!(s.bind_addr.is_none());
        assert_eq!(s.db_max_connections, 10);

        let cfg = json!({"daemon": {"bind_addr": "0.0.0.0:9000"}});
        let s = DaemonSettings::from_config_json(&cfg).unwrap();
        assert_eq!(s.bind_addr.as_deref(), Some("0.0.0.0:9000"));
    }

    #[test]
    fn daemon_rejects_non_string_bind_addr() {
        let cfg = json!({"daemon": {"bind_addr": 9000}});
        assert!(DaemonSettings::from_config_json(&cfg).is_err());
    }
}
