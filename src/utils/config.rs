// src/utils/config.rs
//! Agent configuration
//!
//! Layered configuration in the usual order: built-in defaults, then an
//! optional `tapwire.toml` next to the process, then `TAPWIRE_*`
//! environment variables. Everything is defaulted so a zero-config attach
//! works against the built-in descriptor set.

use crate::events::correlation::CorrelationConfig;
use crate::hooking::descriptor::HookDescriptor;
use crate::relay::channel::RelayConfig;
use crate::utils::errors::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Capture limits and classification rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Maximum number of bytes of script/body text retained per event.
    /// Longer captures are clipped; the original length is recorded.
    pub max_capture_bytes: usize,

    /// Case-insensitive substrings marking CAPTCHA-vendor content.
    pub captcha_markers: Vec<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_capture_bytes: 256 * 1024,
            captcha_markers: crate::events::classifier::DEFAULT_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

/// Top-level agent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Relay channel settings
    pub relay: RelayConfig,

    /// Correlation table settings
    pub correlation: CorrelationConfig,

    /// Capture limits and classification rules
    pub capture: CaptureConfig,

    /// Hook descriptors to install at attach. Empty means the built-in set.
    pub hooks: Vec<HookDescriptor>,
}

impl AgentConfig {
    /// Load configuration from the default sources.
    pub fn load() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name("tapwire").required(false))
            .add_source(config::Environment::with_prefix("TAPWIRE").separator("__"))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }

    /// Load configuration from an explicit file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }

    /// Descriptors to install: the configured set, or the built-in set
    /// when the configuration names none.
    pub fn descriptors(&self) -> Vec<HookDescriptor> {
        if self.hooks.is_empty() {
            HookDescriptor::builtin_set()
        } else {
            self.hooks.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert!(config.capture.max_capture_bytes > 0);
        assert!(config
            .capture
            .captcha_markers
            .iter()
            .any(|m| m == "arkose"));
        assert!(config.hooks.is_empty());
        assert!(!config.descriptors().is_empty());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tapwire.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[relay]
collector_addr = "127.0.0.1:9999"
queue_capacity = 64

[correlation]
prune_window_ms = 1000
"#
        )
        .unwrap();

        let config = AgentConfig::from_file(&path).unwrap();
        assert_eq!(config.relay.collector_addr, "127.0.0.1:9999");
        assert_eq!(config.relay.queue_capacity, 64);
        assert_eq!(config.correlation.prune_window_ms, 1000);
        // Unspecified sections fall back to defaults
        assert!(config.capture.max_capture_bytes > 0);
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = AgentConfig::from_file(Path::new("/nonexistent/tapwire.toml"));
        assert!(result.is_err());
    }
}
