// src/observability.rs
//! Tracing initialization
//!
//! The agent logs through `tracing`; inside a host process the subscriber
//! is expected to be installed exactly once, at attach time. Filtering is
//! controlled by `RUST_LOG`, defaulting to `tapwire=info`.

use crate::utils::errors::{AgentError, Result};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tapwire=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| AgentError::Config(format!("tracing init failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent_enough() {
        // First call may succeed or find a subscriber already installed
        // by another test; a second call must report the conflict rather
        // than panic.
        let _ = init_tracing();
        let second = init_tracing();
        assert!(second.is_err());
    }
}
