// src/utils/errors.rs
//! Agent error taxonomy
//!
//! Every failure the agent can produce maps onto one of these variants.
//! Nothing here is allowed to escape a trampoline boundary into the host
//! process; callers inside the agent either handle the variant or log it
//! and fall back to passthrough behavior.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent errors
#[derive(Debug, Error)]
pub enum AgentError {
    /// Target entry point could not be located in the loaded modules.
    /// Non-fatal: the engine continues with the remaining descriptors.
    #[error("target not resolved: {0}")]
    Resolution(String),

    /// The entry point is already redirected by another actor (or by a
    /// previous install of the same descriptor). Logged and skipped.
    #[error("install conflict at {0}")]
    InstallConflict(String),

    /// A failure inside handler logic, caught at the trampoline boundary.
    #[error("handler fault in {hook}: {reason}")]
    HandlerFault { hook: String, reason: String },

    /// The transport to the Collector is down.
    #[error("relay disconnected: {0}")]
    RelayDisconnected(String),

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Underlying I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for AgentError {
    fn from(err: config::ConfigError) -> Self {
        AgentError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = AgentError::Resolution("SecTrustEvaluate".to_string());
        assert!(err.to_string().contains("SecTrustEvaluate"));

        let err = AgentError::HandlerFault {
            hook: "cert_pin".to_string(),
            reason: "boom".to_string(),
        };
        assert!(err.to_string().contains("cert_pin"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "pipe closed");
        let err: AgentError = io.into();
        assert!(matches!(err, AgentError::Io(_)));
    }
}
