// src/lib.rs
//! Tapwire Runtime Interception Agent
//!
//! An in-process agent that redirects execution at a small, fixed set of
//! native entry points in a running host, extracts structured data at
//! those points, and relays it to an out-of-process collector in real
//! time.
//!
//! # Architecture
//!
//! The agent is structured into several key modules:
//!
//! - **hooking**: entry-point resolution, hook slots, trampolines
//! - **handlers**: trust / script / network hook semantics
//! - **events**: event schema, classification, request correlation
//! - **relay**: bounded queue and framed transport to the collector
//! - **session**: attach/detach lifecycle
//!
//! ```text
//! Host Call → Trampoline → Handler → Normalizer → Relay → Collector
//! ```
//!
//! Control flow is the reverse concern: whatever the downstream pipeline
//! does, an intercepted call always either reaches the preserved original
//! implementation or is deliberately short-circuited by policy.

// Public module exports
pub mod events;
pub mod handlers;
pub mod hooking;
pub mod observability;
pub mod relay;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use events::schema::{Correlation, CorrelationId, Event, EventPayload, EventType};
pub use hooking::context::{
    HttpRequest, HttpResponse, NetworkArgs, ScriptArgs, TrustContext, TrustVerdict,
};
pub use hooking::descriptor::{HookDescriptor, HookFamily, HookPolicy, TargetSpec};
pub use hooking::resolver::{Module, ModuleMap};
pub use session::Session;
pub use utils::config::AgentConfig;
pub use utils::errors::{AgentError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
