// src/events/mod.rs
//! Event normalization
//!
//! Converts raw handler captures into the typed event schema:
//!
//! - **Schema**: the event record transmitted to the Collector
//! - **Classifier**: keyword-based relevance tagging
//! - **Correlation**: pending-call table linking requests to responses
//! - **Normalizer**: the shaping façade handed to handlers
//!
//! # Architecture
//!
//! ```text
//! Handler capture → Normalizer ── classify ── correlate → Event → Relay
//! ```

pub mod classifier;
pub mod correlation;
pub mod normalizer;
pub mod schema;

// Re-export commonly used types
pub use classifier::{Classifier, DEFAULT_MARKERS};
pub use correlation::{CorrelationConfig, CorrelationTable};
pub use normalizer::{Normalizer, ScriptKind};
pub use schema::{Correlation, CorrelationId, Event, EventPayload, EventType};
