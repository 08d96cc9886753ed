// src/events/schema.rs
//! Event schema
//!
//! The unit transmitted to the Collector. Events are independently
//! deserializable JSON documents; the `timestamp_ns` field is the
//! authoritative ordering key for reconstruction, not arrival order.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Opaque token linking a request event to its eventual response event.
pub type CorrelationId = Ulid;

/// Event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ApiCall,
    ApiResponse,
    WebviewJsExecution,
    WebviewLoadHtml,
    CaptchaJs,
    CertBypass,
}

/// Request/response linkage. On an `api_call` event, `matched` carries
/// the id allocated for the request; it is a promise of linkage, not a
/// claim that a response exists yet (or ever will). On an
/// `api_response` event it carries the id of the previously emitted
/// call, or the response is explicitly `unmatched`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "id")]
pub enum Correlation {
    Matched(CorrelationId),
    Unmatched,
}

/// Payload variants, shaped by the event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EventPayload {
    ApiCall {
        method: String,
        url: String,
        headers: Vec<(String, String)>,
        body: Option<String>,
    },
    ApiResponse {
        status: u16,
        headers: Vec<(String, String)>,
        body: Option<String>,
    },
    Script {
        /// Captured text, clipped to the configured byte budget.
        text: String,
        /// Length of the original text before clipping.
        total_len: usize,
    },
    CertBypass {
        host: String,
    },
}

/// One normalized event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,

    /// Name of the originating hook.
    pub source: String,

    pub payload: EventPayload,

    /// Wall-clock nanoseconds since the Unix epoch.
    pub timestamp_ns: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<Correlation>,
}

impl Event {
    /// Build an event stamped with the current wall clock.
    pub fn now(
        event_type: EventType,
        source: impl Into<String>,
        payload: EventPayload,
        correlation: Option<Correlation>,
    ) -> Self {
        Self {
            event_type,
            source: source.into(),
            payload,
            timestamp_ns: now_ns(),
            correlation,
        }
    }
}

/// Current wall clock in nanoseconds since the Unix epoch.
pub fn now_ns() -> u64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default()
        .max(0) as u64
}
