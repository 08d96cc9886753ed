// src/events/normalizer.rs
//! Event normalizer
//!
//! Shapes raw handler captures into the event schema and applies
//! relevance classification. Pure transformation, except for correlation
//! id allocation and the pending-call table.

use crate::events::classifier::Classifier;
use crate::events::correlation::CorrelationTable;
use crate::events::schema::{Correlation, CorrelationId, Event, EventPayload, EventType};
use crate::hooking::context::{HttpRequest, HttpResponse};
use crate::relay::channel::RelayHandle;
use bytes::Bytes;
use std::sync::Arc;

/// Which script-family entry point produced a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Evaluate,
    LoadHtml,
}

impl ScriptKind {
    fn event_type(self) -> EventType {
        match self {
            ScriptKind::Evaluate => EventType::WebviewJsExecution,
            ScriptKind::LoadHtml => EventType::WebviewLoadHtml,
        }
    }
}

/// Normalizer façade handed to every handler.
pub struct Normalizer {
    relay: RelayHandle,
    correlation: Arc<CorrelationTable>,
    classifier: Classifier,
    max_capture_bytes: usize,
}

impl Normalizer {
    pub fn new(
        relay: RelayHandle,
        correlation: Arc<CorrelationTable>,
        classifier: Classifier,
        max_capture_bytes: usize,
    ) -> Self {
        Self {
            relay,
            correlation,
            classifier,
            max_capture_bytes,
        }
    }

    pub fn correlation(&self) -> &Arc<CorrelationTable> {
        &self.correlation
    }

    /// A trust evaluation was intercepted and its result forced.
    pub fn trust_forced(&self, source: &str, host: &str) {
        self.relay.emit(Event::now(
            EventType::CertBypass,
            source,
            EventPayload::CertBypass {
                host: host.to_string(),
            },
            None,
        ));
    }

    /// Script or markup text was captured. Emits the capture event and,
    /// when the classifier matches, a second relevance-tagged event with
    /// the same payload.
    pub fn script_evaluated(&self, source: &str, kind: ScriptKind, text: &str) {
        let payload = EventPayload::Script {
            text: self.clip(text),
            total_len: text.len(),
        };

        self.relay
            .emit(Event::now(kind.event_type(), source, payload.clone(), None));

        // Classification runs over the full text, not the clipped copy.
        if self.classifier.is_relevant(text) {
            self.relay
                .emit(Event::now(EventType::CaptchaJs, source, payload, None));
        }
    }

    /// A network task was created. Allocates a correlation id, emits the
    /// `api_call` event, and returns the id for the completion wrapper.
    pub fn begin_request(&self, source: &str, request: &HttpRequest) -> CorrelationId {
        let id = self.correlation.allocate();
        self.relay.emit(Event::now(
            EventType::ApiCall,
            source,
            EventPayload::ApiCall {
                method: request.method.clone(),
                url: request.url.clone(),
                headers: request.headers.clone(),
                body: request.body.as_ref().map(|b| self.clip_bytes(b)),
            },
            Some(Correlation::Matched(id)),
        ));
        id
    }

    /// A wrapped completion callback fired. Emits the `api_response`
    /// event, matched when the call is still within the prune window.
    pub fn complete_request(&self, source: &str, id: CorrelationId, response: &HttpResponse) {
        let correlation = self.correlation.resolve(id);
        self.relay.emit(Event::now(
            EventType::ApiResponse,
            source,
            EventPayload::ApiResponse {
                status: response.status,
                headers: response.headers.clone(),
                body: response.body.as_ref().map(|b| self.clip_bytes(b)),
            },
            Some(correlation),
        ));
    }

    /// Clip text to the capture budget on a char boundary.
    fn clip(&self, text: &str) -> String {
        if text.len() <= self.max_capture_bytes {
            return text.to_string();
        }
        let mut end = self.max_capture_bytes;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        text[..end].to_string()
    }

    fn clip_bytes(&self, bytes: &Bytes) -> String {
        self.clip(&String::from_utf8_lossy(bytes))
    }
}
