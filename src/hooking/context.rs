// src/hooking/context.rs
//! Per-invocation call contexts
//!
//! Typed argument records for each hook family. A context is owned by the
//! thread executing the intercepted call and is consumed when the
//! trampoline completes; nothing here is shared between invocations.

use bytes::Bytes;

/// Arguments of one trust-evaluation call.
#[derive(Debug, Clone)]
pub struct TrustContext {
    /// Remote host the chain is being evaluated for.
    pub host: String,

    /// Fingerprint of the leaf certificate, when the host exposes it.
    pub leaf_fingerprint: Option<String>,
}

impl TrustContext {
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            leaf_fingerprint: None,
        }
    }
}

/// Result of a trust evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustVerdict {
    Trusted,
    Untrusted,
}

/// Completion callback of a script-evaluation call. The agent never
/// invokes or replaces this; it is carried through untouched.
pub type ScriptCompletion = Box<dyn FnOnce(Option<String>) + Send>;

/// Arguments of one script-evaluation or content-load call.
pub struct ScriptArgs {
    /// Full script or markup text.
    pub text: String,

    /// Optional host-supplied completion.
    pub completion: Option<ScriptCompletion>,
}

impl ScriptArgs {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completion: None,
        }
    }
}

/// Request descriptor captured at network-task creation.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

/// Response values delivered to a network task's completion callback.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

/// Completion callback of a network task. The installed wrapper captures
/// the response and then delegates here with the values unmodified.
pub type TaskCompletion = Box<dyn FnOnce(HttpResponse) + Send>;

/// Arguments of one network-task-creation call.
pub struct NetworkArgs {
    pub request: HttpRequest,
    pub completion: TaskCompletion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_context() {
        let ctx = TrustContext::for_host("api.example.com");
        assert_eq!(ctx.host, "api.example.com");
        assert!(ctx.leaf_fingerprint.is_none());
    }

    #[test]
    fn test_script_args() {
        let args = ScriptArgs::text_only("document.title");
        assert_eq!(args.text, "document.title");
        assert!(args.completion.is_none());
    }
}
