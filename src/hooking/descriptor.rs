// src/hooking/descriptor.rs
//! Hook descriptors
//!
//! A descriptor names one interception target: where to find it, which
//! handler family owns it, and what the installed redirect is allowed to
//! do. Descriptors are fixed at attach time and immutable afterwards.

use serde::{Deserialize, Serialize};

/// How a target entry point is located in the loaded modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSpec {
    /// Exact exported symbol name.
    Symbol(String),

    /// Case-insensitive substring match over exported names. Used for
    /// targets whose mangled or versioned names are not stable.
    Pattern(String),
}

impl TargetSpec {
    pub fn describe(&self) -> String {
        match self {
            TargetSpec::Symbol(s) => format!("symbol `{}`", s),
            TargetSpec::Pattern(p) => format!("pattern `{}`", p),
        }
    }
}

/// Handler family attached to a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookFamily {
    /// Certificate/identity trust evaluation.
    TrustEval,

    /// WebView script evaluation.
    ScriptEval,

    /// WebView markup/content loading.
    ContentLoad,

    /// Network task creation with a completion callback.
    NetworkTask,
}

impl HookFamily {
    /// The action policy a family uses unless the descriptor overrides it.
    pub fn default_policy(self) -> HookPolicy {
        match self {
            HookFamily::TrustEval => HookPolicy::ObserveAndForceResult,
            HookFamily::ScriptEval | HookFamily::ContentLoad => {
                HookPolicy::ObserveAndPassthrough
            }
            HookFamily::NetworkTask => HookPolicy::ObserveAndWrapCallback,
        }
    }
}

/// What the trampoline may do with an intercepted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPolicy {
    /// Inspect arguments, then always run the original unchanged.
    ObserveAndPassthrough,

    /// Inspect arguments, then return a forced result without running
    /// the original.
    ObserveAndForceResult,

    /// Inspect arguments, rewrite the caller-supplied callback, then run
    /// the original with the rewritten arguments.
    ObserveAndWrapCallback,
}

/// One interception target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookDescriptor {
    /// Stable hook name; becomes the `source` field on emitted events.
    pub name: String,

    /// Handler family.
    pub family: HookFamily,

    /// How to locate the entry point.
    pub target: TargetSpec,

    /// Policy override; `None` means the family default.
    #[serde(default)]
    pub policy: Option<HookPolicy>,
}

impl HookDescriptor {
    pub fn symbol(
        name: impl Into<String>,
        family: HookFamily,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            family,
            target: TargetSpec::Symbol(symbol.into()),
            policy: None,
        }
    }

    pub fn pattern(
        name: impl Into<String>,
        family: HookFamily,
        pattern: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            family,
            target: TargetSpec::Pattern(pattern.into()),
            policy: None,
        }
    }

    /// Effective policy for this descriptor.
    pub fn policy(&self) -> HookPolicy {
        self.policy.unwrap_or_else(|| self.family.default_policy())
    }

    /// The built-in descriptor set covering every distinct trust
    /// mechanism plus the WebView and networking entry points. Partial
    /// resolution is expected on hosts that lack some of these.
    pub fn builtin_set() -> Vec<HookDescriptor> {
        vec![
            HookDescriptor::symbol(
                "cert_pin_modern",
                HookFamily::TrustEval,
                "SecTrustEvaluateWithError",
            ),
            HookDescriptor::symbol(
                "cert_pin_legacy",
                HookFamily::TrustEval,
                "SecTrustEvaluate",
            ),
            HookDescriptor::symbol(
                "webview_eval",
                HookFamily::ScriptEval,
                "evaluateJavaScript",
            ),
            HookDescriptor::symbol(
                "webview_load",
                HookFamily::ContentLoad,
                "loadHTMLString",
            ),
            HookDescriptor::pattern(
                "url_session_task",
                HookFamily::NetworkTask,
                "dataTaskWithRequest",
            ),
        ]
    }
}
