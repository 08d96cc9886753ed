// src/handlers/script.rs
//! Script-evaluation handler
//!
//! Captures the full script or markup text and passes the call through
//! untouched; the agent observes page behavior, never alters it. The
//! normalizer tags CAPTCHA-vendor content with an additional event.

use crate::events::normalizer::{Normalizer, ScriptKind};
use crate::hooking::context::ScriptArgs;
use crate::hooking::trampoline::{Action, HookHandler};
use crate::utils::errors::Result;
use std::sync::Arc;

pub struct ScriptHandler {
    hook: String,
    kind: ScriptKind,
    normalizer: Arc<Normalizer>,
}

impl ScriptHandler {
    pub fn new(hook: impl Into<String>, kind: ScriptKind, normalizer: Arc<Normalizer>) -> Self {
        Self {
            hook: hook.into(),
            kind,
            normalizer,
        }
    }
}

impl HookHandler<ScriptArgs, ()> for ScriptHandler {
    fn observe(&self, args: &ScriptArgs) -> Result<Action<ScriptArgs, ()>> {
        self.normalizer
            .script_evaluated(&self.hook, self.kind, &args.text);
        Ok(Action::Passthrough)
    }
}
