// src/handlers/network.rs
//! Network-task handler
//!
//! Captures the request at task creation, then wraps the caller-supplied
//! completion callback in a decorator that is indistinguishable to the
//! caller from the original: when the networking stack eventually invokes
//! it, the wrapper captures the response, emits it under the same
//! correlation id, and only then delegates to the original callback with
//! the values unmodified. A request that never completes simply stays
//! unmatched.

use crate::events::normalizer::Normalizer;
use crate::hooking::context::{HttpResponse, NetworkArgs};
use crate::hooking::trampoline::{contain, Action, HookHandler};
use crate::utils::errors::Result;
use std::sync::Arc;
use tracing::debug;

pub struct NetworkHandler {
    hook: String,
    normalizer: Arc<Normalizer>,
}

impl NetworkHandler {
    pub fn new(hook: impl Into<String>, normalizer: Arc<Normalizer>) -> Self {
        Self {
            hook: hook.into(),
            normalizer,
        }
    }
}

impl HookHandler<NetworkArgs, ()> for NetworkHandler {
    fn observe(&self, args: &NetworkArgs) -> Result<Action<NetworkArgs, ()>> {
        let id = self.normalizer.begin_request(&self.hook, &args.request);
        debug!(hook = %self.hook, url = %args.request.url, correlation = %id, "request captured");

        let normalizer = Arc::clone(&self.normalizer);
        let hook = self.hook.clone();
        Ok(Action::Rewrite(Box::new(move |mut args: NetworkArgs| {
            let original = args.completion;
            args.completion = Box::new(move |response: HttpResponse| {
                // The wrapper fires on a host networking thread, outside
                // any trampoline; a capture fault must not unwind there
                // or cost the caller its completion.
                contain(&hook, || normalizer.complete_request(&hook, id, &response));
                original(response);
            });
            args
        })))
    }
}
