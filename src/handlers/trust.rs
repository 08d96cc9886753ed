// src/handlers/trust.rs
//! Trust-validation handler
//!
//! Logs every trust evaluation and forces a success verdict without ever
//! calling through to the original validator. Each distinct trust
//! mechanism in the host gets its own hooked instance; bypass coverage is
//! only as complete as the installed set.

use crate::events::normalizer::Normalizer;
use crate::hooking::context::{TrustContext, TrustVerdict};
use crate::hooking::trampoline::{Action, HookHandler};
use crate::utils::errors::Result;
use std::sync::Arc;
use tracing::debug;

pub struct TrustHandler {
    hook: String,
    normalizer: Arc<Normalizer>,
}

impl TrustHandler {
    pub fn new(hook: impl Into<String>, normalizer: Arc<Normalizer>) -> Self {
        Self {
            hook: hook.into(),
            normalizer,
        }
    }
}

impl HookHandler<TrustContext, TrustVerdict> for TrustHandler {
    fn observe(&self, args: &TrustContext) -> Result<Action<TrustContext, TrustVerdict>> {
        debug!(hook = %self.hook, host = %args.host, "trust evaluation intercepted");
        self.normalizer.trust_forced(&self.hook, &args.host);
        Ok(Action::ForceResult(TrustVerdict::Trusted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::classifier::Classifier;
    use crate::events::correlation::CorrelationTable;
    use crate::events::schema::EventType;
    use crate::hooking::descriptor::HookPolicy;
    use crate::hooking::trampoline::HookSlot;
    use crate::relay::channel::RelayChannel;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn test_setup() -> (Arc<Normalizer>, crate::relay::channel::RelayChannel) {
        let relay = RelayChannel::new(Default::default());
        let normalizer = Arc::new(Normalizer::new(
            relay.handle(),
            Arc::new(CorrelationTable::new(Duration::from_secs(60))),
            Classifier::default(),
            4096,
        ));
        (normalizer, relay)
    }

    #[test]
    fn test_forces_success_without_calling_original() {
        let (normalizer, relay) = test_setup();
        let queue = relay.queue();

        let original_calls = Arc::new(AtomicUsize::new(0));
        let calls = Arc::clone(&original_calls);
        let slot = HookSlot::new(
            "SecTrustEvaluate",
            Arc::new(move |_: TrustContext| {
                calls.fetch_add(1, Ordering::SeqCst);
                TrustVerdict::Untrusted
            }) as _,
        );
        slot.install(
            "cert_pin",
            HookPolicy::ObserveAndForceResult,
            Arc::new(TrustHandler::new("cert_pin", normalizer)),
        )
        .unwrap();

        // The real validator would reject this chain; the hook forces
        // success regardless.
        let verdict = slot.call(TrustContext::for_host("pinned.example.com"));
        assert_eq!(verdict, TrustVerdict::Trusted);
        assert_eq!(original_calls.load(Ordering::SeqCst), 0);

        let event = queue.try_pop().unwrap();
        assert_eq!(event.event_type, EventType::CertBypass);
        assert_eq!(event.source, "cert_pin");
        assert!(queue.try_pop().is_none());
    }
}
