// src/hooking/trampoline.rs
//! Hook slots and trampolines
//!
//! A `HookSlot` models one patched native entry point: it preserves the
//! original implementation and, once a hook is installed, routes every
//! call through a `Trampoline`. The trampoline runs the handler inside a
//! failure boundary and then dispatches according to the hook's policy.
//!
//! Guarantees on the hot path:
//!
//! - Reentrant: the slot clones the installed trampoline out of its lock
//!   before entering it; no lock is held across handler or original code.
//! - Fail-open: a handler error or panic degrades to invoking the
//!   original with unmodified arguments. A failed force-result falls back
//!   to passthrough rather than hanging the caller.

use crate::hooking::descriptor::HookPolicy;
use crate::utils::errors::{AgentError, Result};
use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Preserved original implementation of a hooked entry point.
pub type OriginalFn<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

/// Owned argument rewriter produced by a handler. Applying it is a plain
/// move of fields and must not fail; all fallible work belongs in
/// `HookHandler::observe`.
pub type Rewriter<A> = Box<dyn FnOnce(A) -> A + Send>;

/// What a handler decided about one intercepted call.
pub enum Action<A, R> {
    /// Run the original with the arguments unchanged.
    Passthrough,

    /// Run the original with rewritten arguments (callback wrapping).
    Rewrite(Rewriter<A>),

    /// Skip the original and return this result to the caller.
    ForceResult(R),
}

/// Per-hook handler logic. `observe` runs inside the trampoline's failure
/// boundary with shared access to the arguments; faults degrade to
/// passthrough.
pub trait HookHandler<A, R>: Send + Sync {
    fn observe(&self, args: &A) -> Result<Action<A, R>>;
}

/// The installed redirect for one entry point.
pub struct Trampoline<A, R> {
    hook: String,
    policy: HookPolicy,
    original: OriginalFn<A, R>,
    handler: Arc<dyn HookHandler<A, R>>,
}

impl<A, R> Trampoline<A, R> {
    pub fn new(
        hook: String,
        policy: HookPolicy,
        original: OriginalFn<A, R>,
        handler: Arc<dyn HookHandler<A, R>>,
    ) -> Self {
        Self {
            hook,
            policy,
            original,
            handler,
        }
    }

    /// Transfer control to the preserved original implementation.
    pub fn invoke_original(&self, args: A) -> R {
        (self.original)(args)
    }

    /// Entry point for an intercepted call.
    pub fn enter(&self, args: A) -> R {
        let action = match catch_unwind(AssertUnwindSafe(|| self.handler.observe(&args))) {
            Ok(Ok(action)) => action,
            Ok(Err(err)) => {
                warn!(hook = %self.hook, error = %err, "handler fault, passing through");
                Action::Passthrough
            }
            Err(_) => {
                warn!(hook = %self.hook, "handler panicked, passing through");
                Action::Passthrough
            }
        };

        match action {
            Action::ForceResult(result) if self.policy == HookPolicy::ObserveAndForceResult => {
                result
            }
            Action::Rewrite(rewrite) if self.policy == HookPolicy::ObserveAndWrapCallback => {
                self.invoke_original(rewrite(args))
            }
            Action::Passthrough => self.invoke_original(args),
            _ => {
                warn!(
                    hook = %self.hook,
                    policy = ?self.policy,
                    "action not permitted by policy, passing through"
                );
                self.invoke_original(args)
            }
        }
    }
}

/// Run capture logic that executes outside a trampoline, such as a
/// wrapped completion callback firing on a host thread, under the same
/// failure boundary `enter` applies to `observe`: a panic is contained
/// and logged, never unwound into host code, and whatever follows the
/// capture still runs.
pub fn contain<F: FnOnce()>(hook: &str, f: F) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        warn!(hook, "capture panicked, continuing");
    }
}

/// One patchable entry point: the original implementation plus an
/// optional installed trampoline.
pub struct HookSlot<A, R> {
    symbol: String,
    original: OriginalFn<A, R>,
    redirect: RwLock<Option<Arc<Trampoline<A, R>>>>,
    patched: AtomicBool,
    entered: AtomicU64,
}

impl<A, R> HookSlot<A, R> {
    pub fn new(symbol: impl Into<String>, original: OriginalFn<A, R>) -> Self {
        Self {
            symbol: symbol.into(),
            original,
            redirect: RwLock::new(None),
            patched: AtomicBool::new(false),
            entered: AtomicU64::new(0),
        }
    }

    /// The exported name this slot stands in for.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Host-side entry: runs the trampoline when one is installed,
    /// otherwise the original directly.
    pub fn call(&self, args: A) -> R {
        self.entered.fetch_add(1, Ordering::Relaxed);

        let redirect = self.redirect.read().clone();
        match redirect {
            Some(trampoline) => trampoline.enter(args),
            None => (self.original)(args),
        }
    }

    /// Install a redirect. Exactly one install may own a slot; a second
    /// attempt reports `InstallConflict` and leaves the first in place.
    pub fn install(
        &self,
        hook: impl Into<String>,
        policy: HookPolicy,
        handler: Arc<dyn HookHandler<A, R>>,
    ) -> Result<()> {
        if self.patched.swap(true, Ordering::SeqCst) {
            return Err(AgentError::InstallConflict(self.symbol.clone()));
        }

        let trampoline = Arc::new(Trampoline::new(
            hook.into(),
            policy,
            Arc::clone(&self.original),
            handler,
        ));
        *self.redirect.write() = Some(trampoline);
        debug!(symbol = %self.symbol, "redirect installed");
        Ok(())
    }

    /// Restore the original entry sequence.
    pub fn restore(&self) {
        *self.redirect.write() = None;
        self.patched.store(false, Ordering::SeqCst);
        debug!(symbol = %self.symbol, "redirect restored");
    }

    pub fn is_patched(&self) -> bool {
        self.patched.load(Ordering::SeqCst)
    }

    /// Total invocations observed through this slot.
    pub fn entered(&self) -> u64 {
        self.entered.load(Ordering::Relaxed)
    }
}
