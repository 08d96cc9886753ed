// src/hooking/resolver.rs
//! Entry point resolution
//!
//! The agent's view of the target process: every loaded module exposes a
//! set of exported entry points, each standing behind a patchable
//! `HookSlot`. Resolution turns a `TargetSpec` into the typed slot a
//! descriptor wants to redirect.
//!
//! Symbol targets match an exported name exactly; pattern targets do a
//! case-insensitive substring match over exported names, in module
//! registration order.

use crate::hooking::context::{
    NetworkArgs, ScriptArgs, TrustContext, TrustVerdict,
};
use crate::hooking::descriptor::TargetSpec;
use crate::hooking::trampoline::HookSlot;
use std::sync::Arc;
use tracing::debug;

/// A resolved, typed entry point.
#[derive(Clone)]
pub enum EntryPoint {
    Trust(Arc<HookSlot<TrustContext, TrustVerdict>>),
    Script(Arc<HookSlot<ScriptArgs, ()>>),
    Network(Arc<HookSlot<NetworkArgs, ()>>),
}

impl EntryPoint {
    pub fn symbol(&self) -> &str {
        match self {
            EntryPoint::Trust(slot) => slot.symbol(),
            EntryPoint::Script(slot) => slot.symbol(),
            EntryPoint::Network(slot) => slot.symbol(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EntryPoint::Trust(_) => "trust",
            EntryPoint::Script(_) => "script",
            EntryPoint::Network(_) => "network",
        }
    }

    /// Restore the original entry sequence behind this point.
    pub fn restore(&self) {
        match self {
            EntryPoint::Trust(slot) => slot.restore(),
            EntryPoint::Script(slot) => slot.restore(),
            EntryPoint::Network(slot) => slot.restore(),
        }
    }
}

/// One loaded module and its exported entry points.
pub struct Module {
    name: String,
    exports: Vec<EntryPoint>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exports: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a trust-evaluation export. Returns the slot so the host
    /// side can invoke it.
    pub fn export_trust<F>(
        &mut self,
        symbol: impl Into<String>,
        original: F,
    ) -> Arc<HookSlot<TrustContext, TrustVerdict>>
    where
        F: Fn(TrustContext) -> TrustVerdict + Send + Sync + 'static,
    {
        let slot = Arc::new(HookSlot::new(symbol, Arc::new(original) as _));
        self.exports.push(EntryPoint::Trust(Arc::clone(&slot)));
        slot
    }

    /// Register a script-evaluation or content-load export.
    pub fn export_script<F>(
        &mut self,
        symbol: impl Into<String>,
        original: F,
    ) -> Arc<HookSlot<ScriptArgs, ()>>
    where
        F: Fn(ScriptArgs) + Send + Sync + 'static,
    {
        let slot = Arc::new(HookSlot::new(symbol, Arc::new(original) as _));
        self.exports.push(EntryPoint::Script(Arc::clone(&slot)));
        slot
    }

    /// Register a network-task-creation export.
    pub fn export_network<F>(
        &mut self,
        symbol: impl Into<String>,
        original: F,
    ) -> Arc<HookSlot<NetworkArgs, ()>>
    where
        F: Fn(NetworkArgs) + Send + Sync + 'static,
    {
        let slot = Arc::new(HookSlot::new(symbol, Arc::new(original) as _));
        self.exports.push(EntryPoint::Network(Arc::clone(&slot)));
        slot
    }
}

/// The loaded-module list the agent resolves against.
#[derive(Default)]
pub struct ModuleMap {
    modules: Vec<Module>,
}

impl ModuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: Module) {
        debug!(module = %module.name, exports = module.exports.len(), "module registered");
        self.modules.push(module);
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    /// Resolve a target against every registered module.
    pub fn resolve(&self, target: &TargetSpec) -> Option<&EntryPoint> {
        match target {
            TargetSpec::Symbol(name) => self
                .modules
                .iter()
                .flat_map(|m| m.exports.iter())
                .find(|entry| entry.symbol() == name),
            TargetSpec::Pattern(pattern) => {
                let needle = pattern.to_lowercase();
                self.modules
                    .iter()
                    .flat_map(|m| m.exports.iter())
                    .find(|entry| entry.symbol().to_lowercase().contains(&needle))
            }
        }
    }
}
