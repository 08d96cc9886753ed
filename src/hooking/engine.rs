// src/hooking/engine.rs
//! Interception engine
//!
//! Resolves hook descriptors against the loaded-module map and installs
//! the matching handler family behind each entry point. Installation is
//! single-threaded and happens once, before any hook can be entered;
//! restoration walks the installed set in reverse.

use crate::events::normalizer::{Normalizer, ScriptKind};
use crate::handlers::network::NetworkHandler;
use crate::handlers::script::ScriptHandler;
use crate::handlers::trust::TrustHandler;
use crate::hooking::descriptor::{HookDescriptor, HookFamily};
use crate::hooking::resolver::{EntryPoint, ModuleMap};
use crate::utils::errors::{AgentError, Result};
use std::sync::Arc;
use tracing::debug;

/// Record of one successful install.
pub struct InstalledHook {
    pub descriptor: HookDescriptor,
    entry: EntryPoint,
}

impl InstalledHook {
    pub fn symbol(&self) -> &str {
        self.entry.symbol()
    }
}

/// The interception engine: module map plus installed redirects.
pub struct InterceptionEngine {
    modules: ModuleMap,
    normalizer: Arc<Normalizer>,
    installed: Vec<InstalledHook>,
}

impl InterceptionEngine {
    pub fn new(modules: ModuleMap, normalizer: Arc<Normalizer>) -> Self {
        Self {
            modules,
            normalizer,
            installed: Vec::new(),
        }
    }

    /// Install one descriptor. `Resolution` means the target is absent or
    /// shaped wrong for the family; `InstallConflict` means the entry
    /// point is already redirected. Both are non-fatal to the caller.
    pub fn install(&mut self, descriptor: HookDescriptor) -> Result<()> {
        let entry = self
            .modules
            .resolve(&descriptor.target)
            .ok_or_else(|| AgentError::Resolution(descriptor.target.describe()))?
            .clone();

        let policy = descriptor.policy();
        let name = descriptor.name.clone();

        match (&entry, descriptor.family) {
            (EntryPoint::Trust(slot), HookFamily::TrustEval) => {
                let handler = TrustHandler::new(name, Arc::clone(&self.normalizer));
                slot.install(descriptor.name.clone(), policy, Arc::new(handler))?;
            }
            (EntryPoint::Script(slot), HookFamily::ScriptEval) => {
                let handler = ScriptHandler::new(
                    name,
                    ScriptKind::Evaluate,
                    Arc::clone(&self.normalizer),
                );
                slot.install(descriptor.name.clone(), policy, Arc::new(handler))?;
            }
            (EntryPoint::Script(slot), HookFamily::ContentLoad) => {
                let handler = ScriptHandler::new(
                    name,
                    ScriptKind::LoadHtml,
                    Arc::clone(&self.normalizer),
                );
                slot.install(descriptor.name.clone(), policy, Arc::new(handler))?;
            }
            (EntryPoint::Network(slot), HookFamily::NetworkTask) => {
                let handler = NetworkHandler::new(name, Arc::clone(&self.normalizer));
                slot.install(descriptor.name.clone(), policy, Arc::new(handler))?;
            }
            (entry, family) => {
                return Err(AgentError::Resolution(format!(
                    "{} resolved to a {} entry point, incompatible with {:?}",
                    descriptor.target.describe(),
                    entry.kind(),
                    family
                )));
            }
        }

        debug!(hook = %descriptor.name, symbol = %entry.symbol(), "hook installed");
        self.installed.push(InstalledHook { descriptor, entry });
        Ok(())
    }

    pub fn installed(&self) -> &[InstalledHook] {
        &self.installed
    }

    /// Restore every patched entry point, newest first.
    pub fn restore_all(&mut self) {
        for hook in self.installed.drain(..).rev() {
            hook.entry.restore();
        }
    }
}
