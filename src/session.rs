// src/session.rs
//! Process-wide session
//!
//! One session per attached process: installs the descriptor set once,
//! single-threaded, before any hook can be entered, then runs the relay
//! drain and correlation prune tasks on a small private runtime (host
//! threads are not ours to schedule on). Detach restores every patched
//! entry point and stops emitting; correctness never depends on detach
//! running.

use crate::events::classifier::Classifier;
use crate::events::correlation::CorrelationTable;
use crate::events::normalizer::Normalizer;
use crate::hooking::engine::InterceptionEngine;
use crate::hooking::resolver::ModuleMap;
use crate::relay::channel::RelayChannel;
use crate::relay::queue::QueueStats;
use crate::utils::config::AgentConfig;
use crate::utils::errors::{AgentError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime;
use tracing::{info, warn};

pub struct Session {
    engine: InterceptionEngine,
    relay: Arc<RelayChannel>,
    correlation: Arc<CorrelationTable>,
    runtime: runtime::Runtime,
}

impl Session {
    /// Attach the agent: install every configured hook and start the
    /// background tasks. Unresolvable and conflicting descriptors are
    /// logged and skipped; anything else fails the attach.
    pub fn attach(config: AgentConfig, modules: ModuleMap) -> Result<Self> {
        let runtime = runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("tapwire")
            .enable_all()
            .build()?;

        let relay = Arc::new(RelayChannel::new(config.relay.clone()));
        let correlation = Arc::new(CorrelationTable::new(Duration::from_millis(
            config.correlation.prune_window_ms,
        )));
        let normalizer = Arc::new(Normalizer::new(
            relay.handle(),
            Arc::clone(&correlation),
            Classifier::new(&config.capture.captcha_markers),
            config.capture.max_capture_bytes,
        ));

        let mut engine = InterceptionEngine::new(modules, normalizer);
        for descriptor in config.descriptors() {
            let name = descriptor.name.clone();
            match engine.install(descriptor) {
                Ok(()) => info!(hook = %name, "hook installed"),
                Err(err @ AgentError::Resolution(_)) => {
                    warn!(hook = %name, error = %err, "hook skipped")
                }
                Err(err @ AgentError::InstallConflict(_)) => {
                    warn!(hook = %name, error = %err, "hook skipped")
                }
                Err(err) => return Err(err),
            }
        }
        info!(
            installed = engine.installed().len(),
            collector = %config.relay.collector_addr,
            "session attached"
        );

        runtime.spawn(Arc::clone(&relay).run());
        runtime.spawn(prune_loop(
            Arc::clone(&correlation),
            Duration::from_millis(config.correlation.prune_interval_ms.max(1)),
        ));

        Ok(Self {
            engine,
            relay,
            correlation,
            runtime,
        })
    }

    /// Names of the hooks that actually installed.
    pub fn installed_hooks(&self) -> Vec<&str> {
        self.engine
            .installed()
            .iter()
            .map(|hook| hook.descriptor.name.as_str())
            .collect()
    }

    pub fn queue_stats(&self) -> QueueStats {
        self.relay.queue_stats()
    }

    /// Pending request-correlation entries.
    pub fn pending_correlations(&self) -> usize {
        self.correlation.len()
    }

    /// Restore every patched entry point and stop emitting.
    pub fn detach(self) {
        let Session {
            mut engine,
            relay,
            runtime,
            ..
        } = self;

        engine.restore_all();
        relay.shutdown();
        runtime.shutdown_timeout(Duration::from_secs(2));
        info!("session detached");
    }
}

async fn prune_loop(table: Arc<CorrelationTable>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        table.prune();
    }
}
