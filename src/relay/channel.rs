// src/relay/channel.rs
//! Relay channel to the Collector
//!
//! Producers hand events to a `RelayHandle`, which is synchronous and
//! O(1). A background drain task serializes queued events as
//! length-prefixed JSON frames over a persistent TCP stream, reconnecting
//! with capped exponential backoff when the transport drops. Events
//! queued while disconnected are retained up to the queue bound and then
//! displaced oldest-first.
//!
//! The Collector's only obligation is to accept bytes promptly; there are
//! no application-level acknowledgments.

use crate::events::schema::Event;
use crate::relay::queue::{EventQueue, QueueStats};
use crate::utils::errors::{AgentError, Result};
use bytes::Bytes;
use futures::SinkExt;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio_util::codec::{FramedWrite, LengthDelimitedCodec};
use tracing::{debug, error, info, warn};

/// Relay channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Collector endpoint, `host:port`.
    pub collector_addr: String,

    /// Bounded queue size between producers and the drain task.
    pub queue_capacity: usize,

    /// Initial reconnect delay.
    pub reconnect_initial_ms: u64,

    /// Reconnect delay cap.
    pub reconnect_max_ms: u64,

    /// Fallback wake interval for the drain task.
    pub drain_wake_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            collector_addr: "127.0.0.1:4178".to_string(),
            queue_capacity: 8192,
            reconnect_initial_ms: 200,
            reconnect_max_ms: 10_000,
            drain_wake_ms: 200,
        }
    }
}

/// Producer-side handle. Cheap to clone; `emit` never blocks.
#[derive(Clone)]
pub struct RelayHandle {
    queue: Arc<EventQueue>,
    notify: Arc<Notify>,
}

impl RelayHandle {
    /// Enqueue an event for transmission. When the queue is full the
    /// oldest event is displaced rather than applying backpressure.
    pub fn emit(&self, event: Event) {
        if self.queue.push(event).is_some() {
            debug!("relay queue full, displaced oldest event");
        }
        self.notify.notify_one();
    }
}

/// The relay channel: bounded queue plus background drain.
pub struct RelayChannel {
    config: RelayConfig,
    queue: Arc<EventQueue>,
    notify: Arc<Notify>,
    shutdown: AtomicBool,
}

impl RelayChannel {
    pub fn new(config: RelayConfig) -> Self {
        let queue = Arc::new(EventQueue::new(config.queue_capacity));
        Self {
            config,
            queue,
            notify: Arc::new(Notify::new()),
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn handle(&self) -> RelayHandle {
        RelayHandle {
            queue: Arc::clone(&self.queue),
            notify: Arc::clone(&self.notify),
        }
    }

    pub fn queue(&self) -> Arc<EventQueue> {
        Arc::clone(&self.queue)
    }

    pub fn queue_stats(&self) -> QueueStats {
        self.queue.stats()
    }

    /// Ask the drain task to stop once the queue is flushed (or the
    /// transport is down).
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Connect-and-drain loop. Runs until shutdown.
    pub async fn run(self: Arc<Self>) {
        let initial = Duration::from_millis(self.config.reconnect_initial_ms.max(1));
        let max = Duration::from_millis(self.config.reconnect_max_ms.max(1));
        let mut backoff = initial;

        loop {
            if self.is_shutdown() {
                return;
            }

            match TcpStream::connect(&self.config.collector_addr).await {
                Ok(stream) => {
                    info!(addr = %self.config.collector_addr, "relay connected");
                    backoff = initial;

                    let mut framed = FramedWrite::new(stream, LengthDelimitedCodec::new());
                    match self.drain(&mut framed).await {
                        Ok(()) => return, // clean shutdown, queue flushed
                        Err(err) => warn!(error = %err, "relay transport dropped"),
                    }
                }
                Err(err) => {
                    debug!(addr = %self.config.collector_addr, error = %err, "collector not reachable");
                }
            }

            let jitter = rand::thread_rng().gen_range(0..=backoff.as_millis() as u64 / 4);
            tokio::time::sleep(backoff + Duration::from_millis(jitter)).await;
            backoff = (backoff * 2).min(max);
        }
    }

    /// Drain queued events into the framed transport. Returns `Ok` only
    /// on shutdown with an empty queue.
    async fn drain(
        &self,
        framed: &mut FramedWrite<TcpStream, LengthDelimitedCodec>,
    ) -> Result<()> {
        loop {
            while let Some(event) = self.queue.try_pop() {
                match serde_json::to_vec(&event) {
                    Ok(bytes) => {
                        framed
                            .send(Bytes::from(bytes))
                            .await
                            .map_err(|e| AgentError::RelayDisconnected(e.to_string()))?;
                    }
                    Err(err) => {
                        // One malformed event is a gap in the stream, not
                        // a reason to drop the connection.
                        error!(error = %err, "event serialization failed, skipping");
                    }
                }
            }

            if self.is_shutdown() {
                return Ok(());
            }

            let wake = Duration::from_millis(self.config.drain_wake_ms.max(1));
            let _ = tokio::time::timeout(wake, self.notify.notified()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::schema::{EventPayload, EventType};
    use futures::StreamExt;
    use tokio::net::TcpListener;
    use tokio_util::codec::FramedRead;

    fn test_event(host: &str) -> Event {
        Event::now(
            EventType::CertBypass,
            "cert_pin",
            EventPayload::CertBypass {
                host: host.to_string(),
            },
            None,
        )
    }

    #[test]
    fn test_emit_is_nonblocking_when_saturated() {
        let channel = RelayChannel::new(RelayConfig {
            queue_capacity: 4,
            ..Default::default()
        });
        let handle = channel.handle();

        for i in 0..100 {
            handle.emit(test_event(&i.to_string()));
        }

        let stats = channel.queue_stats();
        assert_eq!(stats.push_count, 100);
        assert_eq!(stats.current_size, 4);
        assert_eq!(stats.drop_count, 96);
    }

    #[tokio::test]
    async fn test_events_reach_collector() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let channel = Arc::new(RelayChannel::new(RelayConfig {
            collector_addr: addr.to_string(),
            ..Default::default()
        }));
        let handle = channel.handle();

        // Events queued before the transport exists are retained.
        handle.emit(test_event("early.example.com"));

        let drain = tokio::spawn(Arc::clone(&channel).run());

        let (stream, _) = listener.accept().await.unwrap();
        let mut framed = FramedRead::new(stream, LengthDelimitedCodec::new());

        handle.emit(test_event("late.example.com"));

        let mut hosts = Vec::new();
        for _ in 0..2 {
            let frame = tokio::time::timeout(Duration::from_secs(5), framed.next())
                .await
                .expect("timed out waiting for frame")
                .expect("stream closed")
                .expect("frame error");
            let event: Event = serde_json::from_slice(&frame).unwrap();
            assert_eq!(event.event_type, EventType::CertBypass);
            match event.payload {
                EventPayload::CertBypass { host } => hosts.push(host),
                other => panic!("unexpected payload: {other:?}"),
            }
        }

        // Per-producer ordering is preserved through the queue.
        assert_eq!(hosts, vec!["early.example.com", "late.example.com"]);

        channel.shutdown();
        let _ = tokio::time::timeout(Duration::from_secs(5), drain).await;
    }

    #[tokio::test]
    async fn test_reconnect_after_listener_appears() {
        // Reserve a port, then close the listener so the first connect
        // attempts fail.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let channel = Arc::new(RelayChannel::new(RelayConfig {
            collector_addr: addr.to_string(),
            reconnect_initial_ms: 10,
            reconnect_max_ms: 50,
            ..Default::default()
        }));
        let handle = channel.handle();
        handle.emit(test_event("buffered.example.com"));

        let drain = tokio::spawn(Arc::clone(&channel).run());

        // Let a few connect attempts fail before the collector shows up.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let listener = TcpListener::bind(addr).await.unwrap();
        let (stream, _) = listener.accept().await.unwrap();
        let mut framed = FramedRead::new(stream, LengthDelimitedCodec::new());

        let frame = tokio::time::timeout(Duration::from_secs(5), framed.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream closed")
            .expect("frame error");
        let event: Event = serde_json::from_slice(&frame).unwrap();
        assert!(matches!(event.payload, EventPayload::CertBypass { .. }));

        channel.shutdown();
        let _ = tokio::time::timeout(Duration::from_secs(5), drain).await;
    }
}
