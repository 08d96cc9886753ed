// src/relay/queue.rs
//! Bounded lock-free event queue
//!
//! Multi-producer queue between hook threads and the relay drain task.
//! Producers never block: when the queue is full, the oldest event is
//! displaced (bounded staleness). Stalling a UI or network thread of the
//! host process is strictly worse than losing a log line.

use crate::events::schema::Event;
use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free event queue with drop-oldest overflow.
pub struct EventQueue {
    queue: ArrayQueue<Event>,
    push_count: AtomicU64,
    pop_count: AtomicU64,
    drop_count: AtomicU64,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity.max(1)),
            push_count: AtomicU64::new(0),
            pop_count: AtomicU64::new(0),
            drop_count: AtomicU64::new(0),
        }
    }

    /// Push an event. O(1), never blocks. Returns the displaced oldest
    /// event when the queue was full.
    pub fn push(&self, event: Event) -> Option<Event> {
        self.push_count.fetch_add(1, Ordering::Relaxed);
        let displaced = self.queue.force_push(event);
        if displaced.is_some() {
            self.drop_count.fetch_add(1, Ordering::Relaxed);
        }
        displaced
    }

    /// Pop the oldest queued event, if any.
    pub fn try_pop(&self) -> Option<Event> {
        let event = self.queue.pop();
        if event.is_some() {
            self.pop_count.fetch_add(1, Ordering::Relaxed);
        }
        event
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            push_count: self.push_count.load(Ordering::Relaxed),
            pop_count: self.pop_count.load(Ordering::Relaxed),
            drop_count: self.drop_count.load(Ordering::Relaxed),
            current_size: self.queue.len(),
            capacity: self.queue.capacity(),
        }
    }
}

/// Queue statistics
#[derive(Debug, Clone)]
pub struct QueueStats {
    /// Total events pushed
    pub push_count: u64,

    /// Total events popped
    pub pop_count: u64,

    /// Total events displaced (queue full)
    pub drop_count: u64,

    /// Current queue size
    pub current_size: usize,

    /// Queue capacity
    pub capacity: usize,
}

impl QueueStats {
    pub fn fill_percentage(&self) -> f64 {
        (self.current_size as f64 / self.capacity as f64) * 100.0
    }

    pub fn drop_rate(&self) -> f64 {
        if self.push_count == 0 {
            0.0
        } else {
            (self.drop_count as f64 / self.push_count as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::schema::{EventPayload, EventType};
    use proptest::prelude::*;
    use std::sync::Arc;

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

    fn host_of(event: &Event) -> String {
        match &event.payload {
            EventPayload::CertBypass { host } => host.clone(),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_push_pop() {
        let queue = EventQueue::new(10);
        assert!(queue.push(test_event("a")).is_none());
        assert_eq!(queue.len(), 1);

        let popped = queue.try_pop().unwrap();
        assert_eq!(host_of(&popped), "a");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_saturation_displaces_oldest() {
        let queue = EventQueue::new(2);
        assert!(queue.push(test_event("a")).is_none());
        assert!(queue.push(test_event("b")).is_none());

        // Full: the oldest event is the one displaced.
        let displaced = queue.push(test_event("c")).unwrap();
        assert_eq!(host_of(&displaced), "a");
        assert_eq!(queue.len(), 2);

        assert_eq!(host_of(&queue.try_pop().unwrap()), "b");
        assert_eq!(host_of(&queue.try_pop().unwrap()), "c");

        let stats = queue.stats();
        assert_eq!(stats.push_count, 3);
        assert_eq!(stats.drop_count, 1);
        assert_eq!(stats.pop_count, 2);
    }

    #[test]
    fn test_stats_rates() {
        let queue = EventQueue::new(2);
        queue.push(test_event("a"));
        queue.push(test_event("b"));
        queue.push(test_event("c"));

        let stats = queue.stats();
        assert_eq!(stats.fill_percentage(), 100.0);
        assert!((stats.drop_rate() - 100.0 / 3.0).abs() < 0.01);
    }

    #[test]
    fn test_concurrent_producers_never_block() {
        use std::thread;

        let queue = Arc::new(EventQueue::new(64));
        let mut handles = vec![];
        for i in 0..8 {
            let queue = Arc::clone(&queue);
            handles.push(thread::spawn(move || {
                for j in 0..500 {
                    queue.push(test_event(&format!("{i}-{j}")));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = queue.stats();
        assert_eq!(stats.push_count, 4000);
        assert_eq!(stats.current_size, 64);
        assert_eq!(stats.drop_count, 4000 - 64 - stats.pop_count);
    }

    proptest! {
        // Survivors after overflow are always the newest `capacity`
        // events, in FIFO order.
        #[test]
        fn prop_drop_oldest_keeps_newest_suffix(
            capacity in 1usize..16,
            total in 0usize..64,
        ) {
            let queue = EventQueue::new(capacity);
            for i in 0..total {
                queue.push(test_event(&i.to_string()));
            }

            let survivors: Vec<_> = std::iter::from_fn(|| queue.try_pop())
                .map(|e| host_of(&e))
                .collect();
            let expected: Vec<_> = (total.saturating_sub(capacity)..total)
                .map(|i| i.to_string())
                .collect();
            prop_assert_eq!(survivors, expected);
        }
    }
}
