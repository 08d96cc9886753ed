// src/relay/mod.rs
//! Relay channel
//!
//! Moves normalized events to the out-of-process Collector without ever
//! blocking the producing thread beyond a bounded constant time:
//!
//! - **Queue**: bounded lock-free queue with drop-oldest overflow
//! - **Channel**: background drain, length-prefixed JSON framing,
//!   reconnect with capped exponential backoff
//!
//! # Architecture
//!
//! ```text
//! Hook thread → RelayHandle::emit → Lock-Free Queue → Drain Task
//!                    (O(1))                               ↓
//!                                            length-prefixed frames
//!                                                         ↓
//!                                                TCP → Collector
//! ```

pub mod channel;
pub mod queue;

// Re-export commonly used types
pub use channel::{RelayChannel, RelayConfig, RelayHandle};
pub use queue::{EventQueue, QueueStats};
