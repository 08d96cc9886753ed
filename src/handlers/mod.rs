// src/handlers/mod.rs
//! Handler logic
//!
//! The semantics of the three hook families:
//!
//! - **Trust**: log the attempt, force a success verdict, never call the
//!   original validator
//! - **Script**: capture script/markup text, always pass through
//! - **Network**: capture the request, wrap the completion callback to
//!   capture the response under the same correlation id
//!
//! Handlers run inline on whatever host thread entered the trampoline and
//! must never block; the only shared resources they touch are the relay
//! queue and the correlation table, both non-blocking by construction.

pub mod network;
pub mod script;
pub mod trust;

// Re-export commonly used types
pub use network::NetworkHandler;
pub use script::ScriptHandler;
pub use trust::TrustHandler;
