// src/hooking/mod.rs
//! Interception engine
//!
//! This module makes the redirect at each target entry point transparent
//! and crash-proof:
//!
//! - **Descriptor**: what to hook, how to find it, what the hook may do
//! - **Resolver**: loaded-module map and typed entry points
//! - **Trampoline**: redirect slots with a fail-open handler boundary
//! - **Engine**: descriptor installation and restoration
//!
//! # Architecture
//!
//! ```text
//! Host Thread (any)
//!     │
//!     └─ HookSlot::call ── Trampoline::enter ── HookHandler::observe
//!                               │                      │
//!                               │              (fault → passthrough)
//!                               │
//!                               └─ invoke_original / forced result
//! ```
//!
//! No intercepted call may observably hang, unwind, or crash the host as
//! a side effect of the agent.

pub mod context;
pub mod descriptor;
pub mod engine;
pub mod resolver;
pub mod trampoline;

// Re-export commonly used types
pub use context::{
    HttpRequest, HttpResponse, NetworkArgs, ScriptArgs, ScriptCompletion, TaskCompletion,
    TrustContext, TrustVerdict,
};
pub use descriptor::{HookDescriptor, HookFamily, HookPolicy, TargetSpec};
pub use engine::{InstalledHook, InterceptionEngine};
pub use resolver::{EntryPoint, Module, ModuleMap};
pub use trampoline::{contain, Action, HookHandler, HookSlot, Trampoline};
