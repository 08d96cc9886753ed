// src/utils/mod.rs
//! Common utilities: error taxonomy and configuration loading.

pub mod config;
pub mod errors;

pub use config::AgentConfig;
pub use errors::{AgentError, Result};
