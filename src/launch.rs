//! Launch module - resolves and starts bottle programs
//!
//! This module provides:
//! - Launch preparation (strategist chain, command assembly, sandboxing)
//! - Spawning a prepared launch and removing its run scripts afterwards
//! - A log formatter for prepared launches
//!
//! ## Module Structure
//! - `types.rs`: `PreparedLaunch`
//! - `pure/`: Pure functions (program command line, formatting)
//! - `operations/`: Atomic side effects (spawn, cleanup)
//! - `pipelines/`: High-level orchestration (prepare)

mod operations;
mod pipelines;
mod pure;
mod types;

// Re-export public API
pub use operations::{cleanup, spawn};
pub use pipelines::prepare;
pub use pure::{format_launch, program_command};
pub use types::PreparedLaunch;
