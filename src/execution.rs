//! Execution module - resolves how a bottle program is launched
//!
//! A launch is resolved by running an ordered chain of strategists over one
//! `ExecutionContext`. Each strategist adds environment variables or
//! metadata; the assembler then turns the metadata into a command line.
//!
//! ## Module Structure
//! - `types.rs`: Context, flags, metadata and the `Strategist` trait
//! - `strategies/`: The individual strategists
//! - `operations/`: Command assembly
//! - `pipelines/`: The strategist chain driver

mod operations;
mod pipelines;
mod strategies;
mod types;

// Re-export types
pub use types::{ExecutionContext, GamescopeWrap, LaunchFlags, LaunchMetadata, Strategist};

// Re-export strategists
pub use strategies::{
    BaseStrategist, GamescopeStrategist, GpuStrategist, GraphicsStrategist, RunnerStrategist,
    RuntimeStrategist, SyncStrategist, ToolWrapperStrategist, UmuStrategist, WaylandStrategist,
    needs_gamepad_workaround,
};

// Re-export operations
pub use operations::{AssembledCommand, CommandAssembler};

// Re-export pipelines
pub use pipelines::ExecutionPipeline;
