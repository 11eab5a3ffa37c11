//! Execution pipelines - strategist chain driver

mod resolve;

pub use resolve::ExecutionPipeline;
