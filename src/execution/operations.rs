//! Execution operations - command assembly (writes gamescope run scripts)

mod assemble;

pub use assemble::{AssembledCommand, CommandAssembler};
