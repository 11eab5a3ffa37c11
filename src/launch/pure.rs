//! Launch pure functions - no I/O

mod command;

pub use command::{format_launch, program_command};
