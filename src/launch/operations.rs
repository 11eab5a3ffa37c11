//! Launch operations - process spawning and post-exit cleanup

mod cleanup;
mod spawn;

pub use cleanup::cleanup;
pub use spawn::spawn;
