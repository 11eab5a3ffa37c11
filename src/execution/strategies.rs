//! Strategists in pipeline order
//!
//! - `base`: prefix, runner, Wayland
//! - `graphics`: graphics backends, overlays, GPU selection
//! - `engine`: sync primitives, runtimes
//! - `wrappers`: umu-run, gamescope, tool prefixes

mod base;
mod engine;
mod graphics;
mod wrappers;

pub use base::{BaseStrategist, RunnerStrategist, WaylandStrategist, needs_gamepad_workaround};
pub use engine::{RuntimeStrategist, SyncStrategist};
pub use graphics::{GpuStrategist, GraphicsStrategist};
pub use wrappers::{GamescopeStrategist, ToolWrapperStrategist, UmuStrategist};
