pub mod operations;
pub mod types;

// Re-export types
pub use types::{
    Arch, BottleConfig, BottleEnvironment, BottleParameters, SandboxParameters, Settings,
    SyncMode,
};

// Re-export operations
pub use operations::{load_bottle_config, load_settings, save_bottle_config, save_settings};
