use crate::config::types::{BottleConfig, Settings};
use crate::error::ConfigError;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn load_settings(path: &Path) -> Settings {
    if let Ok(file) = File::open(path) {
        match serde_json::from_reader::<_, Settings>(BufReader::new(file)) {
            Ok(settings) => return settings,
            Err(e) => tracing::warn!("settings - ignoring {}: {}", path.display(), e),
        }
    }

    // Return default settings if file doesn't exist or has error
    Settings::default()
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, settings)?;
    Ok(())
}

pub fn load_bottle_config(path: &Path) -> Result<BottleConfig, ConfigError> {
    let file = File::open(path)?;
    let config = serde_yaml::from_reader(BufReader::new(file))?;
    Ok(config)
}

pub fn save_bottle_config(path: &Path, config: &BottleConfig) -> Result<(), ConfigError> {
    let file = File::create(path)?;
    serde_yaml::to_writer(file, config)?;
    Ok(())
}
