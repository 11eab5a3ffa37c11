use std::fs;
use std::path::Path;

use crate::error::DiscoveryError;

/// Installed bridge identifier from its single-line `VERSION` marker
pub fn read_bridge_marker(bridge_dir: &Path) -> Option<String> {
    let contents = fs::read_to_string(bridge_dir.join("VERSION")).ok()?;
    let version = contents.trim();
    if version.is_empty() {
        return None;
    }
    Some(format!("winebridge-{}", version))
}

/// Runtime identifier from `<runtime>/manifest.yml`
///
/// `Ok(None)` when the manifest is absent or carries no `version`.
pub fn read_runtime_manifest(runtime_dir: &Path) -> Result<Option<String>, DiscoveryError> {
    let manifest = runtime_dir.join("manifest.yml");
    if !manifest.exists() {
        tracing::warn!("runtime - {} not found", manifest.display());
        return Ok(None);
    }

    let contents = fs::read_to_string(&manifest)?;
    let data: serde_yaml::Value = serde_yaml::from_str(&contents)
        .map_err(|e| DiscoveryError::RuntimeManifest(e.to_string()))?;

    let version = match data.get("version") {
        Some(serde_yaml::Value::String(v)) => v.trim().to_string(),
        Some(serde_yaml::Value::Number(n)) => n.to_string(),
        _ => return Ok(None),
    };
    if version.is_empty() {
        return Ok(None);
    }
    Ok(Some(format!("runtime-{}", version)))
}
