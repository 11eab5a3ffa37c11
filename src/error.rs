//! Error types for bottlerun

use thiserror::Error;

/// Candidate selection over a catalog section
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("No candidate available in the catalog")]
    NoCandidateAvailable,
}

/// Errors raised while discovering or installing components
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("No candidate available in the catalog")]
    NoCandidateAvailable,

    #[error("Network unavailable, cannot install components")]
    NetworkUnavailable,

    #[error("Component type not supported: {0}")]
    ComponentTypeUnsupported(String),

    #[error("Failed to install {kind} {identifier}: {reason}")]
    InstallFailure {
        kind: String,
        identifier: String,
        reason: String,
    },

    #[error("Invalid runtime manifest: {0}")]
    RuntimeManifest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<VersionError> for DiscoveryError {
    fn from(err: VersionError) -> Self {
        match err {
            VersionError::NoCandidateAvailable => DiscoveryError::NoCandidateAvailable,
        }
    }
}

/// Errors raised by a single strategist; the pipeline logs and swallows them
#[derive(Debug, Error)]
pub enum StrategistError {
    #[error("Missing launch metadata: {0}")]
    Missing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}

/// Errors raised while loading bottle or application configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
