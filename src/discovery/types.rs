use std::str::FromStr;

use crate::catalog::ComponentKind;
use crate::error::DiscoveryError;

/// Result of one discovery check that did not fail outright.
///
/// "Nothing installed" is a success for optional components, while a
/// required component that is absent or outdated is reported as such
/// instead of being inferred from an empty list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Installed identifiers, newest (or highest priority) first
    Available(Vec<String>),
    /// Nothing on disk and nothing was requested to be installed
    NothingInstalled,
    /// A required component is absent and could not be provided
    Missing,
    /// An installed component is older than the catalog's latest build
    UpdateRequired {
        installed: Option<String>,
        latest: String,
    },
}

impl CheckOutcome {
    pub fn from_list(identifiers: Vec<String>) -> Self {
        if identifiers.is_empty() {
            CheckOutcome::NothingInstalled
        } else {
            CheckOutcome::Available(identifiers)
        }
    }

    pub fn identifiers(&self) -> &[String] {
        match self {
            CheckOutcome::Available(ids) => ids,
            _ => &[],
        }
    }

    /// Whether the check counts as a pass in an aggregate status
    pub fn passed(&self) -> bool {
        matches!(
            self,
            CheckOutcome::Available(_) | CheckOutcome::NothingInstalled
        )
    }
}

/// Installed vs latest state of the bridge layer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BridgeStatus {
    pub latest_supported: Option<String>,
    pub installed_identifier: Option<String>,
    pub needs_latest: bool,
    pub missing: bool,
}

/// External collaborator that downloads and unpacks a component build
pub trait Installer: Send + Sync {
    fn install(&self, kind: ComponentKind, identifier: &str) -> Result<(), String>;
}

/// Installer used when no installer is wired in; every request fails
pub struct UnavailableInstaller;

impl Installer for UnavailableInstaller {
    fn install(&self, kind: ComponentKind, identifier: &str) -> Result<(), String> {
        Err(format!("no installer available for {} {}", kind, identifier))
    }
}

/// Component types that can be asked for offline (locally-only) builds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OfflineQuery {
    Component(ComponentKind),
    ProtonRunners,
}

impl FromStr for OfflineQuery {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dxvk" => Ok(OfflineQuery::Component(ComponentKind::Dxvk)),
            "vkd3d" => Ok(OfflineQuery::Component(ComponentKind::Vkd3d)),
            "nvapi" => Ok(OfflineQuery::Component(ComponentKind::Nvapi)),
            "latencyflex" => Ok(OfflineQuery::Component(ComponentKind::LatencyFlex)),
            "runner" => Ok(OfflineQuery::Component(ComponentKind::Runner)),
            "runner:proton" => Ok(OfflineQuery::ProtonRunners),
            other => {
                tracing::warn!("discovery - unknown component type found: {}", other);
                Err(DiscoveryError::ComponentTypeUnsupported(other.to_string()))
            }
        }
    }
}

/// Progress notification for one orchestration step
#[derive(Clone, Copy, Debug)]
pub struct CheckProgress<'a> {
    pub description: &'a str,
    pub current_step: usize,
    pub total_steps: usize,
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepResult {
    pub key: &'static str,
    pub passed: bool,
    pub message: Option<String>,
}

/// Aggregate of a full checks pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChecksReport {
    pub status: bool,
    pub steps: Vec<StepResult>,
}

impl ChecksReport {
    pub fn record(&mut self, key: &'static str, result: Result<bool, String>) {
        let (passed, message) = match result {
            Ok(passed) => (passed, None),
            Err(e) => (false, Some(e)),
        };
        self.steps.push(StepResult {
            key,
            passed,
            message,
        });
        self.status = self.steps.iter().all(|s| s.passed);
    }

    pub fn step(&self, key: &str) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.key == key)
    }

    /// Human-readable one-line summary of the failed steps
    pub fn describe(&self) -> String {
        let failed: Vec<String> = self
            .steps
            .iter()
            .filter(|s| !s.passed)
            .map(|s| match &s.message {
                Some(m) => format!("{} ({})", s.key, m),
                None => s.key.to_string(),
            })
            .collect();
        if failed.is_empty() {
            "all checks passed".to_string()
        } else {
            format!("failed: {}", failed.join(", "))
        }
    }
}
