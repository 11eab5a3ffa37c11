//! Launch types

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// A fully resolved launch, ready for the process launcher
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreparedLaunch {
    pub env: BTreeMap<String, String>,
    /// Inherited variables to drop before spawning
    pub unset: BTreeSet<String>,
    pub command: String,
    /// The command is wrapped in bwrap and carries the env itself
    pub sandboxed: bool,
    /// Strategists that failed while resolving
    pub failed: Vec<&'static str>,
    /// Ephemeral files the command depends on, removed by `cleanup`
    pub scripts: Vec<PathBuf>,
}
