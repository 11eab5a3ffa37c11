//! Execution types - the per-launch accumulator and the strategist contract

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::config::BottleConfig;
use crate::error::StrategistError;

/// Caller requests that change how a launch is resolved
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LaunchFlags {
    /// Environment for a Steam launch option: no prefix, arch or debug vars
    pub return_steam_env: bool,
    /// Leave the runner out of the final command
    pub return_clean_env: bool,
    /// Launch meant for an interactive terminal
    pub is_terminal: bool,
    /// No overlays, anti-cheat runtimes, compositor or tool wrappers
    pub is_minimal: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GamescopeWrap {
    pub bin: PathBuf,
    pub args: Vec<String>,
    /// Start mangoapp next to the game inside the compositor
    pub mangoapp: bool,
}

/// Facts strategists hand to later strategists and to the assembler
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LaunchMetadata {
    pub bottle_path: Option<PathBuf>,
    /// Wine tree in use; the dist dir for Proton builds
    pub runner_root: Option<PathBuf>,
    /// Binary the command is prefixed with
    pub runner_bin: Option<PathBuf>,
    pub proton_root: Option<PathBuf>,
    pub is_proton: bool,
    /// Steam runtime tiers the runner declares
    pub runner_runtimes: Vec<String>,
    /// umu-run binary, set when umu replaces the direct runner call
    pub umu_run: Option<PathBuf>,
    pub gamescope_activated: bool,
    pub gamescope: Option<GamescopeWrap>,
    /// Prefix wrappers in collection order, outermost first
    pub tool_wrappers: Vec<String>,
    pub steam_runtime_entry: Option<PathBuf>,
}

/// Environment and metadata accumulated over one launch
#[derive(Clone, Debug, Default)]
pub struct ExecutionContext {
    env: BTreeMap<String, String>,
    unset: BTreeSet<String>,
    pub metadata: LaunchMetadata,
    pub flags: LaunchFlags,
}

impl ExecutionContext {
    pub fn new(flags: LaunchFlags) -> Self {
        Self {
            flags,
            ..Default::default()
        }
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Variables to drop from the inherited process environment
    pub fn unset(&self) -> &BTreeSet<String> {
        &self.unset
    }

    pub fn get_env(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    pub fn has_env(&self, key: &str) -> bool {
        self.env.contains_key(key)
    }

    pub fn add_env(&mut self, key: &str, value: impl Into<String>) {
        self.unset.remove(key);
        self.env.insert(key.to_string(), value.into());
    }

    /// Append to a list variable, or set it when absent or empty
    pub fn concat_env(&mut self, key: &str, value: impl AsRef<str>, sep: &str) {
        let value = value.as_ref();
        match self.env.get_mut(key) {
            Some(current) if !current.is_empty() => {
                current.push_str(sep);
                current.push_str(value);
            }
            _ => self.add_env(key, value),
        }
    }

    pub fn remove_env(&mut self, key: &str) -> Option<String> {
        self.unset.insert(key.to_string());
        self.env.remove(key)
    }

    pub fn into_parts(self) -> (BTreeMap<String, String>, BTreeSet<String>) {
        (self.env, self.unset)
    }
}

/// One ordered contributor to a launch's context
///
/// A strategist may read metadata written by strategists that ran before it.
/// Errors are reported to the pipeline, which logs them and moves on.
pub trait Strategist {
    fn name(&self) -> &'static str;

    fn apply(
        &self,
        ctx: &mut ExecutionContext,
        config: &BottleConfig,
    ) -> Result<(), StrategistError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_appends_with_separator() {
        let mut ctx = ExecutionContext::default();
        ctx.concat_env("LD_LIBRARY_PATH", "/a", ":");
        ctx.concat_env("LD_LIBRARY_PATH", "/b", ":");
        assert_eq!(ctx.get_env("LD_LIBRARY_PATH"), Some("/a:/b"));

        ctx.add_env("WINEDLLOVERRIDES", "");
        ctx.concat_env("WINEDLLOVERRIDES", "d3d9=n", ";");
        assert_eq!(ctx.get_env("WINEDLLOVERRIDES"), Some("d3d9=n"));
    }

    #[test]
    fn removed_vars_are_tracked_until_set_again() {
        let mut ctx = ExecutionContext::default();
        ctx.add_env("DISPLAY", ":0");
        assert_eq!(ctx.remove_env("DISPLAY").as_deref(), Some(":0"));
        assert!(ctx.unset().contains("DISPLAY"));

        ctx.add_env("DISPLAY", ":1");
        assert!(ctx.unset().is_empty());
    }
}
