//! Host facts consulted while resolving a launch
//!
//! Everything the strategists would otherwise probe on their own (display
//! server, GPUs, helper binaries, runtimes) is detected once here so a
//! launch can be resolved against a fixed snapshot. Tests build a bare host
//! and fill in only what they need.

use std::env;
use std::path::{Path, PathBuf};

use crate::discovery::find_system_wine;
use crate::gpu::{self, GpuInfo};
use crate::paths::{BIN_GAMESCOPE, BIN_UMU_RUN, ComponentPaths, find_binary};
use crate::runtime::RuntimeSet;
use crate::steam;
use crate::umu::UmuDatabase;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayServer {
    #[default]
    X11,
    Wayland,
}

impl DisplayServer {
    /// Session type from `XDG_SESSION_TYPE`, falling back to `WAYLAND_DISPLAY`
    pub fn from_session(session_type: Option<&str>, wayland_display: Option<&str>) -> Self {
        match session_type {
            Some("wayland") => DisplayServer::Wayland,
            Some("x11") => DisplayServer::X11,
            _ if wayland_display.is_some_and(|d| !d.is_empty()) => DisplayServer::Wayland,
            _ => DisplayServer::X11,
        }
    }
}

/// Helper binaries found on the host
#[derive(Clone, Debug, Default)]
pub struct HostTools {
    pub umu_run: Option<PathBuf>,
    pub gamescope: Option<PathBuf>,
    pub gamemode: Option<PathBuf>,
    pub mangohud: Option<PathBuf>,
    pub mangoapp: Option<PathBuf>,
    pub obs_gamecapture: Option<PathBuf>,
}

impl HostTools {
    pub fn detect() -> Self {
        Self {
            umu_run: BIN_UMU_RUN.clone(),
            gamescope: BIN_GAMESCOPE.clone(),
            gamemode: find_binary("gamemoderun"),
            mangohud: find_binary("mangohud"),
            mangoapp: find_binary("mangoapp"),
            obs_gamecapture: find_binary("obs-gamecapture"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LaunchHost {
    pub paths: ComponentPaths,
    pub display: DisplayServer,
    pub wayland_display: Option<String>,
    /// Path of the ntsync device when the kernel exposes one
    pub ntsync: Option<PathBuf>,
    pub gpu: GpuInfo,
    pub tools: HostTools,
    pub runtimes: RuntimeSet,
    pub system_wine: Option<PathBuf>,
    /// Steam tool roots searched for runners missing from the runners dir
    pub compat_roots: Vec<PathBuf>,
    pub umu_db: UmuDatabase,
    /// Process environment, consulted for opt-outs such as system gstreamer
    pub env: Vec<(String, String)>,
}

impl LaunchHost {
    /// Snapshot of the running host
    pub fn detect(paths: ComponentPaths) -> Self {
        let wayland_display = env::var("WAYLAND_DISPLAY").ok();
        let session = env::var("XDG_SESSION_TYPE").ok();
        let display = DisplayServer::from_session(session.as_deref(), wayland_display.as_deref());
        let ntsync = Some(PathBuf::from("/dev/ntsync")).filter(|p| p.exists());

        let host = Self {
            runtimes: RuntimeSet::detect(&paths),
            paths,
            display,
            wayland_display,
            ntsync,
            gpu: gpu::detect(),
            tools: HostTools::detect(),
            system_wine: find_system_wine(),
            compat_roots: steam::compatibility_tools_paths(),
            umu_db: UmuDatabase::default(),
            env: env::vars().collect(),
        };
        tracing::info!(
            "host - display {:?}, ntsync {}, {} gpu vendor(s)",
            host.display,
            host.ntsync.is_some(),
            host.gpu.vendors.len()
        );
        host
    }

    /// Host with nothing detected, rooted at `root`
    pub fn bare(root: &Path) -> Self {
        Self {
            paths: ComponentPaths::under(root),
            display: DisplayServer::X11,
            wayland_display: None,
            ntsync: None,
            gpu: GpuInfo::default(),
            tools: HostTools::default(),
            runtimes: RuntimeSet::default(),
            system_wine: None,
            compat_roots: Vec::new(),
            umu_db: UmuDatabase::local(root.join("umu-database.csv")),
            env: Vec::new(),
        }
    }

    pub fn has_env(&self, key: &str) -> bool {
        self.env.iter().any(|(k, _)| k == key)
    }

    /// Install directory of a runner: managed dir first, then Steam tool roots
    pub fn runner_dir(&self, runner: &str) -> PathBuf {
        let managed = self.paths.runners.join(runner);
        if managed.exists() {
            return managed;
        }
        self.compat_roots
            .iter()
            .map(|root| root.join(runner))
            .find(|candidate| candidate.exists())
            .unwrap_or(managed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_type_wins_over_wayland_display() {
        assert_eq!(
            DisplayServer::from_session(Some("x11"), Some("wayland-0")),
            DisplayServer::X11
        );
        assert_eq!(
            DisplayServer::from_session(Some("wayland"), None),
            DisplayServer::Wayland
        );
        assert_eq!(
            DisplayServer::from_session(None, Some("wayland-1")),
            DisplayServer::Wayland
        );
        assert_eq!(DisplayServer::from_session(Some("tty"), Some("")), DisplayServer::X11);
    }

    #[test]
    fn bare_host_detects_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let host = LaunchHost::bare(dir.path());
        assert!(host.tools.gamescope.is_none());
        assert!(host.gpu.vendors.is_empty());
        assert!(!host.has_env("HOME"));
        assert_eq!(host.paths.runners, dir.path().join("runners"));
    }
}
