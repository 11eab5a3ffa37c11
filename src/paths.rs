use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::catalog::ComponentKind;

pub static PATH_HOME: LazyLock<PathBuf> =
    LazyLock::new(|| PathBuf::from(env::var("HOME").unwrap_or_default()));

pub static PATH_LOCAL_SHARE: LazyLock<PathBuf> = LazyLock::new(|| PATH_HOME.join(".local/share"));

pub static PATH_DATA: LazyLock<PathBuf> = LazyLock::new(|| {
    if let Ok(xdg_data_home) = env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data_home).join("bottles");
    }
    PATH_LOCAL_SHARE.join("bottles")
});

pub static PATH_STEAM: LazyLock<PathBuf> = LazyLock::new(|| {
    // Check for native Steam installation first
    if PATH_LOCAL_SHARE.join("Steam").exists() {
        PATH_LOCAL_SHARE.join("Steam")
    } else if PATH_HOME.join(".steam/steam").exists() {
        // Follow the symlink at ~/.steam/steam
        PATH_HOME.join(".steam/steam")
    } else if PATH_HOME
        .join(".var/app/com.valvesoftware.Steam/.local/share/Steam")
        .exists()
    {
        // Flatpak Steam
        PATH_HOME.join(".var/app/com.valvesoftware.Steam/.local/share/Steam")
    } else {
        PATH_LOCAL_SHARE.join("Steam")
    }
});

/// Location of every directory the discovery and launch code reads from.
///
/// The default value is rooted at [`PATH_DATA`]; tests build one with
/// [`ComponentPaths::under`] so nothing touches the real data dir.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentPaths {
    pub root: PathBuf,
    pub runners: PathBuf,
    pub runtimes: PathBuf,
    pub winebridge: PathBuf,
    pub dxvk: PathBuf,
    pub vkd3d: PathBuf,
    pub nvapi: PathBuf,
    pub latencyflex: PathBuf,
    pub bottles: PathBuf,
    pub templates: PathBuf,
    pub temp: PathBuf,
    pub steam: PathBuf,
}

impl ComponentPaths {
    pub fn under(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            runners: root.join("runners"),
            runtimes: root.join("runtimes"),
            winebridge: root.join("winebridge"),
            dxvk: root.join("dxvk"),
            vkd3d: root.join("vkd3d"),
            nvapi: root.join("nvapi"),
            latencyflex: root.join("latencyflex"),
            bottles: root.join("bottles"),
            templates: root.join("templates"),
            temp: root.join("temp"),
            steam: root.join("steam"),
        }
    }

    /// Directory holding installed builds of a component type
    pub fn for_kind(&self, kind: ComponentKind) -> &Path {
        match kind {
            ComponentKind::Runner => &self.runners,
            ComponentKind::Runtime => &self.runtimes,
            ComponentKind::WineBridge => &self.winebridge,
            ComponentKind::Dxvk => &self.dxvk,
            ComponentKind::Vkd3d => &self.vkd3d,
            ComponentKind::Nvapi => &self.nvapi,
            ComponentKind::LatencyFlex => &self.latencyflex,
        }
    }

    /// Install location of one build of a component
    pub fn component_path(&self, kind: ComponentKind, identifier: &str) -> PathBuf {
        self.for_kind(kind).join(identifier)
    }

    /// Directories that must exist before any discovery runs, with a display name
    pub fn app_dirs(&self) -> Vec<(&Path, &'static str)> {
        vec![
            (self.runners.as_path(), "Runners"),
            (self.runtimes.as_path(), "Runtimes"),
            (self.winebridge.as_path(), "WineBridge"),
            (self.bottles.as_path(), "Bottles"),
            (self.dxvk.as_path(), "Dxvk"),
            (self.vkd3d.as_path(), "Vkd3d"),
            (self.nvapi.as_path(), "Nvapi"),
            (self.templates.as_path(), "Templates"),
            (self.temp.as_path(), "Temp"),
            (self.latencyflex.as_path(), "LatencyFleX"),
        ]
    }
}

impl Default for ComponentPaths {
    fn default() -> Self {
        let mut paths = Self::under(&PATH_DATA);
        paths.steam = PATH_STEAM.clone();
        paths
    }
}

pub static BIN_UMU_RUN: LazyLock<Option<PathBuf>> = LazyLock::new(|| find_binary("umu-run"));

pub static BIN_GAMESCOPE: LazyLock<Option<PathBuf>> = LazyLock::new(|| find_binary("gamescope"));

/// Look a helper binary up in PATH, then in the usual install prefixes
pub fn find_binary(name: &str) -> Option<PathBuf> {
    if let Ok(bin) = which::which(name) {
        return Some(bin);
    }

    let bin_candidates = [PathBuf::from("/usr/bin"), PathBuf::from("/usr/local/bin")];
    for candidate in &bin_candidates {
        let bin = candidate.join(name);
        if bin.exists() {
            return Some(bin);
        }
    }
    None
}
