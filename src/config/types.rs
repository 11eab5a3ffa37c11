use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::paths::ComponentPaths;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Arch {
    #[serde(rename = "win32")]
    Win32,
    #[default]
    #[serde(rename = "win64")]
    Win64,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Win32 => "win32",
            Arch::Win64 => "win64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of bottle; Steam bottles live in Steam's compatdata
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BottleEnvironment {
    Gaming,
    Application,
    Steam,
    #[default]
    #[serde(other)]
    Custom,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    Esync,
    Fsync,
    Ntsync,
    #[default]
    #[serde(other)]
    Wine,
}

/// Per-bottle toggles consulted by the launch strategists
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BottleParameters {
    pub dxvk: bool,
    pub dxvk_nvapi: bool,
    pub vkd3d: bool,
    pub latencyflex: bool,
    pub mangohud: bool,
    pub mangohud_display_on_game_start: bool,
    pub obsvkc: bool,
    pub vkbasalt: bool,
    pub gamemode: bool,
    pub fsr: bool,
    pub fsr_sharpening_strength: u32,
    pub fsr_quality_mode: String,
    pub discrete_gpu: bool,
    pub wayland: bool,
    pub sync: SyncMode,
    pub fixme_logs: bool,

    pub gamescope: bool,
    pub gamescope_game_width: u32,
    pub gamescope_game_height: u32,
    pub gamescope_window_width: u32,
    pub gamescope_window_height: u32,
    pub gamescope_fps: u32,
    pub gamescope_fps_no_focus: u32,
    pub gamescope_scaling: bool,
    pub gamescope_borderless: bool,
    pub gamescope_fullscreen: bool,

    pub use_runtime: bool,
    pub use_eac_runtime: bool,
    pub use_be_runtime: bool,
    pub use_steam_runtime: bool,

    pub use_umu: bool,
    pub umu_id: String,
    pub umu_store: String,

    pub sandbox: bool,
}

impl Default for BottleParameters {
    fn default() -> Self {
        BottleParameters {
            dxvk: false,
            dxvk_nvapi: false,
            vkd3d: false,
            latencyflex: false,
            mangohud: false,
            mangohud_display_on_game_start: true,
            obsvkc: false,
            vkbasalt: false,
            gamemode: false,
            fsr: false,
            fsr_sharpening_strength: 2,
            fsr_quality_mode: String::new(),
            discrete_gpu: false,
            wayland: false,
            sync: SyncMode::Wine,
            fixme_logs: false,
            gamescope: false,
            gamescope_game_width: 0,
            gamescope_game_height: 0,
            gamescope_window_width: 0,
            gamescope_window_height: 0,
            gamescope_fps: 0,
            gamescope_fps_no_focus: 0,
            gamescope_scaling: false,
            gamescope_borderless: false,
            gamescope_fullscreen: true,
            use_runtime: false,
            use_eac_runtime: true,
            use_be_runtime: true,
            use_steam_runtime: false,
            use_umu: false,
            umu_id: "umu-default".to_string(),
            umu_store: "none".to_string(),
            sandbox: false,
        }
    }
}

/// What a sandboxed bottle may see of the host
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SandboxParameters {
    pub share_net: bool,
    pub share_user: bool,
    pub share_host_ro: bool,
    pub share_sound: bool,
    pub share_gpu: bool,
    pub share_display: bool,
    pub share_paths_ro: Vec<String>,
    pub share_paths_rw: Vec<String>,
}

impl Default for SandboxParameters {
    fn default() -> Self {
        SandboxParameters {
            share_net: false,
            share_user: false,
            share_host_ro: true,
            share_sound: true,
            share_gpu: true,
            share_display: true,
            share_paths_ro: Vec::new(),
            share_paths_rw: Vec::new(),
        }
    }
}

/// Snapshot of one bottle's `bottle.yml`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BottleConfig {
    #[serde(rename = "Name")]
    pub name: String,
    /// Directory name under the bottles dir, or a full path when `custom_path` is set
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "Custom_Path")]
    pub custom_path: bool,
    #[serde(rename = "Environment")]
    pub environment: BottleEnvironment,
    #[serde(rename = "Runner")]
    pub runner: String,
    /// Runner location handed over by Steam for Steam bottles
    #[serde(rename = "RunnerPath", skip_serializing_if = "Option::is_none")]
    pub runner_path: Option<String>,
    #[serde(rename = "CompatData")]
    pub compat_data: String,
    #[serde(rename = "Arch")]
    pub arch: Arch,
    #[serde(rename = "Language")]
    pub language: String,
    #[serde(rename = "LatencyFleX")]
    pub latencyflex: String,
    #[serde(rename = "Parameters")]
    pub parameters: BottleParameters,
    #[serde(rename = "Sandbox")]
    pub sandbox: SandboxParameters,
    #[serde(rename = "Environment_Variables")]
    pub environment_variables: BTreeMap<String, String>,
    #[serde(rename = "DLL_Overrides")]
    pub dll_overrides: BTreeMap<String, String>,
    /// Steam runtime tiers the runner declares compatibility with
    #[serde(rename = "RunnerRuntime")]
    pub runner_runtime: Vec<String>,
}

impl Default for BottleConfig {
    fn default() -> Self {
        BottleConfig {
            name: String::new(),
            path: String::new(),
            custom_path: false,
            environment: BottleEnvironment::Custom,
            runner: String::new(),
            runner_path: None,
            compat_data: String::new(),
            arch: Arch::Win64,
            language: "sys".to_string(),
            latencyflex: String::new(),
            parameters: BottleParameters::default(),
            sandbox: SandboxParameters::default(),
            environment_variables: BTreeMap::new(),
            dll_overrides: BTreeMap::new(),
            runner_runtime: Vec::new(),
        }
    }
}

impl BottleConfig {
    /// Host directory of the bottle (its wine prefix)
    pub fn bottle_path(&self, paths: &ComponentPaths) -> PathBuf {
        if self.environment == BottleEnvironment::Steam {
            return paths.steam.join(&self.compat_data);
        }
        if self.custom_path {
            return PathBuf::from(&self.path);
        }
        paths.bottles.join(&self.path)
    }

    pub fn is_steam(&self) -> bool {
        self.environment == BottleEnvironment::Steam
    }
}

/// Application-wide settings
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    /// Allow `rc`/`unstable` catalog entries when installing
    pub release_candidate: bool,
    pub force_offline: bool,
    pub steam_proton_support: bool,
    /// Wipe the temp dir on first-run checks
    pub temp_cleanup: bool,
}
