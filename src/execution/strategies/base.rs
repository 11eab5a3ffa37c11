//! Prefix, runner and display strategists

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{Arch, BottleConfig};
use crate::discovery::SYSTEM_RUNNER_PREFIX;
use crate::error::StrategistError;
use crate::execution::types::{ExecutionContext, Strategist};
use crate::host::{DisplayServer, LaunchHost};
use crate::steam;

static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());

const WIN64_RUNNER_LIBS: [&str; 8] = [
    "lib",
    "lib64",
    "lib/wine/x86_64-unix",
    "lib32/wine/x86_64-unix",
    "lib64/wine/x86_64-unix",
    "lib/wine/i386-unix",
    "lib32/wine/i386-unix",
    "lib64/wine/i386-unix",
];

const WIN32_RUNNER_LIBS: [&str; 4] = [
    "lib",
    "lib/wine/i386-unix",
    "lib32/wine/i386-unix",
    "lib64/wine/i386-unix",
];

/// Prefix location, architecture, debug level, locale and user overrides
pub struct BaseStrategist<'h> {
    host: &'h LaunchHost,
}

impl<'h> BaseStrategist<'h> {
    pub fn new(host: &'h LaunchHost) -> Self {
        Self { host }
    }
}

impl Strategist for BaseStrategist<'_> {
    fn name(&self) -> &'static str {
        "base"
    }

    fn apply(&self, ctx: &mut ExecutionContext, config: &BottleConfig) -> Result<(), StrategistError> {
        if config.path.is_empty() && !config.is_steam() {
            return Err(StrategistError::Missing("bottle path".to_string()));
        }
        let bottle_path = config.bottle_path(&self.host.paths);

        ctx.add_env("BOTTLE", config.path.as_str());
        ctx.metadata.bottle_path = Some(bottle_path.clone());

        if !ctx.flags.return_steam_env {
            ctx.add_env("WINEPREFIX", bottle_path.to_string_lossy());
            ctx.add_env("WINEARCH", config.arch.as_str());
            let debug_level = if config.parameters.fixme_logs {
                "+fixme-all"
            } else {
                "fixme-all"
            };
            ctx.add_env("WINEDEBUG", debug_level);
        }

        if config.language != "sys" {
            ctx.add_env("LC_ALL", config.language.as_str());
        }

        for (key, value) in &config.environment_variables {
            ctx.add_env(key, value.as_str());
        }

        if !config.dll_overrides.is_empty() {
            let overrides: Vec<String> = config
                .dll_overrides
                .iter()
                .map(|(dll, mode)| format!("{}={}", dll, mode))
                .collect();
            ctx.concat_env("WINEDLLOVERRIDES", overrides.join(";"), ";");
        }
        Ok(())
    }
}

/// Resolves the runner and its library and plugin paths
pub struct RunnerStrategist<'h> {
    host: &'h LaunchHost,
}

impl<'h> RunnerStrategist<'h> {
    pub fn new(host: &'h LaunchHost) -> Self {
        Self { host }
    }

    /// Runner directory and binary before Proton classification
    fn locate(&self, config: &BottleConfig) -> Result<(PathBuf, Option<PathBuf>), StrategistError> {
        if config.is_steam() {
            let runner_path = config
                .runner_path
                .as_deref()
                .ok_or_else(|| StrategistError::Missing("RunnerPath".to_string()))?;
            return Ok((PathBuf::from(runner_path), None));
        }
        if config.runner.starts_with(SYSTEM_RUNNER_PREFIX) {
            let wine = self
                .host
                .system_wine
                .clone()
                .ok_or_else(|| StrategistError::Missing("system wine".to_string()))?;
            // /usr/bin/wine -> /usr
            let root = wine
                .parent()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("/"));
            return Ok((root, Some(wine)));
        }
        if config.runner.is_empty() {
            return Err(StrategistError::Missing("runner".to_string()));
        }
        Ok((self.host.runner_dir(&config.runner), None))
    }
}

/// Older GE and soda builds hang on the Steam virtual gamepad info
pub fn needs_gamepad_workaround(runner: &str) -> bool {
    let normalized = runner.to_lowercase();
    if !["ge-proton", "proton-ge", "wine-ge", "soda"]
        .iter()
        .any(|family| normalized.contains(family))
    {
        return false;
    }
    FIRST_NUMBER
        .captures(&normalized)
        .and_then(|c| c[1].parse::<u32>().ok())
        .is_some_and(|major| major <= 8)
}

impl Strategist for RunnerStrategist<'_> {
    fn name(&self) -> &'static str {
        "runner"
    }

    fn apply(&self, ctx: &mut ExecutionContext, config: &BottleConfig) -> Result<(), StrategistError> {
        let (dir, system_bin) = self.locate(config)?;
        let is_proton = system_bin.is_none() && steam::is_proton(&dir);
        let root = if is_proton {
            steam::dist_directory(&dir)
        } else {
            dir.clone()
        };

        let mut runtimes = if is_proton {
            steam::required_runtimes(&dir)
        } else {
            Vec::new()
        };
        for declared in &config.runner_runtime {
            if !runtimes.contains(declared) {
                runtimes.push(declared.clone());
            }
        }

        tracing::debug!("runner - {} at {} (proton: {})", config.runner, root.display(), is_proton);
        ctx.metadata.runner_bin = Some(system_bin.unwrap_or_else(|| root.join("bin/wine")));
        ctx.metadata.runner_root = Some(root.clone());
        ctx.metadata.proton_root = is_proton.then_some(dir);
        ctx.metadata.is_proton = is_proton;
        ctx.metadata.runner_runtimes = runtimes;

        if needs_gamepad_workaround(&config.runner) {
            ctx.add_env("SteamVirtualGamepadInfo", "");
        }

        let runner_libs: &[&str] = match config.arch {
            Arch::Win64 => &WIN64_RUNNER_LIBS,
            Arch::Win32 => &WIN32_RUNNER_LIBS,
        };
        if !config.runner.starts_with(SYSTEM_RUNNER_PREFIX) {
            let ld_paths = existing_joined(&root, runner_libs);
            if !ld_paths.is_empty() {
                ctx.concat_env("LD_LIBRARY_PATH", ld_paths.join(":"), ":");
            }
        }

        let system_gst = ctx.has_env("BOTTLES_USE_SYSTEM_GSTREAMER")
            || self.host.has_env("BOTTLES_USE_SYSTEM_GSTREAMER");
        if !system_gst && !ctx.flags.return_steam_env {
            let gst_libs: &[&str] = match config.arch {
                Arch::Win64 => &["lib64/gstreamer-1.0", "lib/gstreamer-1.0", "lib32/gstreamer-1.0"],
                Arch::Win32 => &["lib/gstreamer-1.0", "lib32/gstreamer-1.0"],
            };
            let gst_paths = existing_joined(&root, gst_libs);
            if !gst_paths.is_empty() {
                ctx.add_env("GST_PLUGIN_SYSTEM_PATH", gst_paths.join(":"));
            }
        }
        Ok(())
    }
}

fn existing_joined(root: &Path, subdirs: &[&str]) -> Vec<String> {
    subdirs
        .iter()
        .map(|sub| root.join(sub))
        .filter(|path| path.exists())
        .map(|path| path.to_string_lossy().into_owned())
        .collect()
}

/// Wayland session variables
pub struct WaylandStrategist<'h> {
    host: &'h LaunchHost,
}

impl<'h> WaylandStrategist<'h> {
    pub fn new(host: &'h LaunchHost) -> Self {
        Self { host }
    }
}

impl Strategist for WaylandStrategist<'_> {
    fn name(&self) -> &'static str {
        "wayland"
    }

    fn apply(&self, ctx: &mut ExecutionContext, config: &BottleConfig) -> Result<(), StrategistError> {
        if !config.parameters.wayland || self.host.display != DisplayServer::Wayland {
            return Ok(());
        }

        if !ctx.has_env("WAYLAND_DISPLAY")
            && let Some(display) = self.host.wayland_display.as_deref().filter(|d| !d.is_empty())
        {
            ctx.add_env("WAYLAND_DISPLAY", display);
        }
        if ctx.has_env("WAYLAND_DISPLAY") {
            ctx.remove_env("DISPLAY");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BottleEnvironment, BottleParameters};
    use std::fs;

    const PROTON_MANIFEST: &str = r#""manifest"
{
  "commandline" "/proton %verb%"
  "require_tool_appid" "1391110"
}"#;

    fn bottle() -> BottleConfig {
        BottleConfig {
            name: "Games".to_string(),
            path: "Games".to_string(),
            runner: "soda-7.0-9".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn base_sets_prefix_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let host = LaunchHost::bare(dir.path());
        let mut config = bottle();
        config.language = "it_IT.UTF-8".to_string();
        config.parameters.fixme_logs = true;
        config.environment_variables.insert("DXVK_HUD".into(), "fps".into());
        config.dll_overrides.insert("d3d9".into(), "n,b".into());
        config.dll_overrides.insert("xinput1_3".into(), "b".into());

        let mut ctx = ExecutionContext::default();
        BaseStrategist::new(&host).apply(&mut ctx, &config).unwrap();

        let prefix = dir.path().join("bottles/Games");
        assert_eq!(ctx.get_env("BOTTLE"), Some("Games"));
        assert_eq!(ctx.get_env("WINEPREFIX"), Some(prefix.to_str().unwrap()));
        assert_eq!(ctx.get_env("WINEARCH"), Some("win64"));
        assert_eq!(ctx.get_env("WINEDEBUG"), Some("+fixme-all"));
        assert_eq!(ctx.get_env("LC_ALL"), Some("it_IT.UTF-8"));
        assert_eq!(ctx.get_env("DXVK_HUD"), Some("fps"));
        assert_eq!(ctx.get_env("WINEDLLOVERRIDES"), Some("d3d9=n,b;xinput1_3=b"));
        assert_eq!(ctx.metadata.bottle_path, Some(prefix));
    }

    #[test]
    fn steam_env_skips_prefix_vars() {
        let dir = tempfile::tempdir().unwrap();
        let host = LaunchHost::bare(dir.path());
        let mut ctx = ExecutionContext::default();
        ctx.flags.return_steam_env = true;
        BaseStrategist::new(&host).apply(&mut ctx, &bottle()).unwrap();

        assert!(ctx.has_env("BOTTLE"));
        assert!(!ctx.has_env("WINEPREFIX"));
        assert!(!ctx.has_env("WINEDEBUG"));
        assert!(!ctx.has_env("LC_ALL"));
    }

    #[test]
    fn managed_runner_gets_libs_and_workaround() {
        let dir = tempfile::tempdir().unwrap();
        let host = LaunchHost::bare(dir.path());
        let runner = dir.path().join("runners/soda-7.0-9");
        for sub in ["bin", "lib", "lib64", "lib/wine/x86_64-unix", "lib64/gstreamer-1.0"] {
            fs::create_dir_all(runner.join(sub)).unwrap();
        }

        let mut ctx = ExecutionContext::default();
        RunnerStrategist::new(&host).apply(&mut ctx, &bottle()).unwrap();

        assert_eq!(ctx.metadata.runner_bin, Some(runner.join("bin/wine")));
        assert!(!ctx.metadata.is_proton);
        assert_eq!(ctx.get_env("SteamVirtualGamepadInfo"), Some(""));
        let ld = ctx.get_env("LD_LIBRARY_PATH").unwrap();
        assert_eq!(ld.split(':').count(), 3);
        assert!(ld.ends_with("lib/wine/x86_64-unix"));
        assert!(ctx.get_env("GST_PLUGIN_SYSTEM_PATH").unwrap().ends_with("lib64/gstreamer-1.0"));
    }

    #[test]
    fn proton_runner_uses_dist_dir() {
        let dir = tempfile::tempdir().unwrap();
        let host = LaunchHost::bare(dir.path());
        let proton = dir.path().join("runners/GE-Proton9-4");
        fs::create_dir_all(proton.join("files/lib64")).unwrap();
        fs::write(proton.join("toolmanifest.vdf"), PROTON_MANIFEST).unwrap();

        let mut config = bottle();
        config.runner = "GE-Proton9-4".to_string();
        config.runner_runtime = vec!["sniper".to_string()];
        let mut ctx = ExecutionContext::default();
        RunnerStrategist::new(&host).apply(&mut ctx, &config).unwrap();

        assert!(ctx.metadata.is_proton);
        assert_eq!(ctx.metadata.proton_root, Some(proton.clone()));
        assert_eq!(ctx.metadata.runner_bin, Some(proton.join("files/bin/wine")));
        assert_eq!(ctx.metadata.runner_runtimes, vec!["soldier", "sniper"]);
        assert!(!ctx.has_env("SteamVirtualGamepadInfo"));
    }

    #[test]
    fn system_runner_without_wine_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = LaunchHost::bare(dir.path());
        let mut config = bottle();
        config.runner = "sys-wine-9.0".to_string();

        let mut ctx = ExecutionContext::default();
        assert!(RunnerStrategist::new(&host).apply(&mut ctx, &config).is_err());

        host.system_wine = Some(PathBuf::from("/usr/bin/wine"));
        RunnerStrategist::new(&host).apply(&mut ctx, &config).unwrap();
        assert_eq!(ctx.metadata.runner_bin, Some(PathBuf::from("/usr/bin/wine")));
        assert_eq!(ctx.metadata.runner_root, Some(PathBuf::from("/usr")));
        assert!(!ctx.has_env("LD_LIBRARY_PATH"));
    }

    #[test]
    fn steam_bottle_needs_runner_path() {
        let dir = tempfile::tempdir().unwrap();
        let host = LaunchHost::bare(dir.path());
        let mut config = BottleConfig {
            environment: BottleEnvironment::Steam,
            ..bottle()
        };
        let mut ctx = ExecutionContext::default();
        assert!(matches!(
            RunnerStrategist::new(&host).apply(&mut ctx, &config),
            Err(StrategistError::Missing(_))
        ));

        config.runner_path = Some("/steam/Proton 9.0".to_string());
        RunnerStrategist::new(&host).apply(&mut ctx, &config).unwrap();
        assert_eq!(
            ctx.metadata.runner_bin,
            Some(PathBuf::from("/steam/Proton 9.0/bin/wine"))
        );
    }

    #[test]
    fn gamepad_workaround_matches_old_builds() {
        assert!(needs_gamepad_workaround("GE-Proton8-25"));
        assert!(needs_gamepad_workaround("soda-7.0-9"));
        assert!(!needs_gamepad_workaround("GE-Proton9-4"));
        assert!(!needs_gamepad_workaround("caffe-7.20"));
        assert!(!needs_gamepad_workaround("wine-ge-custom"));
    }

    #[test]
    fn wayland_needs_toggle_and_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = LaunchHost::bare(dir.path());
        host.wayland_display = Some("wayland-0".to_string());
        let config = BottleConfig {
            parameters: BottleParameters {
                wayland: true,
                ..Default::default()
            },
            ..bottle()
        };

        let mut ctx = ExecutionContext::default();
        ctx.add_env("DISPLAY", ":0");
        WaylandStrategist::new(&host).apply(&mut ctx, &config).unwrap();
        assert!(!ctx.has_env("WAYLAND_DISPLAY"));

        host.display = DisplayServer::Wayland;
        WaylandStrategist::new(&host).apply(&mut ctx, &config).unwrap();
        assert_eq!(ctx.get_env("WAYLAND_DISPLAY"), Some("wayland-0"));
        assert!(!ctx.has_env("DISPLAY"));
        assert!(ctx.unset().contains("DISPLAY"));
    }
}
