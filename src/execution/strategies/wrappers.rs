//! Command wrapper strategists: umu-run, gamescope and simple prefix tools

use std::path::Path;

use crate::config::BottleConfig;
use crate::error::StrategistError;
use crate::execution::types::{ExecutionContext, GamescopeWrap, Strategist};
use crate::gamescope::gamescope_args;
use crate::host::LaunchHost;
use crate::umu::UMU_DEFAULT_ID;

/// Hands the launch to umu-run with the Proton build and game id
pub struct UmuStrategist<'h> {
    host: &'h LaunchHost,
}

impl<'h> UmuStrategist<'h> {
    pub fn new(host: &'h LaunchHost) -> Self {
        Self { host }
    }
}

impl Strategist for UmuStrategist<'_> {
    fn name(&self) -> &'static str {
        "umu"
    }

    fn apply(&self, ctx: &mut ExecutionContext, config: &BottleConfig) -> Result<(), StrategistError> {
        let params = &config.parameters;
        let Some(umu_run) = &self.host.tools.umu_run else {
            return Ok(());
        };
        if ctx.flags.return_steam_env || !params.use_umu {
            return Ok(());
        }
        let Some(proton_root) = ctx.metadata.proton_root.clone() else {
            tracing::debug!("umu - runner {} is not a Proton build, not wrapping", config.runner);
            return Ok(());
        };

        ctx.add_env("PROTONPATH", proton_root.to_string_lossy());

        let mut umu_id = params.umu_id.clone();
        if umu_id.is_empty() || umu_id == UMU_DEFAULT_ID {
            umu_id = self
                .host
                .umu_db
                .lookup(&config.name)
                .unwrap_or_else(|| UMU_DEFAULT_ID.to_string());
        }
        ctx.add_env("GAMEID", umu_id);
        ctx.add_env("STORE", params.umu_store.as_str());

        ctx.metadata.umu_run = Some(umu_run.clone());
        Ok(())
    }
}

/// Runs the game inside a gamescope session
pub struct GamescopeStrategist<'h> {
    host: &'h LaunchHost,
}

impl<'h> GamescopeStrategist<'h> {
    pub fn new(host: &'h LaunchHost) -> Self {
        Self { host }
    }
}

impl Strategist for GamescopeStrategist<'_> {
    fn name(&self) -> &'static str {
        "gamescope"
    }

    fn apply(&self, ctx: &mut ExecutionContext, config: &BottleConfig) -> Result<(), StrategistError> {
        let params = &config.parameters;
        ctx.metadata.gamescope_activated = params.gamescope;
        if !params.gamescope || ctx.flags.is_minimal {
            return Ok(());
        }
        let Some(bin) = &self.host.tools.gamescope else {
            tracing::warn!("gamescope - enabled for {} but not installed", config.name);
            return Ok(());
        };

        ctx.metadata.gamescope = Some(GamescopeWrap {
            bin: bin.clone(),
            args: gamescope_args(params),
            mangoapp: params.mangohud && self.host.tools.mangoapp.is_some(),
        });
        Ok(())
    }
}

/// gamemode, MangoHud and OBS capture as command prefixes
pub struct ToolWrapperStrategist<'h> {
    host: &'h LaunchHost,
}

impl<'h> ToolWrapperStrategist<'h> {
    pub fn new(host: &'h LaunchHost) -> Self {
        Self { host }
    }
}

impl Strategist for ToolWrapperStrategist<'_> {
    fn name(&self) -> &'static str {
        "tool-wrappers"
    }

    fn apply(&self, ctx: &mut ExecutionContext, config: &BottleConfig) -> Result<(), StrategistError> {
        if ctx.flags.is_minimal {
            return Ok(());
        }
        let params = &config.parameters;
        let tools = &self.host.tools;
        let steam_env = ctx.flags.return_steam_env;

        // Steam resolves bare names itself
        let wrapper = |bin: &Path, name: &str| {
            if steam_env {
                name.to_string()
            } else {
                bin.to_string_lossy().into_owned()
            }
        };

        let mut wrappers = Vec::new();
        if params.gamemode && let Some(bin) = &tools.gamemode {
            wrappers.push(wrapper(bin, "gamemoderun"));
        }
        if params.mangohud
            && !ctx.metadata.gamescope_activated
            && let Some(bin) = &tools.mangohud
        {
            wrappers.push(wrapper(bin, "mangohud"));
        }
        if params.obsvkc && let Some(bin) = &tools.obs_gamecapture {
            wrappers.push(wrapper(bin, "obs-gamecapture"));
        }

        ctx.metadata.tool_wrappers = wrappers;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BottleParameters;
    use crate::umu::UmuDatabase;
    use std::fs;
    use std::path::PathBuf;

    fn bottle(params: BottleParameters) -> BottleConfig {
        BottleConfig {
            name: "Psychonauts".to_string(),
            path: "Psychonauts".to_string(),
            runner: "GE-Proton9-4".to_string(),
            parameters: params,
            ..Default::default()
        }
    }

    fn tool_host(root: &Path) -> LaunchHost {
        let mut host = LaunchHost::bare(root);
        host.tools.umu_run = Some(PathBuf::from("/usr/bin/umu-run"));
        host.tools.gamescope = Some(PathBuf::from("/usr/bin/gamescope"));
        host.tools.gamemode = Some(PathBuf::from("/usr/bin/gamemoderun"));
        host.tools.mangohud = Some(PathBuf::from("/usr/bin/mangohud"));
        host.tools.mangoapp = Some(PathBuf::from("/usr/bin/mangoapp"));
        host.tools.obs_gamecapture = Some(PathBuf::from("/usr/bin/obs-gamecapture"));
        host
    }

    #[test]
    fn umu_needs_a_proton_root() {
        let dir = tempfile::tempdir().unwrap();
        let host = tool_host(dir.path());
        let config = bottle(BottleParameters {
            use_umu: true,
            umu_id: "umu-1234".to_string(),
            ..Default::default()
        });

        let mut plain = ExecutionContext::default();
        UmuStrategist::new(&host).apply(&mut plain, &config).unwrap();
        assert!(plain.metadata.umu_run.is_none());
        assert!(!plain.has_env("PROTONPATH"));

        let mut ctx = ExecutionContext::default();
        ctx.metadata.proton_root = Some(PathBuf::from("/runners/GE-Proton9-4"));
        UmuStrategist::new(&host).apply(&mut ctx, &config).unwrap();
        assert_eq!(ctx.get_env("PROTONPATH"), Some("/runners/GE-Proton9-4"));
        assert_eq!(ctx.get_env("GAMEID"), Some("umu-1234"));
        assert_eq!(ctx.get_env("STORE"), Some("none"));
        assert_eq!(ctx.metadata.umu_run, Some(PathBuf::from("/usr/bin/umu-run")));
    }

    #[test]
    fn default_umu_id_is_looked_up_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = tool_host(dir.path());
        let db = dir.path().join("umu.csv");
        fs::write(&db, "TITLE,STORE,CODENAME,UMU_ID\npsychonauts,none,,umu-psychonauts\n").unwrap();
        host.umu_db = UmuDatabase::local(db);

        let mut ctx = ExecutionContext::default();
        ctx.metadata.proton_root = Some(PathBuf::from("/proton"));
        let config = bottle(BottleParameters {
            use_umu: true,
            ..Default::default()
        });
        UmuStrategist::new(&host).apply(&mut ctx, &config).unwrap();
        assert_eq!(ctx.get_env("GAMEID"), Some("umu-psychonauts"));
    }

    #[test]
    fn gamescope_is_recorded_even_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let bare = LaunchHost::bare(dir.path());
        let config = bottle(BottleParameters {
            gamescope: true,
            mangohud: true,
            ..Default::default()
        });

        let mut ctx = ExecutionContext::default();
        GamescopeStrategist::new(&bare).apply(&mut ctx, &config).unwrap();
        assert!(ctx.metadata.gamescope_activated);
        assert!(ctx.metadata.gamescope.is_none());

        let host = tool_host(dir.path());
        GamescopeStrategist::new(&host).apply(&mut ctx, &config).unwrap();
        let wrap = ctx.metadata.gamescope.unwrap();
        assert_eq!(wrap.bin, PathBuf::from("/usr/bin/gamescope"));
        assert_eq!(wrap.args, vec!["-f"]);
        assert!(wrap.mangoapp);
    }

    #[test]
    fn tool_wrappers_keep_order_and_defer_mangohud() {
        let dir = tempfile::tempdir().unwrap();
        let host = tool_host(dir.path());
        let config = bottle(BottleParameters {
            gamemode: true,
            mangohud: true,
            obsvkc: true,
            ..Default::default()
        });

        let mut ctx = ExecutionContext::default();
        ToolWrapperStrategist::new(&host).apply(&mut ctx, &config).unwrap();
        assert_eq!(
            ctx.metadata.tool_wrappers,
            vec!["/usr/bin/gamemoderun", "/usr/bin/mangohud", "/usr/bin/obs-gamecapture"]
        );

        let mut scoped = ExecutionContext::default();
        scoped.flags.return_steam_env = true;
        scoped.metadata.gamescope_activated = true;
        ToolWrapperStrategist::new(&host).apply(&mut scoped, &config).unwrap();
        assert_eq!(
            scoped.metadata.tool_wrappers,
            vec!["gamemoderun", "obs-gamecapture"]
        );
    }

    #[test]
    fn minimal_launch_has_no_wrappers() {
        let dir = tempfile::tempdir().unwrap();
        let host = tool_host(dir.path());
        let config = bottle(BottleParameters {
            gamemode: true,
            gamescope: true,
            ..Default::default()
        });

        let mut ctx = ExecutionContext::default();
        ctx.flags.is_minimal = true;
        GamescopeStrategist::new(&host).apply(&mut ctx, &config).unwrap();
        ToolWrapperStrategist::new(&host).apply(&mut ctx, &config).unwrap();
        assert!(ctx.metadata.gamescope.is_none());
        assert!(ctx.metadata.tool_wrappers.is_empty());
    }
}
