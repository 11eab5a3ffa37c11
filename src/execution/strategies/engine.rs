//! Synchronization primitive and runtime strategists

use crate::config::{BottleConfig, SyncMode};
use crate::error::StrategistError;
use crate::execution::types::{ExecutionContext, Strategist};
use crate::host::LaunchHost;

const EAC_OVERRIDES: &str = "easyanticheat_x86,easyanticheat_x64=b,n";
const BATTLEYE_OVERRIDES: &str = "beclient,beclient_x64=b,n";

pub struct SyncStrategist<'h> {
    host: &'h LaunchHost,
}

impl<'h> SyncStrategist<'h> {
    pub fn new(host: &'h LaunchHost) -> Self {
        Self { host }
    }
}

impl Strategist for SyncStrategist<'_> {
    fn name(&self) -> &'static str {
        "sync"
    }

    fn apply(&self, ctx: &mut ExecutionContext, config: &BottleConfig) -> Result<(), StrategistError> {
        match config.parameters.sync {
            SyncMode::Esync => ctx.add_env("WINEESYNC", "1"),
            SyncMode::Fsync => ctx.add_env("WINEFSYNC", "1"),
            SyncMode::Ntsync => ctx.add_env("WINENTSYNC", "1"),
            SyncMode::Wine => {}
        }

        if self.host.ntsync.is_some() && ctx.metadata.is_proton {
            ctx.add_env("PROTON_USE_NTSYNC", "1");
        }
        Ok(())
    }
}

/// Bottles runtime libraries, anti-cheat runtimes and Steam runtime wrapping
pub struct RuntimeStrategist<'h> {
    host: &'h LaunchHost,
}

impl<'h> RuntimeStrategist<'h> {
    pub fn new(host: &'h LaunchHost) -> Self {
        Self { host }
    }
}

impl Strategist for RuntimeStrategist<'_> {
    fn name(&self) -> &'static str {
        "runtime"
    }

    fn apply(&self, ctx: &mut ExecutionContext, config: &BottleConfig) -> Result<(), StrategistError> {
        if ctx.flags.return_steam_env || ctx.flags.is_terminal {
            return Ok(());
        }
        let params = &config.parameters;
        let runtimes = &self.host.runtimes;

        if params.use_runtime || params.use_eac_runtime || params.use_be_runtime {
            if runtimes.bottles_libs.is_empty() {
                tracing::warn!("runtime - bottles runtime was requested but not found");
            } else {
                if params.use_runtime {
                    tracing::info!("runtime - using bottles runtime");
                    let libs: Vec<String> = runtimes
                        .bottles_libs
                        .iter()
                        .map(|l| l.to_string_lossy().into_owned())
                        .collect();
                    ctx.concat_env("LD_LIBRARY_PATH", libs.join(":"), ":");
                }

                if !ctx.flags.is_minimal {
                    if params.use_eac_runtime && let Some(eac) = &runtimes.eac {
                        tracing::info!("runtime - using EasyAntiCheat runtime");
                        ctx.add_env("PROTON_EAC_RUNTIME", eac.to_string_lossy());
                        ctx.concat_env("WINEDLLOVERRIDES", EAC_OVERRIDES, ";");
                    }
                    if params.use_be_runtime && let Some(battleye) = &runtimes.battleye {
                        tracing::info!("runtime - using BattlEye runtime");
                        ctx.add_env("PROTON_BATTLEYE_RUNTIME", battleye.to_string_lossy());
                        ctx.concat_env("WINEDLLOVERRIDES", BATTLEYE_OVERRIDES, ";");
                    }
                }
            }
        }

        if params.use_steam_runtime {
            match runtimes.pick_steam_runtime(&ctx.metadata.runner_runtimes) {
                Some((tier, entry)) => {
                    tracing::info!("runtime - using Steam runtime {}", tier);
                    ctx.metadata.steam_runtime_entry = Some(entry.to_path_buf());
                }
                None => tracing::warn!("runtime - Steam runtime requested but no valid combination found"),
            }
        }
        Ok(())
    }
}
