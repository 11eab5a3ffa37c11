//! Graphics backend, overlay and GPU selection strategists

use crate::catalog::ComponentKind;
use crate::config::BottleConfig;
use crate::error::StrategistError;
use crate::execution::types::{ExecutionContext, Strategist};
use crate::gpu::GpuProfile;
use crate::host::{DisplayServer, LaunchHost};

/// Cache dirs and enable flags for every graphics toggle
pub struct GraphicsStrategist<'h> {
    host: &'h LaunchHost,
}

impl<'h> GraphicsStrategist<'h> {
    pub fn new(host: &'h LaunchHost) -> Self {
        Self { host }
    }
}

impl Strategist for GraphicsStrategist<'_> {
    fn name(&self) -> &'static str {
        "graphics"
    }

    fn apply(&self, ctx: &mut ExecutionContext, config: &BottleConfig) -> Result<(), StrategistError> {
        if ctx.flags.return_steam_env {
            return Ok(());
        }
        let params = &config.parameters;
        let minimal = ctx.flags.is_minimal;
        let bottle_path = config.bottle_path(&self.host.paths);
        let cache = |name: &str| bottle_path.join("cache").join(name).to_string_lossy().into_owned();

        // DXVK and VKD3D
        if params.dxvk {
            ctx.add_env("WINE_LARGE_ADDRESS_AWARE", "1");
            ctx.add_env("DXVK_STATE_CACHE_PATH", cache("dxvk_state"));
            ctx.add_env("STAGING_SHARED_MEMORY", "1");
            ctx.add_env("__GL_SHADER_DISK_CACHE", "1");
            ctx.add_env("__GL_SHADER_DISK_CACHE_PATH", cache("gl_shader"));
            ctx.add_env("MESA_SHADER_CACHE_DIR", cache("mesa_shader"));
        }
        if params.vkd3d {
            ctx.add_env("VKD3D_SHADER_CACHE_PATH", cache("vkd3d_shader"));
        }

        // LatencyFleX
        if params.latencyflex && !config.latencyflex.is_empty() {
            let lfx = self
                .host
                .paths
                .component_path(ComponentKind::LatencyFlex, &config.latencyflex);
            let layer = lfx.join("layer/usr/share/vulkan/implicit_layer.d");
            ctx.concat_env("VK_ADD_LAYER_PATH", layer.to_string_lossy(), ":");
            ctx.add_env("LFX", "1");
            let libs = lfx.join("layer/usr/lib/x86_64-linux-gnu");
            ctx.concat_env("LD_LIBRARY_PATH", libs.to_string_lossy(), ":");
        } else {
            if params.latencyflex {
                tracing::warn!("graphics - LatencyFleX enabled but no version is set");
            }
            ctx.add_env("DISABLE_LFX", "1");
        }

        // Overlays
        if params.mangohud && !minimal {
            ctx.add_env("MANGOHUD", "1");
            ctx.add_env("MANGOHUD_DLSYM", "1");
            if !params.mangohud_display_on_game_start {
                ctx.add_env("MANGOHUD_CONFIG", "no_display");
            }
        }
        if params.vkbasalt && !minimal {
            let conf = bottle_path.join("vkBasalt.conf");
            if conf.is_file() {
                ctx.add_env("VKBASALT_CONFIG_FILE", conf.to_string_lossy());
            }
            ctx.add_env("ENABLE_VKBASALT", "1");
        }
        if params.obsvkc && !minimal {
            ctx.add_env("OBS_VKCAPTURE", "1");
            if self.host.display == DisplayServer::X11 {
                ctx.add_env("OBS_USE_EGL", "1");
            }
        }

        // DXVK-NVAPI
        if params.dxvk_nvapi {
            ctx.add_env("DXVK_NVAPIHACK", "0");
            ctx.add_env("DXVK_ENABLE_NVAPI", "1");
        }

        // FSR
        if params.fsr {
            ctx.add_env("WINE_FULLSCREEN_FSR", "1");
            ctx.add_env("WINE_FULLSCREEN_FSR_STRENGTH", params.fsr_sharpening_strength.to_string());
            if !params.fsr_quality_mode.is_empty() {
                ctx.add_env("WINE_FULLSCREEN_FSR_MODE", params.fsr_quality_mode.as_str());
            }
        }
        Ok(())
    }
}

/// Discrete GPU offload and Vulkan ICD selection
pub struct GpuStrategist<'h> {
    host: &'h LaunchHost,
}

impl<'h> GpuStrategist<'h> {
    pub fn new(host: &'h LaunchHost) -> Self {
        Self { host }
    }
}

fn add_icd(ctx: &mut ExecutionContext, profile: &GpuProfile) {
    if !profile.icd.is_empty() {
        ctx.concat_env("VK_ICD_FILENAMES", &profile.icd, ":");
    }
}

impl Strategist for GpuStrategist<'_> {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn apply(&self, ctx: &mut ExecutionContext, config: &BottleConfig) -> Result<(), StrategistError> {
        if ctx.flags.return_steam_env {
            return Ok(());
        }
        let gpu = &self.host.gpu;

        if config.parameters.discrete_gpu {
            match &gpu.discrete {
                Some(discrete) => {
                    for (key, value) in &discrete.env {
                        ctx.add_env(key, value.as_str());
                    }
                    add_icd(ctx, discrete);
                }
                None => tracing::warn!("gpu - discrete GPU requested but none was detected"),
            }
        }

        if !ctx.has_env("VK_ICD_FILENAMES") {
            if let Some(integrated) = &gpu.integrated {
                add_icd(ctx, integrated);
            } else if let Some(first) = gpu.vendors.first() {
                add_icd(ctx, first);
            }
        }
        Ok(())
    }
}
