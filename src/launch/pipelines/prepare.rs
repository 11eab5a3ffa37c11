//! Launch preparation pipeline

use std::io;

use crate::config::BottleConfig;
use crate::execution::{CommandAssembler, ExecutionContext, ExecutionPipeline, LaunchFlags};
use crate::host::LaunchHost;
use crate::launch::types::PreparedLaunch;
use crate::sandbox::SandboxBuilder;

/// Resolve how `base_command` runs inside a bottle
///
/// 1. Run the strategist chain over a fresh context
/// 2. Assemble the command line (writes a script when gamescope is used)
/// 3. Wrap it in bwrap when the bottle is sandboxed
pub fn prepare(
    host: &LaunchHost,
    config: &BottleConfig,
    base_command: &str,
    flags: LaunchFlags,
) -> io::Result<PreparedLaunch> {
    tracing::info!("launch - preparing {} in {}", base_command, config.name);

    let mut ctx = ExecutionContext::new(flags);
    let failed = ExecutionPipeline::new(host).run(&mut ctx, config);

    let assembled = CommandAssembler::new(&host.paths.temp).assemble(base_command, &ctx)?;
    let scripts: Vec<_> = assembled.script.into_iter().collect();
    let bottle_path = ctx
        .metadata
        .bottle_path
        .clone()
        .unwrap_or_else(|| config.bottle_path(&host.paths));
    let (env, unset) = ctx.into_parts();

    if config.parameters.sandbox {
        let sandbox = SandboxBuilder::for_bottle(config, &bottle_path)
            .with_envs(env.clone())
            .with_unset_envs(unset.clone());
        return Ok(PreparedLaunch {
            command: sandbox.build_command(&assembled.command),
            env,
            unset,
            sandboxed: true,
            failed,
            scripts,
        });
    }

    Ok(PreparedLaunch {
        env,
        unset,
        command: assembled.command,
        sandboxed: false,
        failed,
        scripts,
    })
}
