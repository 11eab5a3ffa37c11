// Process spawning for prepared launches

use std::io;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::launch::types::PreparedLaunch;

/// Start a prepared launch through `sh -c` in `cwd`, with piped output
///
/// Sandboxed launches already carry their env as `--setenv` arguments, so
/// only unsandboxed ones get it on the spawned shell.
pub fn spawn(launch: &PreparedLaunch, cwd: Option<&Path>) -> io::Result<Child> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(&launch.command);

    if !launch.sandboxed {
        cmd.envs(&launch.env);
        for key in &launch.unset {
            cmd.env_remove(key);
        }
    }
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    tracing::info!("launch - spawning {}", launch.command);
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).spawn()
}
