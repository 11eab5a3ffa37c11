//! Final command assembly

use std::io;
use std::path::{Path, PathBuf};

use crate::execution::types::ExecutionContext;
use crate::gamescope;

fn quote_path(path: &Path) -> String {
    shell_words::quote(&path.to_string_lossy()).into_owned()
}

/// An assembled command and the ephemeral script it runs, if any
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssembledCommand {
    pub command: String,
    /// Gamescope run script; the caller removes it once the process exits
    pub script: Option<PathBuf>,
}

/// Turns a resolved context into one command line
pub struct CommandAssembler {
    /// Where gamescope run scripts are written
    script_dir: PathBuf,
}

impl CommandAssembler {
    pub fn new(script_dir: impl Into<PathBuf>) -> Self {
        Self {
            script_dir: script_dir.into(),
        }
    }

    /// Wrap `base_command` with the runner, wrappers, compositor and runtime
    ///
    /// Layers from innermost to outermost: runner (or umu-run in its place),
    /// tool wrappers, gamescope, Steam runtime entry point.
    pub fn generate(&self, base_command: &str, ctx: &ExecutionContext) -> io::Result<String> {
        self.assemble(base_command, ctx).map(|assembled| assembled.command)
    }

    /// Same as [`generate`](Self::generate), also returning the script it wrote
    pub fn assemble(
        &self,
        base_command: &str,
        ctx: &ExecutionContext,
    ) -> io::Result<AssembledCommand> {
        let meta = &ctx.metadata;
        let mut cmd = base_command.to_string();

        match &meta.umu_run {
            Some(umu_run) => cmd = format!("{} {}", quote_path(umu_run), cmd),
            None if !ctx.flags.return_clean_env => {
                if let Some(runner) = &meta.runner_bin {
                    cmd = format!("{} {}", quote_path(runner), cmd);
                }
            }
            None => {}
        }

        for wrapper in meta.tool_wrappers.iter().rev() {
            cmd = format!("{} {}", shell_words::quote(wrapper), cmd);
        }

        let mut script = None;
        if let Some(wrap) = &meta.gamescope {
            let path = gamescope::write_run_script(&self.script_dir, &cmd, wrap.mangoapp)?;
            cmd = gamescope::wrap_command(&wrap.bin, &wrap.args, &path);
            script = Some(path);
        }

        if let Some(entry) = &meta.steam_runtime_entry {
            cmd = format!("{} {}", quote_path(entry), cmd);
        }

        tracing::debug!("execution - command: {}", cmd);
        Ok(AssembledCommand {
            command: cmd,
            script,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::types::GamescopeWrap;
    use std::fs;

    #[test]
    fn layers_wrap_in_order() {
        let mut ctx = ExecutionContext::default();
        ctx.metadata.steam_runtime_entry = Some(PathBuf::from("entry"));
        ctx.metadata.tool_wrappers = vec!["gamemode".to_string()];
        ctx.metadata.runner_bin = Some(PathBuf::from("wine"));

        let assembler = CommandAssembler::new("/nonexistent");
        assert_eq!(
            assembler.generate("prog.exe", &ctx).unwrap(),
            "entry gamemode wine prog.exe"
        );
    }

    #[test]
    fn no_script_without_gamescope() {
        let mut ctx = ExecutionContext::default();
        ctx.metadata.runner_bin = Some(PathBuf::from("wine"));
        let assembled = CommandAssembler::new("/nonexistent").assemble("game.exe", &ctx).unwrap();
        assert_eq!(assembled.command, "wine game.exe");
        assert_eq!(assembled.script, None);
    }

    #[test]
    fn first_wrapper_is_outermost() {
        let mut ctx = ExecutionContext::default();
        ctx.metadata.tool_wrappers = vec!["gamemoderun".into(), "mangohud".into()];
        ctx.metadata.runner_bin = Some(PathBuf::from("/runners/soda 9/bin/wine"));

        let cmd = CommandAssembler::new("/nonexistent").generate("game.exe", &ctx).unwrap();
        assert_eq!(cmd, "gamemoderun mangohud '/runners/soda 9/bin/wine' game.exe");
    }

    #[test]
    fn umu_replaces_the_runner() {
        let mut ctx = ExecutionContext::default();
        ctx.metadata.runner_bin = Some(PathBuf::from("wine"));
        ctx.metadata.umu_run = Some(PathBuf::from("/usr/bin/umu-run"));
        let cmd = CommandAssembler::new("/nonexistent").generate("game.exe", &ctx).unwrap();
        assert_eq!(cmd, "/usr/bin/umu-run game.exe");
    }

    #[test]
    fn clean_env_leaves_the_runner_out() {
        let mut ctx = ExecutionContext::default();
        ctx.flags.return_clean_env = true;
        ctx.metadata.runner_bin = Some(PathBuf::from("wine"));
        let cmd = CommandAssembler::new("/nonexistent").generate("winecfg", &ctx).unwrap();
        assert_eq!(cmd, "winecfg");
    }

    #[test]
    fn gamescope_runs_a_script() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ExecutionContext::default();
        ctx.metadata.runner_bin = Some(PathBuf::from("wine"));
        ctx.metadata.tool_wrappers = vec!["gamemoderun".to_string()];
        ctx.metadata.gamescope = Some(GamescopeWrap {
            bin: PathBuf::from("/usr/bin/gamescope"),
            args: vec!["-f".to_string(), "-r".to_string(), "60".to_string()],
            mangoapp: false,
        });
        ctx.metadata.steam_runtime_entry = Some(PathBuf::from("/slr/entry"));

        let assembled = CommandAssembler::new(dir.path()).assemble("game.exe", &ctx).unwrap();
        let cmd = &assembled.command;
        let prefix = "/slr/entry /usr/bin/gamescope -f -r 60 -- ";
        assert!(cmd.starts_with(prefix), "{}", cmd);

        let script = PathBuf::from(&cmd[prefix.len()..]);
        assert_eq!(script.parent(), Some(dir.path()));
        assert_eq!(assembled.script.as_deref(), Some(script.as_path()));
        assert_eq!(
            fs::read_to_string(script).unwrap(),
            "#!/usr/bin/env sh\ngamemoderun wine game.exe $@"
        );
    }
}
