use std::process::Command;

use crate::catalog::ComponentKind;
use crate::discovery::types::Installer;
use crate::paths::ComponentPaths;

/// Installer that delegates to an external program
///
/// The command line is run with `<kind> <identifier> <destination>`
/// appended and must leave the build unpacked at `<destination>`.
pub struct CommandInstaller {
    argv: Vec<String>,
    paths: ComponentPaths,
}

impl CommandInstaller {
    /// `command` is split like a shell would split it
    pub fn new(command: &str, paths: ComponentPaths) -> Result<Self, shell_words::ParseError> {
        Ok(Self {
            argv: shell_words::split(command)?,
            paths,
        })
    }
}

impl Installer for CommandInstaller {
    fn install(&self, kind: ComponentKind, identifier: &str) -> Result<(), String> {
        let Some((program, args)) = self.argv.split_first() else {
            return Err("empty installer command".to_string());
        };
        let destination = self.paths.component_path(kind, identifier);
        tracing::info!("installer - running {} for {} {}", program, kind, identifier);

        let output = Command::new(program)
            .args(args)
            .arg(kind.to_string())
            .arg(identifier)
            .arg(&destination)
            .output()
            .map_err(|e| format!("failed to execute {}: {}", program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("{} failed: {}", program, stderr.trim()));
        }
        if !destination.exists() {
            return Err(format!("{} was not created", destination.display()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installer(root: &std::path::Path, command: &str) -> CommandInstaller {
        CommandInstaller::new(command, ComponentPaths::under(root)).unwrap()
    }

    #[test]
    fn program_unpacks_into_the_component_dir() {
        let dir = tempfile::tempdir().unwrap();
        let installer = installer(dir.path(), r#"sh -c 'mkdir -p "$3"' install"#);

        installer.install(ComponentKind::Dxvk, "dxvk-2.3").unwrap();
        assert!(dir.path().join("dxvk/dxvk-2.3").is_dir());
    }

    #[test]
    fn failures_carry_stderr() {
        let dir = tempfile::tempdir().unwrap();

        let failing = installer(dir.path(), "sh -c 'echo \"no such build: $2\" >&2; exit 3' install");
        let err = failing.install(ComponentKind::Vkd3d, "vkd3d-9").unwrap_err();
        assert!(err.contains("no such build: vkd3d-9"), "{}", err);

        let silent = installer(dir.path(), "true");
        let err = silent.install(ComponentKind::Vkd3d, "vkd3d-9").unwrap_err();
        assert!(err.contains("was not created"), "{}", err);
    }

    #[test]
    fn missing_or_empty_program_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let absent = installer(dir.path(), "/nonexistent/bottlerun-installer");
        let err = absent.install(ComponentKind::Nvapi, "dxvk-nvapi-0.7").unwrap_err();
        assert!(err.starts_with("failed to execute"), "{}", err);

        let empty = installer(dir.path(), "");
        assert!(empty.install(ComponentKind::Nvapi, "dxvk-nvapi-0.7").is_err());
        assert!(CommandInstaller::new("'unterminated", ComponentPaths::under(dir.path())).is_err());
    }
}
