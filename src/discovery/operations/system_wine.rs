use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::discovery::pure::SYSTEM_RUNNER_PREFIX;

const WINE_BINARIES: [&str; 2] = ["wine", "wine64"];

const WINE_PREFIXES: [&str; 5] = [
    "/usr/bin",
    "/usr/local/bin",
    "/opt/wine-staging/bin",
    "/opt/wine-devel/bin",
    "/opt/wine-stable/bin",
];

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// System wine binary: PATH first, then the usual WineHQ prefixes
pub fn find_system_wine() -> Option<PathBuf> {
    for bin in WINE_BINARIES {
        if let Ok(path) = which::which(bin) {
            return Some(path);
        }
    }

    for prefix in WINE_PREFIXES {
        for bin in WINE_BINARIES {
            let candidate = Path::new(prefix).join(bin);
            if is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

/// `sys-<version>` from the first word of `<wine> --version`
pub fn system_wine_identifier(wine: &Path) -> Option<String> {
    let output = match Command::new(wine).arg("--version").output() {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!("runners - cannot run {}: {}", wine.display(), e);
            return None;
        }
    };
    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout.lines().next()?.split_whitespace().next()?;
    Some(format!("{}{}", SYSTEM_RUNNER_PREFIX, version))
}
