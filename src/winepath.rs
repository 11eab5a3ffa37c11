//! Host <-> guest path translation for one bottle
//!
//! Guest paths are drive-letter paths as the compatibility layer sees them
//! (`C:\users\steamuser`). `C:` is always the bottle's `drive_c`; every other
//! letter is whatever the matching `dosdevices/<letter>:` symlink points at,
//! and `Z:` falls back to the host root.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

static DRIVE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^([a-z]):/(.*)$").unwrap());

/// Translates paths for the bottle rooted at `bottle_root`
#[derive(Clone, Debug)]
pub struct PathTranslator {
    bottle_root: PathBuf,
}

impl PathTranslator {
    pub fn new(bottle_root: impl Into<PathBuf>) -> Self {
        Self {
            bottle_root: bottle_root.into(),
        }
    }

    pub fn bottle_root(&self) -> &Path {
        &self.bottle_root
    }

    fn drive_c(&self) -> PathBuf {
        self.bottle_root.join("drive_c")
    }

    fn dosdevices(&self) -> PathBuf {
        self.bottle_root.join("dosdevices")
    }

    /// Host path -> guest path
    pub fn to_guest_path(&self, host_path: &Path) -> String {
        if host_path.as_os_str().is_empty() {
            return String::new();
        }
        let host_path = normalize(host_path);

        // 1. Inside the bottle's drive C
        if let Ok(relative) = host_path.strip_prefix(self.drive_c()) {
            return format!("C:\\{}", to_backslashes(relative));
        }

        // 2. Other drives mapped in dosdevices
        if let Some(guest) = self.match_dosdevice(&host_path) {
            return guest;
        }

        // 3. Everything else is reachable through Z:
        let unix = host_path.to_string_lossy();
        format!("Z:\\{}", unix.trim_start_matches('/').replace('/', "\\"))
    }

    fn match_dosdevice(&self, host_path: &Path) -> Option<String> {
        let entries = match fs::read_dir(self.dosdevices()) {
            Ok(entries) => entries,
            Err(_) => return None,
        };

        let mut names: Vec<String> = entries
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();

        for name in names {
            // Drive links are exactly "<letter>:"; "e::" style entries are raw devices
            if name == "c:" || name.len() != 2 || !name.ends_with(':') {
                continue;
            }

            let link = self.dosdevices().join(&name);
            let is_link = fs::symlink_metadata(&link)
                .map(|m| m.file_type().is_symlink())
                .unwrap_or(false);
            if !is_link {
                continue;
            }

            let target = match fs::canonicalize(&link) {
                Ok(target) => target,
                Err(e) => {
                    tracing::warn!("winepath - cannot resolve {}: {}", link.display(), e);
                    continue;
                }
            };

            if let Ok(relative) = host_path.strip_prefix(&target) {
                let letter = name.trim_end_matches(':').to_uppercase();
                return Some(format!("{}:\\{}", letter, to_backslashes(relative)));
            }
        }
        None
    }

    /// Guest path -> host path.
    ///
    /// Paths without a recognizable drive prefix are ambiguous and come back
    /// unchanged (with forward slashes).
    pub fn to_host_path(&self, guest_path: &str) -> String {
        if guest_path.is_empty() {
            return String::new();
        }
        let guest_path = guest_path.replace('\\', "/");

        let Some(caps) = DRIVE_PREFIX.captures(&guest_path) else {
            return guest_path;
        };
        let drive = caps[1].to_lowercase();
        let relative = &caps[2];

        // 1. Drive C
        if drive == "c" {
            return self.drive_c().join(relative).to_string_lossy().into_owned();
        }

        // 2. Other drives via dosdevices
        let link = self.dosdevices().join(format!("{}:", drive));
        let is_link = fs::symlink_metadata(&link)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        if is_link {
            match fs::canonicalize(&link) {
                Ok(target) => return target.join(relative).to_string_lossy().into_owned(),
                Err(e) => tracing::warn!("winepath - cannot resolve {}: {}", link.display(), e),
            }
        }

        // 3. Z: is the host root
        if drive == "z" {
            return format!("/{}", relative);
        }

        guest_path
    }
}

fn to_backslashes(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("\\")
}

/// Lexically absolutize a path, folding `.` and `..` without touching the disk
fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Looks like a guest path (drive letter or backslash)
pub fn is_windows_path(path: &str) -> bool {
    path.contains(':') || path.contains('\\')
}

pub fn is_unix_path(path: &str) -> bool {
    !is_windows_path(path)
}

/// Flatten control whitespace out of a path read back from a tool
pub fn clean_path(path: &str) -> String {
    path.replace(['\n', '\r', '\t'], " ").trim().to_string()
}
