//! Steam integration helpers
//!
//! Locates Steam libraries and compatibility-tool roots and classifies
//! runner directories as Proton-style builds by inspecting their
//! `toolmanifest.vdf`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::paths::{PATH_HOME, PATH_STEAM};

static VDF_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"\s+"([^"]*)""#).unwrap());

const SNIPER_APPID: &str = "1628350";
const SOLDIER_APPID: &str = "1391110";

/// Flat key/value pairs of a VDF document (nesting is ignored)
fn vdf_pairs(contents: &str) -> Vec<(String, String)> {
    VDF_PAIR
        .captures_iter(contents)
        .map(|c| (c[1].to_lowercase(), c[2].to_string()))
        .collect()
}

fn read_toolmanifest(runner: &Path) -> Option<Vec<(String, String)>> {
    let contents = fs::read(runner.join("toolmanifest.vdf")).ok()?;
    Some(vdf_pairs(&String::from_utf8_lossy(&contents)))
}

/// True if the directory is a Proton-style build
pub fn is_proton(runner: &Path) -> bool {
    let Some(pairs) = read_toolmanifest(runner) else {
        return false;
    };
    pairs.iter().any(|(key, value)| {
        (key == "compatmanager_layer_name" || key == "commandline") && value.contains("proton")
    })
}

/// Directory holding the wine tree inside a Proton build
pub fn dist_directory(proton_root: &Path) -> PathBuf {
    for sub in ["dist", "files"] {
        let candidate = proton_root.join(sub);
        if candidate.is_dir() {
            return candidate;
        }
    }
    tracing::warn!(
        "steam - no dist or files directory in {}, using it as is",
        proton_root.display()
    );
    proton_root.to_path_buf()
}

/// Steam runtime tiers a runner declares it needs (`sniper`, `soldier`)
pub fn required_runtimes(runner: &Path) -> Vec<String> {
    let Some(pairs) = read_toolmanifest(runner) else {
        return Vec::new();
    };
    let mut runtimes = Vec::new();
    for (key, value) in pairs {
        if key != "require_tool_appid" {
            continue;
        }
        match value.as_str() {
            SNIPER_APPID => runtimes.push("sniper".to_string()),
            SOLDIER_APPID => runtimes.push("soldier".to_string()),
            _ => {}
        }
    }
    runtimes
}

/// Every Steam library folder, main install first
pub fn library_folders() -> Vec<PathBuf> {
    let mut folders = vec![PATH_STEAM.clone()];

    if let Ok(steam_dir) = steamlocate::SteamDir::locate() {
        push_unique(&mut folders, steam_dir.path().to_path_buf());
        if let Ok(libraries) = steam_dir.libraries() {
            for library in libraries.flatten() {
                push_unique(&mut folders, library.path().to_path_buf());
            }
        }
    }

    folders.retain(|f| f.exists());
    folders
}

/// Directories that may hold Proton builds
pub fn compatibility_tools_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for library in library_folders() {
        push_unique(&mut paths, library.join("compatibilitytools.d"));
        push_unique(&mut paths, library.join("steamapps/common"));
    }
    push_unique(&mut paths, PATH_HOME.join(".steam/root/compatibilitytools.d"));
    push_unique(&mut paths, PathBuf::from("/usr/share/steam/compatibilitytools.d"));
    push_unique(&mut paths, PathBuf::from("/usr/local/share/steam/compatibilitytools.d"));

    paths.retain(|p| p.is_dir());
    dedup_canonical(paths)
}

/// Search every library's steamapps/common for a directory by name
pub fn find_in_steam_common(name: &str) -> Option<PathBuf> {
    library_folders()
        .into_iter()
        .map(|folder| folder.join("steamapps/common").join(name))
        .find(|candidate| candidate.is_dir())
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

fn dedup_canonical(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = Vec::new();
    let mut out = Vec::new();
    for path in paths {
        let key = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if !seen.contains(&key) {
            seen.push(key);
            out.push(path);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const GE_MANIFEST: &str = r#""manifest"
{
  "version" "2"
  "commandline" "/proton %verb%"
  "require_tool_appid" "1628350"
  "use_sessions" "1"
  "compatmanager_layer_name" "proton"
}"#;

    #[test]
    fn proton_build_is_detected_from_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("toolmanifest.vdf"), GE_MANIFEST).unwrap();
        assert!(is_proton(dir.path()));
        assert_eq!(required_runtimes(dir.path()), vec!["sniper"]);
    }

    #[test]
    fn plain_wine_build_is_not_proton() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("bin")).unwrap();
        assert!(!is_proton(dir.path()));
        assert!(required_runtimes(dir.path()).is_empty());
    }

    #[test]
    fn dist_directory_prefers_dist_then_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(dist_directory(dir.path()), dir.path());

        fs::create_dir_all(dir.path().join("files")).unwrap();
        assert_eq!(dist_directory(dir.path()), dir.path().join("files"));

        fs::create_dir_all(dir.path().join("dist")).unwrap();
        assert_eq!(dist_directory(dir.path()), dir.path().join("dist"));
    }
}
