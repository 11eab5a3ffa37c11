//! Bundled runtimes
//!
//! The bottles runtime is a directory of host libraries prepended to the
//! library path. Anti-cheat runtimes and Steam Linux Runtime tiers come
//! from the data dir or from Steam's `steamapps/common`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::paths::ComponentPaths;
use crate::steam;

/// Steam Linux Runtime tiers, in preference order after the runner's own
pub const STEAM_RUNTIME_TIERS: [&str; 3] = ["sniper", "soldier", "scout"];

const RUNTIME_LIB_DIRS: [&str; 2] = ["lib", "lib64"];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeSet {
    /// Library dirs of the bottles runtime, empty when it is not installed
    pub bottles_libs: Vec<PathBuf>,
    pub eac: Option<PathBuf>,
    pub battleye: Option<PathBuf>,
    /// Steam runtime tier name -> entry point
    pub steam: BTreeMap<String, PathBuf>,
}

impl RuntimeSet {
    pub fn detect(paths: &ComponentPaths) -> Self {
        let runtimes = Self {
            bottles_libs: bottles_runtime_libs(&paths.runtimes),
            eac: anti_cheat_runtime(&paths.runtimes, "eac", "Proton EasyAntiCheat Runtime"),
            battleye: anti_cheat_runtime(&paths.runtimes, "be", "Proton BattlEye Runtime"),
            steam: steam_runtimes(),
        };
        tracing::debug!("runtime - detected {:?}", runtimes);
        runtimes
    }

    /// Pick a Steam runtime tier
    ///
    /// Sniper and soldier are only used when the runner declares them;
    /// scout is the fallback.
    pub fn pick_steam_runtime(&self, runner_runtimes: &[String]) -> Option<(&str, &Path)> {
        for tier in &STEAM_RUNTIME_TIERS[..2] {
            if runner_runtimes.iter().any(|r| r == tier)
                && let Some(entry) = self.steam.get(*tier)
            {
                return Some((*tier, entry.as_path()));
            }
        }
        self.steam
            .get(STEAM_RUNTIME_TIERS[2])
            .map(|entry| (STEAM_RUNTIME_TIERS[2], entry.as_path()))
    }
}

/// Lib dirs of the first runtime that carries both `lib` and `lib64`
pub fn bottles_runtime_libs(runtimes_dir: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from("/app/etc/runtime")];
    if let Ok(entries) = std::fs::read_dir(runtimes_dir) {
        let mut dirs: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        dirs.sort();
        candidates.extend(dirs);
    }

    for candidate in candidates {
        let libs: Vec<PathBuf> = RUNTIME_LIB_DIRS.iter().map(|d| candidate.join(d)).collect();
        if libs.iter().all(|l| l.is_dir()) {
            return libs;
        }
    }
    Vec::new()
}

fn anti_cheat_runtime(runtimes_dir: &Path, short_name: &str, steam_name: &str) -> Option<PathBuf> {
    let local = runtimes_dir.join(short_name);
    if local.is_dir() {
        return Some(local);
    }
    steam::find_in_steam_common(steam_name)
}

fn steam_runtimes() -> BTreeMap<String, PathBuf> {
    let lookup = [
        ("sniper", "SteamLinuxRuntime_sniper", "_v2-entry-point"),
        ("soldier", "SteamLinuxRuntime_soldier", "_v2-entry-point"),
        ("scout", "SteamLinuxRuntime", "scout-on-soldier-entry-point-v2"),
    ];

    let mut found = BTreeMap::new();
    for (tier, dir, entry) in lookup {
        if let Some(root) = steam::find_in_steam_common(dir) {
            let entry_point = root.join(entry);
            if entry_point.exists() {
                found.insert(tier.to_string(), entry_point);
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn steam_set(tiers: &[&str]) -> RuntimeSet {
        RuntimeSet {
            steam: tiers
                .iter()
                .map(|t| (t.to_string(), PathBuf::from(format!("/steam/{}/entry", t))))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn declared_tier_is_preferred() {
        let set = steam_set(&["sniper", "soldier", "scout"]);
        let picked = set.pick_steam_runtime(&["soldier".to_string()]).unwrap();
        assert_eq!(picked.0, "soldier");
        assert_eq!(picked.1, Path::new("/steam/soldier/entry"));
    }

    #[test]
    fn scout_is_the_fallback() {
        let set = steam_set(&["sniper", "scout"]);
        assert_eq!(set.pick_steam_runtime(&[]).unwrap().0, "scout");
        // Declared but not installed
        assert_eq!(set.pick_steam_runtime(&["soldier".to_string()]).unwrap().0, "scout");
    }

    #[test]
    fn nothing_installed_picks_nothing() {
        let set = steam_set(&["sniper"]);
        assert!(set.pick_steam_runtime(&[]).is_none());
    }

    #[test]
    fn runtime_libs_need_both_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("partial/lib")).unwrap();
        assert!(bottles_runtime_libs(dir.path()).is_empty());

        fs::create_dir_all(dir.path().join("runtime/lib")).unwrap();
        fs::create_dir_all(dir.path().join("runtime/lib64")).unwrap();
        let libs = bottles_runtime_libs(dir.path());
        assert_eq!(
            libs,
            vec![dir.path().join("runtime/lib"), dir.path().join("runtime/lib64")]
        );
    }
}
