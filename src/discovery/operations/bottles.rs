use std::collections::BTreeMap;
use std::path::Path;

use walkdir::WalkDir;

use crate::config::{BottleConfig, load_bottle_config};

/// Every `<bottles>/<name>/bottle.yml`, keyed by bottle name
///
/// Broken configs are logged and skipped.
pub fn scan_bottles(bottles_dir: &Path) -> BTreeMap<String, BottleConfig> {
    let mut bottles = BTreeMap::new();

    let walk = WalkDir::new(bottles_dir)
        .min_depth(2)
        .max_depth(2)
        .follow_links(true);
    for entry in walk.into_iter().filter_map(|e| e.ok()) {
        if entry.file_name() != "bottle.yml" {
            continue;
        }
        match load_bottle_config(entry.path()) {
            Ok(config) => {
                let name = if config.name.is_empty() {
                    entry
                        .path()
                        .parent()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default()
                } else {
                    config.name.clone()
                };
                bottles.insert(name, config);
            }
            Err(e) => {
                tracing::warn!(
                    "bottles - cannot load {}: {}",
                    entry.path().display(),
                    e
                );
            }
        }
    }
    bottles
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn broken_bottles_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let games = dir.path().join("Games");
        fs::create_dir_all(&games).unwrap();
        fs::write(games.join("bottle.yml"), "Name: Games\nRunner: soda-9.0-1\n").unwrap();

        let broken = dir.path().join("Broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join("bottle.yml"), "Name: [unterminated\n").unwrap();

        let unnamed = dir.path().join("Unnamed");
        fs::create_dir_all(&unnamed).unwrap();
        fs::write(unnamed.join("bottle.yml"), "Runner: caffe-8.0\n").unwrap();

        let bottles = scan_bottles(dir.path());
        assert_eq!(bottles.len(), 2);
        assert_eq!(bottles["Games"].runner, "soda-9.0-1");
        assert_eq!(bottles["Unnamed"].runner, "caffe-8.0");
    }
}
