use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::steam;

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Names of every entry directly inside `dir`, sorted
pub fn list_entries(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        if let Some(name) = file_name(entry.path()) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Sub-directories directly inside `dir` (symlinks to dirs included), sorted
pub fn list_subdirs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut subdirs = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.path().is_dir() {
            subdirs.push(entry.into_path());
        }
    }
    subdirs.sort();
    Ok(subdirs)
}

/// Proton builds found in Steam compatibility-tool roots
///
/// Each root is scanned on its own thread. Roots that cannot be read are
/// skipped; names are unique and keep root order.
pub fn scan_compat_tools(roots: &[PathBuf]) -> Vec<String> {
    let per_root: Vec<Vec<String>> = std::thread::scope(|s| {
        let handles: Vec<_> = roots
            .iter()
            .map(|root| s.spawn(move || protons_in(root)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_default())
            .collect()
    });

    let mut found = Vec::new();
    for name in per_root.into_iter().flatten() {
        if !found.contains(&name) {
            found.push(name);
        }
    }
    found
}

fn protons_in(root: &Path) -> Vec<String> {
    let subdirs = match list_subdirs(root) {
        Ok(subdirs) => subdirs,
        Err(e) => {
            tracing::debug!("discovery - cannot read {}: {}", root.display(), e);
            return Vec::new();
        }
    };
    subdirs
        .iter()
        .filter(|dir| steam::is_proton(dir))
        .filter_map(|dir| file_name(dir))
        .collect()
}
