use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::steam;

/// Locations of the menu-entry helper inside a wine tree
pub const WINEMENUBUILDER_PATHS: [&str; 4] = [
    "lib64/wine/x86_64-windows/winemenubuilder.exe",
    "lib/wine/x86_64-windows/winemenubuilder.exe",
    "lib32/wine/i386-windows/winemenubuilder.exe",
    "lib/wine/i386-windows/winemenubuilder.exe",
];

/// Rename winemenubuilder.exe to `.lock` inside one runner
///
/// Proton builds are left alone. Returns how many helpers were locked.
pub fn lock_winemenubuilder(runner: &Path) -> io::Result<usize> {
    if steam::is_proton(runner) {
        return Ok(0);
    }

    let mut locked = 0;
    for relative in WINEMENUBUILDER_PATHS {
        let helper = runner.join(relative);
        if !helper.is_file() {
            continue;
        }
        let mut target = helper.clone().into_os_string();
        target.push(".lock");
        fs::rename(&helper, PathBuf::from(target))?;
        locked += 1;
    }
    Ok(locked)
}

/// Lock every runner in parallel, one thread per runner
pub fn lock_winemenubuilders(runners: &[PathBuf]) -> usize {
    std::thread::scope(|s| {
        let handles: Vec<_> = runners
            .iter()
            .map(|runner| {
                s.spawn(move || match lock_winemenubuilder(runner) {
                    Ok(count) => count,
                    Err(e) => {
                        tracing::warn!(
                            "runners - cannot lock winemenubuilder in {}: {}",
                            runner.display(),
                            e
                        );
                        0
                    }
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap_or(0)).sum()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner_with_helpers(root: &Path, name: &str) -> PathBuf {
        let runner = root.join(name);
        for relative in &WINEMENUBUILDER_PATHS[..3] {
            let helper = runner.join(relative);
            fs::create_dir_all(helper.parent().unwrap()).unwrap();
            fs::write(helper, b"MZ").unwrap();
        }
        runner
    }

    #[test]
    fn helpers_are_renamed() {
        let dir = tempfile::tempdir().unwrap();
        let soda = runner_with_helpers(dir.path(), "soda-9.0-1");
        let caffe = runner_with_helpers(dir.path(), "caffe-8.0");

        assert_eq!(lock_winemenubuilders(&[soda.clone(), caffe]), 6);
        assert!(!soda.join(WINEMENUBUILDER_PATHS[0]).exists());
        assert!(
            soda.join("lib64/wine/x86_64-windows/winemenubuilder.exe.lock")
                .is_file()
        );

        // Second pass finds nothing left to lock
        assert_eq!(lock_winemenubuilder(&soda).unwrap(), 0);
    }

    #[test]
    fn proton_builds_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let proton = runner_with_helpers(dir.path(), "GE-Proton9-20");
        fs::write(
            proton.join("toolmanifest.vdf"),
            "\"manifest\"\n{\n  \"compatmanager_layer_name\" \"proton\"\n}\n",
        )
        .unwrap();

        assert_eq!(lock_winemenubuilder(&proton).unwrap(), 0);
        assert!(proton.join(WINEMENUBUILDER_PATHS[0]).is_file());
    }
}
