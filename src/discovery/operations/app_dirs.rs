use std::fs;
use std::io;

use crate::paths::ComponentPaths;

/// Create every directory discovery expects; the Steam dir only when asked
pub fn check_app_dirs(paths: &ComponentPaths, steam_support: bool) -> io::Result<()> {
    let mut dirs = paths.app_dirs();
    if steam_support {
        dirs.push((paths.steam.as_path(), "Steam"));
    }

    for (dir, name) in dirs {
        if !dir.exists() {
            tracing::info!("discovery - {} path doesn't exist, creating now", name);
            fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

/// Empty the temp dir and recreate it
pub fn clear_temp(paths: &ComponentPaths) -> io::Result<()> {
    match fs::remove_dir_all(&paths.temp) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::create_dir_all(&paths.temp)?;
    tracing::info!("discovery - temp directory cleaned");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ComponentPaths::under(dir.path());
        check_app_dirs(&paths, false).unwrap();

        for (path, _) in paths.app_dirs() {
            assert!(path.is_dir(), "{} missing", path.display());
        }
        assert!(!paths.steam.exists());

        check_app_dirs(&paths, true).unwrap();
        assert!(paths.steam.is_dir());
    }

    #[test]
    fn clear_temp_leaves_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ComponentPaths::under(dir.path());
        fs::create_dir_all(paths.temp.join("nested")).unwrap();
        fs::write(paths.temp.join("nested/file"), "x").unwrap();

        clear_temp(&paths).unwrap();
        assert!(paths.temp.is_dir());
        assert_eq!(fs::read_dir(&paths.temp).unwrap().count(), 0);
    }
}
