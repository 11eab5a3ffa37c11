// Removal of the ephemeral files a launch ran through

use std::fs;
use std::io;

use crate::launch::types::PreparedLaunch;

/// Delete the launch's run scripts; call once its process has exited
///
/// Scripts already gone are skipped, other failures are logged.
pub fn cleanup(launch: &PreparedLaunch) {
    for script in &launch.scripts {
        match fs::remove_file(script) {
            Ok(()) => tracing::debug!("launch - removed {}", script.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("launch - failed to remove {}: {}", script.display(), e),
        }
    }
}
