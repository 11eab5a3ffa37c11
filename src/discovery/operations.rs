//! Discovery operations - atomic filesystem and process side effects

mod app_dirs;
mod bottles;
mod install;
mod lock;
mod markers;
mod scan;
mod system_wine;

pub use app_dirs::{check_app_dirs, clear_temp};
pub use bottles::scan_bottles;
pub use install::CommandInstaller;
pub use lock::{WINEMENUBUILDER_PATHS, lock_winemenubuilder, lock_winemenubuilders};
pub use markers::{read_bridge_marker, read_runtime_manifest};
pub use scan::{list_entries, list_subdirs, scan_compat_tools};
pub use system_wine::{find_system_wine, system_wine_identifier};
