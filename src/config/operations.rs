mod io;

pub use io::{load_bottle_config, load_settings, save_bottle_config, save_settings};
