//! Gamescope nested compositor setup
//!
//! Gamescope cannot take a compound command line after its `--` separator,
//! so the wrapped command is written to a small executable script and
//! gamescope is pointed at that instead.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::config::BottleParameters;

/// Gamescope arguments for a bottle's parameters
pub fn gamescope_args(params: &BottleParameters) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();

    if params.gamescope_fullscreen {
        args.push("-f".into());
    }
    if params.gamescope_borderless {
        args.push("-b".into());
    }
    if params.gamescope_scaling {
        args.extend(["-S".into(), "integer".into()]);
    }
    if params.fsr {
        args.extend(["-F".into(), "fsr".into()]);
        args.push("--fsr-sharpness".into());
        args.push(params.fsr_sharpening_strength.to_string());
    }

    // Resolution; zero means let gamescope decide
    let sizes = [
        ("-w", params.gamescope_game_width),
        ("-h", params.gamescope_game_height),
        ("-W", params.gamescope_window_width),
        ("-H", params.gamescope_window_height),
        ("-r", params.gamescope_fps),
        ("-o", params.gamescope_fps_no_focus),
    ];
    for (flag, value) in sizes {
        if value > 0 {
            args.push(flag.into());
            args.push(value.to_string());
        }
    }
    args
}

/// Write `command` into an executable script under `dir`
///
/// With `mangoapp` set the overlay is started next to the game.
pub fn write_run_script(dir: &Path, command: &str, mangoapp: bool) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let script = dir.join(format!("gamescope-run-{:08x}.sh", fastrand::u32(..)));

    let mut contents = format!("#!/usr/bin/env sh\n{} $@", command);
    if mangoapp {
        contents.push_str(" &\nmangoapp");
    }
    fs::write(&script, contents)?;

    let mut perms = fs::metadata(&script)?.permissions();
    perms.set_mode(perms.mode() | 0o111);
    fs::set_permissions(&script, perms)?;

    tracing::debug!("gamescope - run script at {}", script.display());
    Ok(script)
}

/// `<gamescope> <args> -- <script>`
pub fn wrap_command(bin: &Path, args: &[String], script: &Path) -> String {
    let mut parts = vec![shell_words::quote(&bin.to_string_lossy()).into_owned()];
    parts.extend(args.iter().map(|a| shell_words::quote(a).into_owned()));
    parts.push("--".to_string());
    parts.push(shell_words::quote(&script.to_string_lossy()).into_owned());
    parts.join(" ")
}
