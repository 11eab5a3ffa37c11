// Pure command building functions (no I/O)

use crate::launch::types::PreparedLaunch;

/// Quoted command line for a program and its arguments
pub fn program_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(|part| shell_words::quote(part).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn starts_new_line(arg: &str) -> bool {
    matches!(arg, "bwrap" | "--bind" | "--ro-bind" | "--dev-bind" | "--setenv" | "--")
}

/// Format a prepared launch for debug logging (pure string building).
///
/// Returns the formatted string. Caller is responsible for printing.
pub fn format_launch(launch: &PreparedLaunch, name: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("[bottlerun] BOTTLE {}:\n", name));

    for (key, value) in &launch.env {
        output.push_str(&format!("[bottlerun] {}={}\n", key, value));
    }
    for key in &launch.unset {
        output.push_str(&format!("[bottlerun] unset {}\n", key));
    }
    if !launch.failed.is_empty() {
        output.push_str(&format!("[bottlerun] FAILED: {}\n", launch.failed.join(", ")));
    }

    output.push_str("[bottlerun] ");
    match shell_words::split(&launch.command) {
        Ok(args) => {
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    if starts_new_line(arg) {
                        output.push_str("\n[bottlerun] ");
                    } else {
                        output.push(' ');
                    }
                }
                output.push_str(&format!("\"{}\"", arg));
            }
        }
        Err(_) => output.push_str(&launch.command),
    }

    output.push_str("\n[bottlerun] ---------------------");
    output
}
