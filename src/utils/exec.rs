//! External command execution utilities.
//!
//! Commands run to completion with captured output; callers decide what a
//! non-zero exit means.

use regex::Regex;
use std::{
    borrow::Cow,
    io,
    path::Path,
    process::{Command, Output},
    sync::OnceLock,
};

/// SGR escape sequences (`ESC[...m`)
const ANSI_ESCAPE: &str = r"\x1b\[[0-9;]*m";

/// Run `program` with `args` in `cwd` and capture stdout/stderr.
pub fn capture(cwd: &Path, program: &str, args: &[&str]) -> io::Result<Output> {
    Command::new(program).args(args).current_dir(cwd).output()
}

/// Captured stdout, lossily decoded and trimmed.
pub fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

/// Captured stderr without color codes, trimmed.
pub fn stderr_text(output: &Output) -> String {
    strip_ansi(&String::from_utf8_lossy(&output.stderr))
        .trim()
        .to_owned()
}

/// Format a failed command for display.
pub fn format_error(name: &str, output: &Output) -> String {
    let stderr = stderr_text(output);
    let stdout = stdout_text(output);

    let mut msg = format!("Command `{name}` failed with {}", output.status);
    if !stderr.is_empty() {
        msg.push('\n');
        msg.push_str(&stderr);
    }
    if !stdout.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(&stdout);
    }
    msg
}

pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    match RE.get_or_init(|| Regex::new(ANSI_ESCAPE).ok()) {
        Some(re) => re.replace_all(s, ""),
        None => Cow::Borrowed(s),
    }
}
