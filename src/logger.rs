//! Terminal logging with colored module prefixes.
//!
//! There is no global logger: `main` builds one [`Logger`] and hands it to
//! every component that reports progress.
//!
//! # Example
//!
//! ```ignore
//! let logger = Logger::new(false);
//! log!(logger, "build"; "parsed {} pages", count);
//! logger.detail("↠ content/about.md");
//! ```

use colored::{ColoredString, Colorize};
use crossterm::{
    execute,
    terminal::{Clear, ClearType, size},
};
use std::io::{Write, stdout};

// ============================================================================
// Layout Constants
// ============================================================================
//
// Line format: "[module] message"
//               ^------^ ^-----^
//               prefix   message

/// Length of brackets around module name: "[]"
const BRACKET_LEN: usize = 2;
/// Space after prefix: "[module] " <- this space
const SPACE_AFTER_PREFIX: usize = 1;
/// Indentation of detail lines
const DETAIL_INDENT: &str = "  ";
/// Width used when the terminal size cannot be detected
const FALLBACK_WIDTH: u16 = 120;

/// Calculate total prefix length for a module name.
///
/// Returns: `module.len() + 3` (for `[`, `]`, and trailing space)
#[inline]
const fn calc_prefix_len(module_len: usize) -> usize {
    module_len + BRACKET_LEN + SPACE_AFTER_PREFIX
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix through a [`Logger`].
///
/// # Usage
/// ```ignore
/// log!(logger, "module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $module:expr; $($arg:tt)*) => {{
        $logger.log($module, &format!($($arg)*))
    }};
}

// ============================================================================
// Logger
// ============================================================================

/// Logging context passed down from the CLI boundary.
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    quiet: bool,
    width: u16,
}

impl Logger {
    /// Create a logger, measuring the terminal width once.
    pub fn new(quiet: bool) -> Self {
        let width = size().map(|(w, _)| w).unwrap_or(FALLBACK_WIDTH);
        Self { quiet, width }
    }

    /// A logger that prints nothing.
    #[cfg(test)]
    pub const fn silent() -> Self {
        Self {
            quiet: true,
            width: FALLBACK_WIDTH,
        }
    }

    /// Log a message with a colored module prefix.
    ///
    /// Long messages are truncated to fit the terminal width.
    pub fn log(&self, module: &str, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = colorize_prefix(module, &module.to_ascii_lowercase());
        let max_msg_len = (self.width as usize).saturating_sub(calc_prefix_len(module.len()));
        let message = truncate_str(message, max_msg_len);

        let mut stdout = stdout().lock();
        execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
        writeln!(stdout, "{prefix} {message}").ok();
        stdout.flush().ok();
    }

    /// Print dimmed, indented lines below the last log entry.
    ///
    /// Blank input prints nothing.
    pub fn detail(&self, message: &str) {
        if self.quiet || message.trim().is_empty() {
            return;
        }

        let mut stdout = stdout().lock();
        for line in message.lines() {
            writeln!(stdout, "{}", format!("{DETAIL_INDENT}{line}").dimmed()).ok();
        }
        stdout.flush().ok();
    }

    /// Print an error with its source chain. Never suppressed by `quiet`.
    pub fn error(&self, error: &anyhow::Error) {
        let prefix = colorize_prefix("error", "error");
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{prefix} {error}").ok();
        for cause in error.chain().skip(1) {
            writeln!(stderr, "{}", format!("{DETAIL_INDENT}caused by: {cause}").dimmed()).ok();
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Apply color to a module prefix based on module type.
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module_lower {
        "serve" => prefix.bright_blue().bold(),
        "deploy" | "git" => prefix.bright_green().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate a string to fit within `max_len` bytes.
///
/// Ensures the result is valid UTF-8 by finding the nearest character boundary.
#[inline]
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_prefix_len_typical_module() {
        // "build" -> "[build] " = 5 + 2 + 1 = 8
        assert_eq!(calc_prefix_len(5), 8);
    }

    #[test]
    fn test_calc_prefix_len_empty() {
        assert_eq!(calc_prefix_len(0), 3);
    }

    #[test]
    fn test_truncate_str_short_string() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_str_needs_truncation() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_str_unicode_boundary() {
        // "你好" is 6 bytes; byte 4 is inside the second char
        assert_eq!(truncate_str("你好", 4), "你");
    }

    #[test]
    fn test_truncate_str_zero_limit() {
        assert_eq!(truncate_str("hello", 0), "");
    }

    #[test]
    fn test_silent_logger_is_quiet() {
        let logger = Logger::silent();
        assert!(logger.quiet);
        // Must not panic or print
        log!(logger, "build"; "{} pages", 3);
        logger.detail("ignored");
    }
}
