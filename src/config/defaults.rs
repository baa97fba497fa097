//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#false() -> bool {
    false
}

// ============================================================================
// Site Layout
// ============================================================================

/// Config file name at the site root
pub const CONFIG_FILE: &str = "config.toml";

/// Directory holding markdown sources
pub const CONTENT_DIR: &str = "content";

/// Directory receiving the generated site
pub const PUBLISH_DIR: &str = "public";

/// Directory holding installed themes
pub const THEMES_DIR: &str = "themes";

/// Extension of parsed content files
pub const CONTENT_EXTENSION: &str = "md";

// ============================================================================
// Top-level Defaults
// ============================================================================

pub fn base_url() -> String {
    "./".into()
}

pub fn title() -> String {
    String::new()
}

pub fn theme() -> Option<String> {
    None
}

pub fn subtext() -> Option<String> {
    None
}

// ============================================================================
// [deploy] Section Defaults
// ============================================================================

pub mod deploy {
    pub fn branch() -> String {
        "gh-pages".into()
    }

    pub fn remote() -> String {
        "origin".into()
    }
}
