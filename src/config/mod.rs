//! Site configuration management for `config.toml`.
//!
//! # Keys
//!
//! | Key          | Purpose                                          |
//! |--------------|--------------------------------------------------|
//! | `theme`      | Theme directory name under `themes/` (required)  |
//! | `baseURL`    | Prefix for page permalinks (default `./`)        |
//! | `title`      | Site title                                       |
//! | `subtext`    | Optional tagline                                 |
//! | `[build]`    | Content pipeline switches                        |
//! | `[deploy]`   | Publish branch and remote                        |
//! | `[extra]`    | User-defined custom fields                       |
//!
//! # Example
//!
//! ```toml
//! theme = "basic"
//! baseURL = "./"
//! title = "My Blog"
//!
//! [build]
//! normalize_code_blocks = true
//!
//! [deploy]
//! branch = "gh-pages"
//! ```

pub mod defaults;
mod error;

pub use error::ConfigError;

use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing `config.toml`
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Theme name, resolved to `themes/<theme>`.
    #[serde(default = "defaults::theme", skip_serializing_if = "Option::is_none")]
    #[educe(Default = defaults::theme())]
    pub theme: Option<String>,

    /// Base URL used when building page permalinks.
    #[serde(rename = "baseURL", default = "defaults::base_url")]
    #[educe(Default = defaults::base_url())]
    pub base_url: String,

    /// Site title displayed by themes.
    #[serde(default = "defaults::title")]
    #[educe(Default = defaults::title())]
    pub title: String,

    /// Optional tagline displayed under the title.
    #[serde(default = "defaults::subtext", skip_serializing_if = "Option::is_none")]
    #[educe(Default = defaults::subtext())]
    pub subtext: Option<String>,

    /// Content pipeline settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Publishing settings
    #[serde(default)]
    pub deploy: DeployConfig,

    /// User-defined extra fields
    #[serde(default)]
    pub extra: HashMap<String, toml::Value>,
}

/// `[build]` section - content pipeline switches.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Rewrite fenced code blocks into highlight.js markup before rendering.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = defaults::r#false())]
    pub normalize_code_blocks: bool,
}

/// `[deploy]` section - where the generated site is published.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    /// Branch receiving the generated site.
    #[serde(default = "defaults::deploy::branch")]
    #[educe(Default = defaults::deploy::branch())]
    pub branch: String,

    /// Remote the publish branch is pushed to.
    #[serde(default = "defaults::deploy::remote")]
    #[educe(Default = defaults::deploy::remote())]
    pub remote: String,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Serialize to the pretty TOML written by `clog new`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Theme name required by `build`.
    pub fn theme_name(&self) -> Result<&str, ConfigError> {
        match self.theme.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(ConfigError::MissingTheme),
        }
    }
}
