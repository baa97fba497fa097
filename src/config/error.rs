//! Errors raised while reading or writing `config.toml`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read site config `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid config.toml")]
    Toml(#[from] toml::de::Error),

    #[error("cannot write config.toml")]
    Serialize(#[from] toml::ser::Error),

    /// `build` and `deploy` need a theme; `new` always writes one.
    #[error("no `theme` set in config.toml; name a directory under themes/")]
    MissingTheme,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_blank_theme_is_missing() {
        for source in ["title = \"Blog\"", "theme = \"\"", "theme = \"  \""] {
            let config = SiteConfig::from_str(source).unwrap();
            let err = config.theme_name().unwrap_err();
            assert!(matches!(err, ConfigError::MissingTheme), "{source}");
            assert!(err.to_string().contains("themes/"));
        }
    }

    #[test]
    fn test_unknown_key_reported_as_toml_error() {
        let err = SiteConfig::from_str("them = \"basic\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
        assert_eq!(err.to_string(), "invalid config.toml");
        assert!(std::error::Error::source(&err).is_some());
    }
}
