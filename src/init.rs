//! Site initialization module.
//!
//! Creates a new site from the blank skeleton and default theme embedded
//! in the binary.

use crate::{
    config::{
        SiteConfig,
        defaults::{CONFIG_FILE, THEMES_DIR},
    },
    error::{IoContext, SiteError},
    log,
    logger::Logger,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Theme installed into every new site
const DEFAULT_THEME: &str = "basic";

/// Blank site skeleton, relative to the site root
const SITE_FILES: &[(&str, &str)] = &[
    (
        "archetypes/default.md",
        include_str!("embed/site/archetypes/default.md"),
    ),
    ("content/posts/.gitkeep", ""),
    (".nojekyll", ""),
    (".gitignore", "public/\n"),
];

/// Default theme, relative to `themes/basic`
const THEME_FILES: &[(&str, &str)] = &[
    ("index.html", include_str!("embed/theme/basic/index.html")),
    (
        "layouts/_default/list.html",
        include_str!("embed/theme/basic/layouts/_default/list.html"),
    ),
    (
        "layouts/_default/single.html",
        include_str!("embed/theme/basic/layouts/_default/single.html"),
    ),
    (
        "static/css/style.css",
        include_str!("embed/theme/basic/static/css/style.css"),
    ),
];

/// Create a new site at `destination`, which must not exist yet.
///
/// Returns the absolute path of the created site.
pub fn new_site(destination: &Path, logger: Logger) -> Result<PathBuf, SiteError> {
    if destination.exists() {
        return Err(SiteError::AlreadyExists(destination.to_path_buf()));
    }

    write_files(destination, SITE_FILES)?;
    write_files(&destination.join(THEMES_DIR).join(DEFAULT_THEME), THEME_FILES)?;
    init_default_config(destination)?;

    log!(logger, "new"; "installed theme `{DEFAULT_THEME}`");
    fs::canonicalize(destination).at(destination)
}

/// Write `config.toml` selecting the default theme.
fn init_default_config(root: &Path) -> Result<(), SiteError> {
    let config = SiteConfig {
        theme: Some(DEFAULT_THEME.into()),
        ..SiteConfig::default()
    };
    let path = root.join(CONFIG_FILE);
    fs::write(&path, config.to_toml()?).at(path)
}

fn write_files(root: &Path, files: &[(&str, &str)]) -> Result<(), SiteError> {
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).at(parent)?;
        }
        fs::write(&path, content).at(path)?;
    }
    Ok(())
}
