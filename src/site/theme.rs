//! Theme directory binding.
//!
//! ```text
//! themes/<name>/
//! ├── index.html              (or layouts/index.html)
//! ├── layouts/_default/
//! │   ├── list.html
//! │   └── single.html
//! └── static/                 (optional, copied to public/static)
//! ```

use crate::error::SiteError;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};

pub const INDEX: &str = "index.html";
pub const LIST: &str = "list.html";
pub const SINGLE: &str = "single.html";

/// Directory of list/single layouts, relative to the theme root
const DEFAULT_LAYOUTS: &str = "layouts/_default";

/// The resolved index, list and single templates of one theme.
#[derive(Debug)]
pub struct Theme {
    dir: PathBuf,
    tera: Tera,
}

impl Theme {
    /// Resolve and compile the three required templates of `dir`.
    pub fn load(dir: &Path) -> Result<Self, SiteError> {
        let index = [dir.join(INDEX), dir.join("layouts").join(INDEX)]
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| missing(dir, INDEX))?;

        let layouts = dir.join(DEFAULT_LAYOUTS);
        let list = required(dir, &layouts, LIST)?;
        let single = required(dir, &layouts, SINGLE)?;

        let mut tera = Tera::default();
        // Page bodies are already HTML
        tera.autoescape_on(Vec::new());
        tera.add_template_files(vec![
            (index, Some(INDEX)),
            (list, Some(LIST)),
            (single, Some(SINGLE)),
        ])?;

        Ok(Self {
            dir: dir.to_path_buf(),
            tera,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Assets copied verbatim into the publish directory.
    pub fn static_dir(&self) -> PathBuf {
        self.dir.join("static")
    }

    pub fn render(&self, template: &str, context: &Context) -> Result<String, SiteError> {
        Ok(self.tera.render(template, context)?)
    }
}

fn required(theme_dir: &Path, layouts: &Path, name: &str) -> Result<PathBuf, SiteError> {
    let path = layouts.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(missing(theme_dir, &format!("{DEFAULT_LAYOUTS}/{name}")))
    }
}

fn missing(dir: &Path, template: &str) -> SiteError {
    SiteError::Theme {
        dir: dir.to_path_buf(),
        template: template.to_owned(),
    }
}
