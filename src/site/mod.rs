//! The site aggregate: validation, content collection and generation.
//!
//! # Build
//!
//! ```text
//! Site::build()
//!     │
//!     ├── validate()        content/ + config.toml + at least one .md
//!     ├── load config.toml  → theme → Theme::load()
//!     ├── collect_pages()   walk content/, parse each .md into a Page
//!     └── generate()        index, singles, static/, tags
//! ```
//!
//! Every build starts from an empty page set, so a `Site` can be built any
//! number of times and produces the same tree for the same content.

mod render;
pub mod theme;

use crate::{
    config::{
        SiteConfig,
        defaults::{CONFIG_FILE, CONTENT_DIR, CONTENT_EXTENSION, PUBLISH_DIR, THEMES_DIR},
    },
    content::{Page, ParseOptions},
    error::{IoContext, SiteError},
    log,
    logger::Logger,
};
use std::{
    collections::{BTreeSet, HashSet},
    fs,
    path::{Component, Path, PathBuf},
};
use theme::Theme;
use walkdir::WalkDir;

/// Name of the subdirectory that marks its parent as holding top-level pages
const POSTS_DIR: &str = "posts";

/// A site rooted at one working directory.
///
/// Not meant to be shared between threads; each build mutates it in place.
#[derive(Debug)]
pub struct Site {
    root: PathBuf,
    content_dir: PathBuf,
    publish_dir: PathBuf,
    config_path: PathBuf,
    config: SiteConfig,
    pages: Vec<Page>,
    /// Indices into `pages`
    toplevel: Vec<usize>,
    tags: BTreeSet<String>,
    logger: Logger,
}

impl Site {
    pub fn new(root: impl Into<PathBuf>, logger: Logger) -> Self {
        let root = root.into();
        Self {
            content_dir: root.join(CONTENT_DIR),
            publish_dir: root.join(PUBLISH_DIR),
            config_path: root.join(CONFIG_FILE),
            root,
            config: SiteConfig::default(),
            pages: Vec::new(),
            toplevel: Vec::new(),
            tags: BTreeSet::new(),
            logger,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configuration of the last load; defaults before the first one.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Pages of the last build, in traversal order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn toplevel_pages(&self) -> impl Iterator<Item = &Page> {
        self.toplevel.iter().map(|&idx| &self.pages[idx])
    }

    /// Union of every page's tags, sorted.
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Read `config.toml` into the site.
    pub fn load_config(&mut self) -> Result<&SiteConfig, SiteError> {
        self.config = SiteConfig::from_path(&self.config_path)?;
        Ok(&self.config)
    }

    /// A site needs a `content` directory and a `config.toml` file.
    pub fn is_valid(&self) -> bool {
        self.content_dir.is_dir() && self.config_path.is_file()
    }

    /// Fail unless the site can be built. Touches nothing on disk.
    pub fn validate(&self) -> Result<(), SiteError> {
        log!(self.logger, "build"; "validating {}", self.root.display());

        if !self.content_dir.is_dir() {
            return Err(SiteError::MissingContent(
                "Cannot find the ./content directory. \
                 Ensure that command is run from your site's root directory"
                    .into(),
            ));
        }
        if !self.is_valid() {
            return Err(SiteError::InvalidSite(self.root.clone()));
        }

        let has_content = WalkDir::new(&self.content_dir)
            .into_iter()
            .filter_map(Result::ok)
            .any(|entry| entry.file_type().is_file() && is_content_file(entry.path()));
        if !has_content {
            return Err(SiteError::MissingContent(
                "Cannot continue because content directory is empty".into(),
            ));
        }
        Ok(())
    }

    /// Build into `public/`.
    pub fn build(&mut self) -> Result<(), SiteError> {
        let publish_dir = self.publish_dir.clone();
        self.build_into(&publish_dir)
    }

    /// Full rebuild from source into `publish_dir`.
    pub fn build_into(&mut self, publish_dir: &Path) -> Result<(), SiteError> {
        self.validate()?;
        self.reset();

        self.load_config()?;
        let theme_dir = self
            .root
            .join(THEMES_DIR)
            .join(self.config.theme_name()?);
        let theme = Theme::load(&theme_dir)?;

        log!(self.logger, "build"; "using theme {}", theme.dir().display());
        log!(self.logger, "build"; "converting markdown to html in {}", publish_dir.display());
        fs::create_dir_all(publish_dir).at(publish_dir)?;

        self.collect_pages()?;
        self.generate(&theme, publish_dir)?;

        log!(
            self.logger,
            "build";
            "done: {} pages, {} tags",
            self.pages.len(),
            self.tags.len()
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.pages.clear();
        self.toplevel.clear();
        self.tags.clear();
    }

    /// Walk `content/` top-down, files of a directory before its
    /// subdirectories, names in byte order.
    fn collect_pages(&mut self) -> Result<(), SiteError> {
        let options = ParseOptions {
            normalize_code_blocks: self.config.build.normalize_code_blocks,
        };
        let walker = WalkDir::new(&self.content_dir).sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        });

        let mut toplevel_dirs = HashSet::new();
        for entry in walker {
            let entry = entry.map_err(|err| {
                let path = err
                    .path()
                    .map_or_else(|| self.content_dir.clone(), Path::to_path_buf);
                SiteError::Io(path, err.into())
            })?;
            let path = entry.path();

            if entry.file_type().is_dir() {
                if is_toplevel_dir(path).at(path)? {
                    toplevel_dirs.insert(path.to_path_buf());
                }
                continue;
            }
            if !is_content_file(path) {
                continue;
            }

            self.logger.detail(&format!("↠ {}", path.display()));
            let mut page = Page::parse(path, options)?;

            let parent = path.parent().unwrap_or(&self.content_dir);
            page.is_toplevel = toplevel_dirs.contains(parent);
            page.html_directory = relative_dir(&self.content_dir, parent);
            page.base_url = self.config.base_url.clone();

            self.tags.extend(page.tags().iter().cloned());
            if page.is_toplevel {
                self.toplevel.push(self.pages.len());
            }
            self.pages.push(page);
        }
        Ok(())
    }
}

fn is_content_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == CONTENT_EXTENSION)
}

/// A directory whose only subdirectory is `posts`.
fn is_toplevel_dir(dir: &Path) -> std::io::Result<bool> {
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            subdirs.push(entry.file_name());
        }
    }
    Ok(matches!(subdirs.as_slice(), [only] if only == POSTS_DIR))
}

/// `content/posts/2020` → `posts/2020`; the content root itself → `""`.
fn relative_dir(content_dir: &Path, dir: &Path) -> String {
    dir.strip_prefix(content_dir)
        .unwrap_or(dir)
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
