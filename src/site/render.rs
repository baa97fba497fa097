//! Output generation: template bindings and the files they render into.

use super::{
    Site,
    theme::{INDEX, LIST, SINGLE, Theme},
};
use crate::{
    content::page::{Page, PageView},
    error::{IoContext, SiteError},
    log,
    utils::{
        fs::{copy_dir_all, remove_dir_if_exists},
        slug::join_url,
    },
};
use serde::Serialize;
use std::{collections::HashMap, fs, path::Path};
use tera::Context;

const TAGS_DIR: &str = "tags";
const STATIC_DIR: &str = "static";

const HIGHLIGHTJS_IMPORTS: &str = concat!(
    r#"<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/highlight.js/9.18.1/styles/default.min.css">"#,
    "\n",
    r#"<script src="https://cdnjs.cloudflare.com/ajax/libs/highlight.js/9.18.1/highlight.min.js"></script>"#,
);

const MATHJAX_IMPORTS: &str = concat!(
    "<!-- mathjax for formulas -->\n",
    r#"<script src="https://cdnjs.cloudflare.com/ajax/libs/mathjax/2.7.3/MathJax.js?config=TeX-MML-AM_CHTML" async></script>"#,
);

const HIGHLIGHTJS_INIT: &str = "<script>hljs.initHighlightingOnLoad();</script>";

/// The `site` binding shared by every template.
#[derive(Debug, Serialize)]
pub struct SiteView<'a> {
    pub title: &'a str,
    pub base_url: &'a str,
    /// Site root link ending in `/`, for theme assets and fixed routes
    pub root_url: String,
    pub subtext: Option<&'a str>,
    pub imports: String,
    pub scripts: &'static str,
    pub toplevel_pages: Vec<PageView<'a>>,
    pub tags: Vec<&'a str>,
    pub extra: &'a HashMap<String, toml::Value>,
}

impl Site {
    pub fn view(&self) -> SiteView<'_> {
        SiteView {
            title: &self.config.title,
            base_url: &self.config.base_url,
            root_url: root_url(&self.config.base_url),
            subtext: self.config.subtext.as_deref(),
            imports: format!("{HIGHLIGHTJS_IMPORTS}\n{MATHJAX_IMPORTS}"),
            scripts: HIGHLIGHTJS_INIT,
            toplevel_pages: self.toplevel_pages().map(Page::view).collect(),
            tags: self.tags.iter().map(String::as_str).collect(),
            extra: &self.config.extra,
        }
    }

    /// Render every output file of the collected pages into `publish_dir`.
    pub(super) fn generate(&self, theme: &Theme, publish_dir: &Path) -> Result<(), SiteError> {
        let site = self.view();

        log!(self.logger, "build"; "creating index page");
        let pages: Vec<_> = self.pages.iter().map(Page::view).collect();
        let mut context = Context::new();
        context.insert("title", &self.config.title);
        context.insert("pages", &pages);
        context.insert("site", &site);
        write_html(&publish_dir.join(INDEX), &theme.render(INDEX, &context)?)?;

        log!(self.logger, "build"; "creating single pages");
        for page in &self.pages {
            let mut context = Context::new();
            context.insert("page", &page.view());
            context.insert("site", &site);
            context.insert("title", page.title());
            write_html(
                &publish_dir.join(page.output_path()),
                &theme.render(SINGLE, &context)?,
            )?;
        }

        copy_static(theme, publish_dir)?;
        self.generate_tags(theme, &site, publish_dir)
    }

    /// `tags/index.html` listing every tag, then one listing per tag.
    fn generate_tags(
        &self,
        theme: &Theme,
        site: &SiteView<'_>,
        publish_dir: &Path,
    ) -> Result<(), SiteError> {
        log!(self.logger, "build"; "creating {} tag pages", self.tags.len());
        let tags_dir = publish_dir.join(TAGS_DIR);

        let tag_pages: Vec<_> = self
            .tags
            .iter()
            .map(|tag| {
                let mut page = Page::synthetic(tag.as_str(), format!("./{TAGS_DIR}/{tag}/"));
                page.base_url = self.config.base_url.clone();
                page
            })
            .collect();
        let views: Vec<_> = tag_pages.iter().map(Page::view).collect();
        let html = render_list(theme, "Tags", &views, site)?;
        write_html(&tags_dir.join(INDEX), &html)?;

        for tag in &self.tags {
            let tagged: Vec<_> = self
                .pages
                .iter()
                .filter(|page| page.has_tag(tag))
                .map(Page::view)
                .collect();
            let html = render_list(theme, tag, &tagged, site)?;
            write_html(&tags_dir.join(tag).join(INDEX), &html)?;
        }
        Ok(())
    }
}

fn root_url(base_url: &str) -> String {
    let mut url = join_url(base_url, &[]);
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

fn render_list(
    theme: &Theme,
    title: &str,
    pages: &[PageView<'_>],
    site: &SiteView<'_>,
) -> Result<String, SiteError> {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("pages", pages);
    context.insert("site", site);
    theme.render(LIST, &context)
}

/// Replace `public/static` with the theme's `static/` directory.
fn copy_static(theme: &Theme, publish_dir: &Path) -> Result<(), SiteError> {
    let source = theme.static_dir();
    let target = publish_dir.join(STATIC_DIR);

    remove_dir_if_exists(&target).at(&target)?;
    if source.is_dir() {
        copy_dir_all(&source, &target).at(&source)?;
    }
    Ok(())
}

fn write_html(path: &Path, html: &str) -> Result<(), SiteError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).at(parent)?;
    }
    fs::write(path, html).at(path)
}
