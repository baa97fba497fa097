//! A single content document and its derived output location.
//!
//! ```text
//! content/posts/hello.md ──parse──► Page { title, html, tags, .. }
//!                                     │
//!                                     └── public/posts/<slug>/index.html
//! ```

use super::{
    codeblock::format_codeblocks,
    front_matter::{FrontMatter, FrontMatterError, MetaValue},
    markdown::render_markdown,
};
use crate::{
    config::defaults,
    error::{IoContext, ParseError, SiteError},
    utils::{
        date::{format_date, humanize},
        slug::{join_url, slugify},
    },
};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

/// Options controlling how a document is turned into HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Run the code block normalizer on the body before rendering
    pub normalize_code_blocks: bool,
}

/// One parsed content document.
#[derive(Debug, Clone)]
pub struct Page {
    pub meta: FrontMatter,
    /// Rendered body
    pub html: String,
    title: String,
    tags: Vec<String>,
    html_filename: String,
    /// Output directory relative to the publish root (`""` at top level)
    pub html_directory: String,
    pub is_toplevel: bool,
    pub base_url: String,
}

impl Page {
    /// Read and parse one source file.
    pub fn parse(path: &Path, options: ParseOptions) -> Result<Self, SiteError> {
        let text = fs::read_to_string(path).at(path)?;
        Self::from_source(path, &text, options)
    }

    /// Parse document text that came from `path`.
    pub fn from_source(path: &Path, text: &str, options: ParseOptions) -> Result<Self, SiteError> {
        let parse_err = |source: ParseError| SiteError::Parse {
            path: path.to_path_buf(),
            source,
        };
        let meta_err = |err: FrontMatterError| parse_err(err.into());

        let (meta, body) = FrontMatter::split(text).map_err(meta_err)?;

        let body = if options.normalize_code_blocks {
            format_codeblocks(&body).map_err(|err| parse_err(err.into()))?
        } else {
            body
        };
        let html = render_markdown(&body);

        let title = meta
            .text("title")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SiteError::MissingTitle(path.to_path_buf()))?;

        let tags = meta
            .get_or("tags", MetaValue::List(Vec::new()))
            .map_err(meta_err)?
            .into_strings();
        let tags = dedup(tags);
        for tag in &tags {
            check_segment("tags", tag).map_err(parse_err)?;
        }

        let html_filename = match meta.text("slug") {
            Some(slug) if !slug.trim().is_empty() => slug.trim().to_owned(),
            _ => fallback_slug(path, &title).map_err(parse_err)?,
        };
        check_segment("slug", &html_filename).map_err(parse_err)?;

        Ok(Self {
            meta,
            html,
            title,
            tags,
            html_filename,
            html_directory: String::new(),
            is_toplevel: false,
            base_url: defaults::base_url(),
        })
    }

    /// A body-less page used to list other pages (e.g. one entry per tag).
    pub fn synthetic(title: impl Into<String>, html_filename: impl Into<String>) -> Self {
        Self {
            meta: FrontMatter::new(),
            html: String::new(),
            title: title.into(),
            tags: Vec::new(),
            html_filename: html_filename.into(),
            html_directory: String::new(),
            is_toplevel: false,
            base_url: defaults::base_url(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Output name; the title slug unless overridden.
    pub fn html_filename(&self) -> &str {
        &self.html_filename
    }

    /// Tags in declaration order, without duplicates.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Rooted permalink: `base_url / html_directory / html_filename`.
    pub fn href(&self) -> String {
        join_url(&self.base_url, &[&self.html_directory, &self.html_filename])
    }

    /// Path of the rendered file below the publish root.
    pub fn output_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        if !self.html_directory.is_empty() {
            path.push(&self.html_directory);
        }
        path.push(&self.html_filename);
        path.join("index.html")
    }

    /// Front matter `date`, when it decodes to a timestamp.
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.meta
            .get("date")
            .ok()
            .flatten()
            .and_then(|v| v.as_timestamp().copied())
    }

    /// Serializable view handed to templates.
    pub fn view(&self) -> PageView<'_> {
        let date = self.date();
        let now = chrono::Local::now().fixed_offset();
        PageView {
            title: &self.title,
            href: self.href(),
            html: &self.html,
            tags: &self.tags,
            date: date.as_ref().map(format_date),
            date_humanized: date.as_ref().map(|d| humanize(d, &now)),
            is_toplevel: self.is_toplevel,
            params: self.params(),
        }
    }

    /// Every front matter entry decoded to JSON; undecodable values stay raw.
    fn params(&self) -> serde_json::Map<String, serde_json::Value> {
        self.meta
            .iter()
            .map(|(key, raw)| {
                let value = MetaValue::decode(raw)
                    .map(|v| v.to_json())
                    .unwrap_or_else(|_| serde_json::Value::String(raw.to_owned()));
                (key.to_owned(), value)
            })
            .collect()
    }
}

/// Template binding for a page.
#[derive(Debug, Serialize)]
pub struct PageView<'a> {
    pub title: &'a str,
    pub href: String,
    pub html: &'a str,
    pub tags: &'a [String],
    pub date: Option<String>,
    pub date_humanized: Option<String>,
    pub is_toplevel: bool,
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// Slug of the title, else of the file stem.
fn fallback_slug(path: &Path, title: &str) -> Result<String, ParseError> {
    let from_title = slugify(title);
    if !from_title.is_empty() {
        return Ok(from_title);
    }
    path.file_stem()
        .map(|stem| slugify(&stem.to_string_lossy()))
        .filter(|slug| !slug.is_empty())
        .ok_or_else(|| ParseError::EmptySlug { title: title.to_owned() })
}

/// Tags and slugs name output directories below the publish root.
fn check_segment(key: &'static str, value: &str) -> Result<(), ParseError> {
    let path = Path::new(value);
    let mut components = path.components().peekable();
    if components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_))) {
        Ok(())
    } else {
        Err(ParseError::UnsafePath {
            key,
            value: value.to_owned(),
        })
    }
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(items.len());
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}
