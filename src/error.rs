//! Error taxonomy of the content pipeline.
//!
//! Everything that can stop a build surfaces as a [`SiteError`]; the CLI
//! boundary wraps it in `anyhow` and turns it into a message and exit code.

use crate::{
    config::ConfigError,
    content::{codeblock::CodeBlockError, front_matter::FrontMatterError},
};
use std::path::PathBuf;
use thiserror::Error;

/// Failures of site creation, validation and generation.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error(
        "`{}` is not a site: expected a `content` directory and a `config.toml` file",
        .0.display()
    )]
    InvalidSite(PathBuf),

    #[error("{0}")]
    MissingContent(String),

    #[error("page `{}` has no `title` in its front matter", .0.display())]
    MissingTitle(PathBuf),

    #[error("Cannot create a project in an existing directory: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("failed to parse `{}`", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("theme `{}` is missing template `{template}`", dir.display())]
    Theme { dir: PathBuf, template: String },

    #[error("template rendering failed")]
    Template(#[from] tera::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error at `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

/// Problems inside a single content document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),

    #[error(transparent)]
    CodeBlock(#[from] CodeBlockError),

    #[error("`{key}` value `{value}` must be a relative path without `.` or `..` segments")]
    UnsafePath { key: &'static str, value: String },

    #[error("cannot derive an output name from title `{title}` or the file name")]
    EmptySlug { title: String },
}

/// Attach a path to an IO error.
pub trait IoContext<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T, SiteError>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T, SiteError> {
        self.map_err(|err| SiteError::Io(path.into(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_already_exists_message() {
        let err = SiteError::AlreadyExists(PathBuf::from("/tmp/blog"));
        assert_eq!(
            err.to_string(),
            "Cannot create a project in an existing directory: /tmp/blog"
        );
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let err = SiteError::Parse {
            path: PathBuf::from("content/about.md"),
            source: ParseError::FrontMatter(FrontMatterError::MissingSeparator {
                line: "hello".into(),
            }),
        };
        assert!(err.to_string().contains("content/about.md"));
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert!(source.unwrap().contains("hello"));
    }

    #[test]
    fn test_io_context() {
        let result: std::io::Result<()> = Err(Error::new(ErrorKind::NotFound, "gone"));
        let err = result.at("public/index.html").unwrap_err();
        assert!(matches!(err, SiteError::Io(path, _) if path.ends_with("index.html")));
    }
}
