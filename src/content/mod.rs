//! Content pipeline: front matter, code fences, Markdown and pages.

pub mod codeblock;
pub mod front_matter;
pub mod markdown;
pub mod page;

pub use page::{Page, ParseOptions};
