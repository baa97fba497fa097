//! Front matter: the delimited metadata block at the top of a document.
//!
//! The parser is fed one line at a time and walks three states:
//!
//! ```text
//! NotStarted ──(delimiter line)──► InBlock ──(same delimiter)──► Complete
//!                                     │
//!                                     └── `key = value` / `key: value`
//! ```
//!
//! Values are stored as raw strings and only decoded into a [`MetaValue`]
//! when read, so a malformed value fails the accessor, never the parse pass.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_yaml_ng::Value as YamlValue;
use thiserror::Error;

/// Prefixes that open a front matter block (conventionally tripled).
pub const SECTION_DELIMITERS: &[&str] = &["--", "==", "++"];

/// Key/value separators, in precedence order.
pub const VALUE_SEPARATORS: &[char] = &['=', ':'];

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("front matter line has no `=` or `:` separator: `{line}`")]
    MissingSeparator { line: String },

    #[error("front matter line must contain exactly one `=`: `{line}`")]
    AmbiguousAssignment { line: String },

    #[error("expected a front matter delimiter (`---`, `+++`, `===`), found `{line}`")]
    ExpectedDelimiter { line: String },

    #[error("front matter is not closed by `{delimiter}`")]
    Unterminated { delimiter: String },

    #[error("front matter value of `{key}` cannot be decoded")]
    Decode {
        key: String,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

/// Position of the parser relative to the metadata block.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum State {
    #[default]
    NotStarted,
    InBlock,
    Complete,
}

// ============================================================================
// Parser
// ============================================================================

/// Line-oriented front matter parser and the mapping it builds.
#[derive(Debug, Default, Clone)]
pub struct FrontMatter {
    state: State,
    delimiter: Option<String>,
    /// Insertion-ordered raw entries
    entries: Vec<(String, String)>,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the block opening `text` and return it with the remaining body.
    pub fn split(text: &str) -> Result<(Self, String), FrontMatterError> {
        let mut meta = Self::new();
        let mut lines = text.lines();
        for line in lines.by_ref() {
            meta.parse_line(line)?;
            if meta.is_complete() {
                break;
            }
        }
        meta.finish()?;
        Ok((meta, lines.collect::<Vec<_>>().join("\n")))
    }

    /// Feed one line, in document order.
    ///
    /// Lines arriving after the block is complete are ignored.
    pub fn parse_line(&mut self, line: &str) -> Result<(), FrontMatterError> {
        let text = line.trim();
        if text.is_empty() {
            return Ok(());
        }

        match self.state {
            State::NotStarted if is_delimiter(text) => {
                self.delimiter = Some(text.to_owned());
                self.state = State::InBlock;
            }
            State::NotStarted => {
                return Err(FrontMatterError::ExpectedDelimiter { line: text.into() });
            }
            State::InBlock if self.delimiter.as_deref() == Some(text) => {
                self.state = State::Complete;
            }
            State::InBlock => {
                let (key, value) = split_assignment(text)?;
                self.insert(key, value);
            }
            State::Complete => {}
        }
        Ok(())
    }

    /// Check that the block was opened and closed.
    pub fn finish(&self) -> Result<(), FrontMatterError> {
        match self.state {
            State::Complete => Ok(()),
            _ => Err(FrontMatterError::Unterminated {
                delimiter: self.delimiter.clone().unwrap_or_else(|| "---".into()),
            }),
        }
    }

    pub const fn is_complete(&self) -> bool {
        matches!(self.state, State::Complete)
    }

    /// Store a raw value. Duplicate keys overwrite silently (last write wins)
    /// and keep their first position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Raw, undecoded value.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Raw entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Decode the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<MetaValue>, FrontMatterError> {
        self.raw(key)
            .map(|raw| {
                MetaValue::decode(raw).map_err(|source| FrontMatterError::Decode {
                    key: key.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    /// Scalar text of `key`. A value that reads as a mapping or fails to
    /// decode (`Rust: a primer`) is returned as written.
    pub fn text(&self, key: &str) -> Option<String> {
        let raw = self.raw(key)?;
        match MetaValue::decode(raw) {
            Ok(MetaValue::Raw(YamlValue::Mapping(_))) | Err(_) => Some(raw.to_owned()),
            Ok(value) => value.as_text(),
        }
    }

    /// Decode the value stored under `key`, or return `fallback` when absent.
    pub fn get_or(&self, key: &str, fallback: MetaValue) -> Result<MetaValue, FrontMatterError> {
        Ok(self.get(key)?.unwrap_or(fallback))
    }
}

/// Check if a stripped line opens a front matter block.
pub fn is_delimiter(text: &str) -> bool {
    SECTION_DELIMITERS.iter().any(|d| text.starts_with(d))
}

/// Pick the separator of an assignment line by precedence, not position.
pub fn value_separator(text: &str) -> Option<char> {
    VALUE_SEPARATORS.iter().copied().find(|sep| text.contains(*sep))
}

/// Split `key = value` (exactly one `=`) or `key: value` (first `:`).
fn split_assignment(text: &str) -> Result<(&str, &str), FrontMatterError> {
    match value_separator(text) {
        Some('=') => {
            let mut parts = text.split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(value), None) => Ok((key.trim(), value.trim())),
                _ => Err(FrontMatterError::AmbiguousAssignment { line: text.into() }),
            }
        }
        Some(sep) => {
            let (key, value) = text
                .split_once(sep)
                .ok_or_else(|| FrontMatterError::MissingSeparator { line: text.into() })?;
            Ok((key.trim(), value.trim()))
        }
        None => Err(FrontMatterError::MissingSeparator { line: text.into() }),
    }
}

// ============================================================================
// Decoded Values
// ============================================================================

/// A front matter value after structured decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    String(String),
    List(Vec<MetaValue>),
    Timestamp(DateTime<FixedOffset>),
    /// Anything else the decoder produced (numbers, booleans, maps, null)
    Raw(YamlValue),
}

impl MetaValue {
    /// Decode a raw front matter string.
    ///
    /// `"About"` becomes a string, `[a, b]` a list, and RFC 3339 or
    /// `YYYY-MM-DD` strings a timestamp.
    pub fn decode(raw: &str) -> Result<Self, serde_yaml_ng::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::Raw(YamlValue::Null));
        }
        let value: YamlValue = serde_yaml_ng::from_str(raw)?;
        Ok(Self::from_yaml(value))
    }

    fn from_yaml(value: YamlValue) -> Self {
        match value {
            YamlValue::String(s) => match parse_timestamp(&s) {
                Some(ts) => Self::Timestamp(ts),
                None => Self::String(s),
            },
            YamlValue::Sequence(items) => Self::List(items.into_iter().map(Self::from_yaml).collect()),
            YamlValue::Tagged(tagged) => Self::from_yaml(tagged.value),
            other => Self::Raw(other),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub const fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    /// Render scalar values as text (`1984`, `true`, a timestamp); `None`
    /// for lists, maps and null.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Timestamp(ts) => Some(ts.to_rfc3339()),
            Self::Raw(YamlValue::Number(n)) => Some(n.to_string()),
            Self::Raw(YamlValue::Bool(b)) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Flatten into a list of strings: a list yields its scalar items, a
    /// scalar yields itself, null yields nothing.
    pub fn into_strings(self) -> Vec<String> {
        match self {
            Self::List(items) => items.iter().filter_map(Self::as_text).collect(),
            other => other.as_text().into_iter().collect(),
        }
    }

    /// Convert for template bindings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
            Self::Raw(value) => serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
        }
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok().or_else(|| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn parse(text: &str) -> FrontMatter {
        let mut meta = FrontMatter::new();
        for line in text.lines() {
            meta.parse_line(line).unwrap();
        }
        meta
    }

    #[test]
    fn test_plus_delimiter_with_equals() {
        let meta = parse(
            r#"
            +++
            title = "About"
            date = 2019-02-06T16:52:34+01:00
            author= "Khalil"
            +++
            "#,
        );
        assert!(meta.is_complete());
        assert_eq!(meta.iter().count(), 3);
        assert_eq!(meta.raw("title"), Some("\"About\""));
        assert_eq!(meta.raw("author"), Some("\"Khalil\""));
        assert_eq!(meta.raw("date"), Some("2019-02-06T16:52:34+01:00"));
    }

    #[test]
    fn test_equals_delimiter() {
        let meta = parse("\n=====\ntitle = \"Contact\"\n=====\n");
        assert!(meta.is_complete());
        assert_eq!(meta.delimiter.as_deref(), Some("====="));
        assert_eq!(meta.iter().count(), 1);
        assert_eq!(meta.raw("title"), Some("\"Contact\""));
    }

    #[test]
    fn test_dash_delimiter_with_colon() {
        let meta = parse("---\ntitle : \"Map\"\n---");
        assert_eq!(meta.iter().count(), 1);
        assert_eq!(meta.raw("title"), Some("\"Map\""));
    }

    #[test]
    fn test_same_entries_for_every_delimiter_style() {
        for delimiter in ["---", "+++", "==="] {
            let text = format!("{delimiter}\ntitle = \"Post\"\ntags = [a, b]\n{delimiter}\nbody");
            let meta = FrontMatter::split(&text).unwrap().0;
            assert_eq!(meta.iter().count(), 2, "delimiter {delimiter}");
            assert_eq!(meta.raw("title"), Some("\"Post\""));
            assert_eq!(meta.raw("tags"), Some("[a, b]"));
        }
    }

    #[test]
    fn test_closing_delimiter_must_match_exactly() {
        let mut meta = FrontMatter::new();
        meta.parse_line("+++").unwrap();
        meta.parse_line("title = x").unwrap();
        // "++++" opens with the same prefix but is not the stored delimiter
        let err = meta.parse_line("++++").unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingSeparator { .. }));
        assert_eq!(meta.state, State::InBlock);
    }

    #[test]
    fn test_colon_value_keeps_later_colons() {
        let meta = parse("---\nlink: https://example.com/a\n---");
        assert_eq!(meta.raw("link"), Some("https://example.com/a"));
    }

    #[test]
    fn test_equals_takes_precedence_over_colon() {
        let meta = parse("---\ntime = 12:30\n---");
        assert_eq!(meta.raw("time"), Some("12:30"));
    }

    #[test]
    fn test_two_equals_signs_fail() {
        let mut meta = FrontMatter::new();
        meta.parse_line("+++").unwrap();
        let err = meta.parse_line("query = a=b").unwrap_err();
        assert!(matches!(err, FrontMatterError::AmbiguousAssignment { .. }));
    }

    #[test]
    fn test_missing_separator_fails_with_line() {
        let mut meta = FrontMatter::new();
        meta.parse_line("---").unwrap();
        let err = meta.parse_line("  just words  ").unwrap_err();
        match err {
            FrontMatterError::MissingSeparator { line } => assert_eq!(line, "just words"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_text_before_delimiter_fails() {
        let mut meta = FrontMatter::new();
        let err = meta.parse_line("# Heading").unwrap_err();
        assert!(matches!(err, FrontMatterError::ExpectedDelimiter { .. }));
    }

    #[test]
    fn test_blank_lines_ignored() {
        let meta = parse("\n\n---\n\ntitle: a\n\n---\n");
        assert!(meta.is_complete());
        assert_eq!(meta.iter().count(), 1);
    }

    #[test]
    fn test_duplicate_keys_last_write_wins() {
        let meta = parse("---\ntitle: first\nauthor: me\ntitle: second\n---");
        assert_eq!(meta.iter().count(), 2);
        assert_eq!(meta.raw("title"), Some("second"));
        let keys: Vec<_> = meta.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["title", "author"]);
    }

    #[test]
    fn test_lines_after_completion_ignored() {
        let mut meta = parse("---\ntitle: a\n---");
        meta.parse_line("no separator here").unwrap();
        assert_eq!(meta.iter().count(), 1);
    }

    #[test]
    fn test_unterminated_block() {
        let err = FrontMatter::split("+++\ntitle = a\n").unwrap_err();
        match err {
            FrontMatterError::Unterminated { delimiter } => assert_eq!(delimiter, "+++"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(FrontMatter::split("").is_err());
    }

    #[test]
    fn test_get_decodes_quoted_string() {
        let meta = parse("+++\ntitle = \"About\"\n+++");
        assert_eq!(
            meta.get("title").unwrap(),
            Some(MetaValue::String("About".into()))
        );
    }

    #[test]
    fn test_get_decodes_list() {
        let meta = parse("+++\ntags = [python, programming]\n+++");
        let tags = meta.get("tags").unwrap().unwrap();
        assert_eq!(tags.into_strings(), ["python", "programming"]);
    }

    #[test]
    fn test_get_decodes_timestamp() {
        let meta = parse("+++\ndate = 2019-02-06T16:52:34+01:00\n+++");
        let value = meta.get("date").unwrap().unwrap();
        let ts = value.as_timestamp().unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2019, 2, 6));
        assert_eq!(ts.hour(), 16);
        assert_eq!(ts.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_get_decodes_plain_date() {
        let value = MetaValue::decode("2021-12-31").unwrap();
        let ts = value.as_timestamp().unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2021, 12, 31));
    }

    #[test]
    fn test_get_missing_key_uses_fallback() {
        let meta = parse("---\ntitle: a\n---");
        assert_eq!(meta.get("tags").unwrap(), None);
        assert_eq!(
            meta.get_or("tags", MetaValue::List(Vec::new())).unwrap(),
            MetaValue::List(Vec::new())
        );
    }

    #[test]
    fn test_decode_error_stays_in_accessor() {
        // Parsing succeeds; only reading the malformed value fails
        let meta = parse("---\ntags: [unclosed\n---");
        assert_eq!(meta.raw("tags"), Some("[unclosed"));
        let err = meta.get("tags").unwrap_err();
        assert!(matches!(err, FrontMatterError::Decode { ref key, .. } if key == "tags"));
    }

    #[test]
    fn test_text_falls_back_to_raw() {
        let meta = parse("---\ntitle: Rust: a primer\nyear: 1984\nquoted: \"x: y\"\ntags: [a]\n---");
        assert_eq!(meta.text("title").as_deref(), Some("Rust: a primer"));
        assert_eq!(meta.text("year").as_deref(), Some("1984"));
        assert_eq!(meta.text("quoted").as_deref(), Some("x: y"));
        assert_eq!(meta.text("tags"), None);
        assert_eq!(meta.text("missing"), None);
    }

    #[test]
    fn test_scalar_values() {
        assert_eq!(MetaValue::decode("1984").unwrap().as_text().as_deref(), Some("1984"));
        assert_eq!(MetaValue::decode("true").unwrap().as_text().as_deref(), Some("true"));
        assert_eq!(MetaValue::decode("").unwrap(), MetaValue::Raw(YamlValue::Null));
        assert!(MetaValue::decode("").unwrap().into_strings().is_empty());
        assert_eq!(MetaValue::decode("rust").unwrap().into_strings(), ["rust"]);
    }

    #[test]
    fn test_to_json() {
        let value = MetaValue::decode("[a, 2]").unwrap();
        assert_eq!(value.to_json(), serde_json::json!(["a", 2]));
    }
}
