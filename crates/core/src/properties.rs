//! Java-style `.properties` sources
//!
//! Gradle projects keep developer and signing settings in `local.properties`
//! and `key.properties`. Both are optional and git-ignored, so loading a
//! missing file yields an empty source rather than an error.
//!
//! [`PropertyLayers`] stacks several sources; later layers win.

use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// An ordered key/value mapping loaded from an optional `.properties` file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropertySource {
    entries: BTreeMap<String, String>,
}

impl PropertySource {
    /// Create an empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from in-memory pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse `.properties` text. Parsing is lenient and never fails.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut entries = BTreeMap::new();
        let mut lines = content.lines();

        while let Some(line) = lines.next() {
            let trimmed = line.trim_start_matches(is_blank);
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            let mut logical = trimmed.to_string();
            while ends_with_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some(next) => logical.push_str(next.trim_start_matches(is_blank)),
                    None => break,
                }
            }

            let (key, value) = split_entry(&logical);
            entries.insert(unescape(key), unescape(value));
        }

        Self { entries }
    }

    /// Load a source from `path`; a missing file yields an empty source.
    ///
    /// A file that exists but cannot be read is still an error.
    pub fn load_optional(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let source = Self::parse(&content);
                tracing::debug!(path = %path.display(), entries = source.len(), "Loaded properties");
                Ok(source)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Properties file absent, using empty source");
                Ok(Self::new())
            }
            Err(e) => Err(Error::properties(path, e.to_string()).with_source(e)),
        }
    }

    /// Raw value for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Whether the source has any entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Sources stacked lowest to highest precedence
#[derive(Debug, Clone, Default)]
pub struct PropertyLayers<'a> {
    layers: Vec<&'a PropertySource>,
}

impl<'a> PropertyLayers<'a> {
    /// Create an empty stack
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a layer on top of the existing ones
    #[must_use]
    pub fn with(mut self, layer: &'a PropertySource) -> Self {
        self.layers.push(layer);
        self
    }

    /// Value from the highest layer that defines `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.layers.iter().rev().find_map(|layer| layer.get(key))
    }

    /// Value from the highest layer whose entry for `key` is accepted by `parse`.
    ///
    /// A rejected value does not shadow lower layers.
    pub fn get_where<T>(&self, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        self.layers.iter().rev().find_map(|layer| {
            let raw = layer.get(key)?;
            let parsed = parse(raw);
            if parsed.is_none() {
                tracing::debug!(key, value = raw, "Ignoring malformed property value");
            }
            parsed
        })
    }
}

/// Set `updates` in the properties file at `path`, keeping every other line.
///
/// Existing entries are replaced in place (later duplicates are dropped),
/// missing keys are appended, and a missing file is created.
pub fn update_file(path: &Path, updates: &[(&str, &str)]) -> Result<()> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(Error::properties(path, e.to_string()).with_source(e)),
    };

    let mut written: Vec<&str> = Vec::new();
    let mut out: Vec<String> = Vec::new();
    let mut skipping_continuation = false;
    let mut in_continuation = false;

    for line in existing.lines() {
        if in_continuation {
            in_continuation = ends_with_continuation(line);
            if !skipping_continuation {
                out.push(line.to_string());
            }
            continue;
        }
        skipping_continuation = false;

        let trimmed = line.trim_start_matches(is_blank);
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            out.push(line.to_string());
            continue;
        }

        in_continuation = ends_with_continuation(line);
        let key = unescape(split_entry(trimmed).0);

        match updates.iter().find(|(k, _)| *k == key) {
            Some((k, v)) => {
                skipping_continuation = true;
                if !written.contains(k) {
                    out.push(format_entry(k, v));
                    written.push(*k);
                }
            }
            None => out.push(line.to_string()),
        }
    }

    for (k, v) in updates {
        if !written.contains(k) {
            out.push(format_entry(k, v));
        }
    }

    let mut content = out.join("\n");
    content.push('\n');
    std::fs::write(path, content).map_err(|e| Error::properties(path, e.to_string()).with_source(e))
}

/// Render a single `key=value` line with the necessary escapes
#[must_use]
pub fn format_entry(key: &str, value: &str) -> String {
    format!("{}={}", escape(key, true), escape(value, false))
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches(is_blank);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches(is_blank);
    }
    (key, rest)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                if hex.len() == 4 && hex.chars().all(|h| h.is_ascii_hexdigit()) {
                    let decoded = u32::from_str_radix(&hex, 16)
                        .ok()
                        .and_then(char::from_u32)
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                    out.push(decoded);
                    for _ in 0..4 {
                        chars.next();
                    }
                } else {
                    out.push('u');
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());

    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' if is_key => {
                out.push('\\');
                out.push(c);
            }
            '#' | '!' if i == 0 => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_separators_and_comments() {
        let source = PropertySource::parse(
            "# developer settings\n\
             ! legacy comment\n\
             \n\
             flutter.sdk=/opt/flutter\n\
             flutter.versionName : 2.4.0\n\
             flutter.versionCode   17\n",
        );

        assert_eq!(source.len(), 3);
        assert_eq!(source.get("flutter.sdk"), Some("/opt/flutter"));
        assert_eq!(source.get("flutter.versionName"), Some("2.4.0"));
        assert_eq!(source.get("flutter.versionCode"), Some("17"));
    }

    #[test]
    fn test_parse_continuation_and_escapes() {
        let source = PropertySource::parse(
            "storeFile=/keys/\\\n    upload.jks\n\
             keyAlias=upload\\tkey\n\
             path\\ with\\ spaces=C\\:\\\\Users\n\
             greeting=\\u4f60\\u597d\n",
        );

        assert_eq!(source.get("storeFile"), Some("/keys/upload.jks"));
        assert_eq!(source.get("keyAlias"), Some("upload\tkey"));
        assert_eq!(source.get("path with spaces"), Some("C:\\Users"));
        assert_eq!(source.get("greeting"), Some("你好"));
    }

    #[test]
    fn test_parse_even_backslashes_do_not_continue() {
        let source = PropertySource::parse("dir=C:\\\\\nnext=1\n");
        assert_eq!(source.get("dir"), Some("C:\\"));
        assert_eq!(source.get("next"), Some("1"));
    }

    #[test]
    fn test_parse_later_duplicate_wins_and_empty_value() {
        let source = PropertySource::parse("keyAlias=old\nkeyAlias=new\nkeyPassword=\n");
        assert_eq!(source.get("keyAlias"), Some("new"));
        assert_eq!(source.get("keyPassword"), Some(""));
    }

    #[test]
    fn test_load_optional_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let source = PropertySource::load_optional(&dir.path().join("key.properties")).unwrap();
        assert!(source.is_empty());
    }

    #[test]
    fn test_load_optional_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("local.properties");
        std::fs::write(&path, "flutter.versionName=3.0.1\r\nflutter.versionCode=30\r\n").unwrap();

        let source = PropertySource::load_optional(&path).unwrap();
        assert_eq!(source.get("flutter.versionName"), Some("3.0.1"));
        assert_eq!(source.get("flutter.versionCode"), Some("30"));
    }

    #[test]
    fn test_load_optional_unreadable_is_error() {
        let dir = TempDir::new().unwrap();
        // A directory exists but cannot be read as a file
        let err = PropertySource::load_optional(dir.path()).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::PropertiesError);
    }

    #[test]
    fn test_layers_later_wins() {
        let defaults = PropertySource::from_pairs([("a", "1"), ("b", "1")]);
        let local = PropertySource::from_pairs([("b", "2")]);
        let layers = PropertyLayers::new().with(&defaults).with(&local);

        assert_eq!(layers.get("a"), Some("1"));
        assert_eq!(layers.get("b"), Some("2"));
        assert_eq!(layers.get("c"), None);
    }

    #[test]
    fn test_layers_malformed_value_falls_through() {
        let defaults = PropertySource::from_pairs([("flutter.versionCode", "7")]);
        let local = PropertySource::from_pairs([("flutter.versionCode", "seven")]);
        let layers = PropertyLayers::new().with(&defaults).with(&local);

        let code = layers.get_where("flutter.versionCode", |v| v.trim().parse::<u32>().ok());
        assert_eq!(code, Some(7));
    }

    #[test]
    fn test_update_file_preserves_other_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("local.properties");
        std::fs::write(
            &path,
            "## Generated by Flutter\nsdk.dir=/opt/android\nflutter.versionName=1.0\n\
             flutter.versionCode=1\nflutter.versionCode=2\n",
        )
        .unwrap();

        update_file(&path, &[("flutter.versionCode", "42"), ("flutter.buildMode", "release")])
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("## Generated by Flutter\nsdk.dir=/opt/android\n"));
        assert_eq!(content.matches("flutter.versionCode").count(), 1);
        assert!(content.ends_with("flutter.buildMode=release\n"));

        let source = PropertySource::parse(&content);
        assert_eq!(source.get("flutter.versionCode"), Some("42"));
        assert_eq!(source.get("flutter.versionName"), Some("1.0"));
    }

    #[test]
    fn test_update_file_drops_replaced_continuation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("local.properties");
        std::fs::write(&path, "flutter.versionName=1.\\\n  0\nkeep=yes\n").unwrap();

        update_file(&path, &[("flutter.versionName", "2.0")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "flutter.versionName=2.0\nkeep=yes\n");
    }

    #[test]
    fn test_update_file_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("local.properties");

        update_file(&path, &[("flutter.versionName", "0.1.0")]).unwrap();

        let source = PropertySource::load_optional(&path).unwrap();
        assert_eq!(source.get("flutter.versionName"), Some("0.1.0"));
    }

    proptest! {
        #[test]
        fn prop_formatted_entry_loads_back(key in "[a-zA-Z][a-zA-Z0-9._ =:-]{0,20}", value in "\\PC{0,40}") {
            let source = PropertySource::parse(&format_entry(&key, &value));
            prop_assert_eq!(source.get(&key), Some(value.as_str()));
        }
    }
}
