//! Frontmatter extraction and the loosely-typed mapping it produces.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw front-matter of a content file.
///
/// Values keep whatever shape the author wrote. Typed access goes through
/// [`ContentHeader`](crate::ContentHeader), which normalizes instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrontMatter(Map<String, Value>);

impl FrontMatter {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing JSON object.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Raw value for a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The value for `key` when it is a string.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The trimmed string value for `key`, or `None` when missing, mistyped or blank.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.str(key).map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Clone into a plain JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for FrontMatter {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Extract frontmatter from a markdown source.
///
/// Returns the parsed frontmatter and the remaining content after the frontmatter block.
/// A source without a leading `---` fence yields an empty mapping and the whole source.
pub fn extract_frontmatter(source: &str) -> Result<(FrontMatter, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((FrontMatter::new(), source));
    }

    // Find the closing ---
    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = after_open[..close_pos].trim();
    let remaining = &after_open[close_pos + 4..];

    if yaml_content.is_empty() {
        return Ok((FrontMatter::new(), remaining.trim_start()));
    }

    let value: Value = serde_yaml::from_str(yaml_content)
        .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    let front = match value {
        Value::Object(map) => FrontMatter(map),
        Value::Null => FrontMatter::new(),
        _ => return Err(FrontmatterError::NotAMapping),
    };

    Ok((front, remaining.trim_start()))
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("Frontmatter must be a mapping of keys to values")]
    NotAMapping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_valid_frontmatter() {
        let source = r#"---
title: Hello
lang: en
tags: [rust, go]
order: 2
---

# Hello World
"#;

        let (fm, content) = extract_frontmatter(source).unwrap();

        assert_eq!(fm.str("title"), Some("Hello"));
        assert_eq!(fm.get("tags"), Some(&json!(["rust", "go"])));
        assert_eq!(fm.get("order"), Some(&json!(2)));
        assert!(content.starts_with("# Hello World"));
    }

    #[test]
    fn keeps_dates_as_strings() {
        let source = "---\ndate: 2024-06-01\n---\nbody";

        let (fm, _) = extract_frontmatter(source).unwrap();

        assert_eq!(fm.str("date"), Some("2024-06-01"));
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let (fm, content) = extract_frontmatter(source).unwrap();

        assert!(fm.is_empty());
        assert_eq!(content, source);
    }

    #[test]
    fn handles_empty_block() {
        let (fm, content) = extract_frontmatter("---\n---\nBody").unwrap();

        assert!(fm.is_empty());
        assert_eq!(content, "Body");
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let source = "---\ntitle: Test\n# No closing";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let source = "---\ntitle: [invalid yaml\n---\n";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }

    #[test]
    fn errors_on_sequence_frontmatter() {
        let result = extract_frontmatter("---\n- a\n- b\n---\n");

        assert!(matches!(result, Err(FrontmatterError::NotAMapping)));
    }

    #[test]
    fn non_empty_trims_and_skips_blank() {
        let mut fm = FrontMatter::new();
        fm.insert("title", "  Spaced  ");
        fm.insert("blank", "   ");
        fm.insert("number", 3);

        assert_eq!(fm.non_empty("title"), Some("Spaced"));
        assert_eq!(fm.non_empty("blank"), None);
        assert_eq!(fm.non_empty("number"), None);
        assert_eq!(fm.non_empty("missing"), None);
    }
}
