//! Component directive parser for markdown bodies.
//!
//! Parses directives like `{{> components/callout kind="warning" open }}` to extract the
//! component name and its props.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// A parsed component directive.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDirective {
    /// Template name including the namespace (e.g., "components/callout")
    pub name: String,

    /// Props given inline; quoted values are strings, bare names are `true`
    pub props: Map<String, Value>,

    /// Byte range of the whole directive in the source
    pub range: Range<usize>,
}

impl ComponentDirective {
    /// Short component name without the `components/` prefix.
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix("components/").unwrap_or(&self.name)
    }
}

/// Find every component directive in `source`, in document order.
pub fn parse_directives(source: &str) -> Vec<ComponentDirective> {
    static RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\{\{>\s*(components/[A-Za-z0-9_\-/]+)([^}]*)\}\}")
            .expect("Invalid component directive regex")
    });

    RE.captures_iter(source)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().to_string();
            let props = caps.get(2).map(|m| parse_props(m.as_str())).unwrap_or_default();

            Some(ComponentDirective {
                name,
                props,
                range: whole.range(),
            })
        })
        .collect()
}

fn parse_props(props_str: &str) -> Map<String, Value> {
    let mut props = Map::new();
    let props_str = props_str.trim();

    if props_str.is_empty() {
        return props;
    }

    // Match: name="value" or name='value' or name (boolean)
    static PROP_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"([a-zA-Z][a-zA-Z0-9_-]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'))?"#)
            .expect("Invalid prop regex")
    });

    for caps in PROP_RE.captures_iter(props_str) {
        let Some(name) = caps.get(1) else { continue };

        let value = match caps.get(2).or_else(|| caps.get(3)) {
            Some(m) => Value::String(m.as_str().to_string()),
            None => Value::Bool(true),
        };

        props.insert(name.as_str().to_string(), value);
    }

    props
}
