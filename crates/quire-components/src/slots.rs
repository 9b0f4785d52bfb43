//! Two-phase component slot substitution.
//!
//! Phase one renders every component directive and leaves an opaque comment marker in the
//! markdown. Phase two runs after markdown rendering and replaces each marker, together with
//! any paragraph wrapping the markdown renderer put around it, with the rendered fragment.
//! Substitutions run in reverse creation order.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::iter::Rev;
use std::slice;

use regex::{NoExpand, Regex};
use serde_json::{Map, Value};

use crate::directive::parse_directives;
use crate::traits::{ComponentError, ComponentRenderer};

/// A rendered component waiting to be injected.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    /// Opaque identifier, unique within one document
    pub token: String,

    /// Exact text inserted into the markdown: the comment on its own line
    pub marker: String,

    /// Rendered component HTML
    pub html: String,
}

impl Placeholder {
    fn new(index: usize, name: &str, html: String) -> Self {
        let safe_name: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        let mut hasher = DefaultHasher::new();
        index.hash(&mut hasher);
        name.hash(&mut hasher);
        html.hash(&mut hasher);
        let digest = hasher.finish() as u32;

        let token = format!("COMPONENT_SLOT_{index}_{safe_name}_{digest:08x}");
        let marker = format!("\n<!--{token}-->\n");

        Self {
            token,
            marker,
            html,
        }
    }

    /// The bare comment the markdown renderer passes through.
    pub fn comment(&self) -> String {
        format!("<!--{}-->", self.token)
    }

    /// Replace this placeholder in `html`.
    ///
    /// The comment is matched with optional surrounding `<p>`/`</p>` and whitespace. When
    /// nothing matches, the raw marker is replaced instead.
    pub fn apply(&self, html: &str) -> String {
        let pattern = format!(
            r"(?:<p>)?\s*{}\s*(?:</p>)?",
            regex::escape(&self.comment())
        );

        if let Ok(re) = Regex::new(&pattern) {
            if re.is_match(html) {
                return re.replace_all(html, NoExpand(&self.html)).into_owned();
            }
        }

        html.replace(&self.marker, &self.html)
    }
}

/// Markdown with component directives replaced by markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotDocument {
    pub markdown: String,
    pub placeholders: Vec<Placeholder>,
}

impl SlotDocument {
    /// Document without any component slots.
    pub fn plain(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            placeholders: Vec::new(),
        }
    }

    pub fn has_slots(&self) -> bool {
        !self.placeholders.is_empty()
    }

    /// Phase two over the HTML rendered from [`SlotDocument::markdown`].
    pub fn inject(&self, html: &str) -> String {
        inject_components(html, &self.placeholders)
    }
}

/// Phase one: render each `{{> components/<name> }}` directive and replace it with a marker.
///
/// Each component receives `ctx` with the directive's inline props layered on top.
pub fn render_components<R>(
    markdown: &str,
    ctx: &Value,
    renderer: &R,
) -> Result<SlotDocument, ComponentError>
where
    R: ComponentRenderer + ?Sized,
{
    let directives = parse_directives(markdown);
    if directives.is_empty() {
        return Ok(SlotDocument::plain(markdown));
    }

    let mut output = String::with_capacity(markdown.len());
    let mut placeholders = Vec::with_capacity(directives.len());
    let mut cursor = 0;

    for directive in directives {
        let component_ctx = merge_props(ctx, &directive.props);
        let html = renderer.render_component(&directive.name, &component_ctx)?;
        let placeholder = Placeholder::new(placeholders.len(), &directive.name, html);

        output.push_str(&markdown[cursor..directive.range.start]);
        output.push_str(&placeholder.marker);
        cursor = directive.range.end;

        placeholders.push(placeholder);
    }
    output.push_str(&markdown[cursor..]);

    Ok(SlotDocument {
        markdown: output,
        placeholders,
    })
}

fn merge_props(ctx: &Value, props: &Map<String, Value>) -> Value {
    let mut merged = match ctx {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    for (key, value) in props {
        merged.insert(key.clone(), value.clone());
    }
    Value::Object(merged)
}

/// Lazy sequence of pending substitutions, newest first.
pub struct Substitutions<'a> {
    inner: Rev<slice::Iter<'a, Placeholder>>,
}

impl<'a> Substitutions<'a> {
    pub fn new(placeholders: &'a [Placeholder]) -> Self {
        Self {
            inner: placeholders.iter().rev(),
        }
    }

    /// Run every remaining substitution over `html`.
    pub fn apply(self, html: &str) -> String {
        self.fold(html.to_string(), |out, placeholder| placeholder.apply(&out))
    }
}

impl<'a> Iterator for Substitutions<'a> {
    type Item = &'a Placeholder;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Phase two: replace every placeholder marker in rendered HTML.
pub fn inject_components(html: &str, placeholders: &[Placeholder]) -> String {
    if html.is_empty() || placeholders.is_empty() {
        return html.to_string();
    }
    Substitutions::new(placeholders).apply(html)
}
