//! Markdown to HTML.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

/// Render a markdown body to HTML.
///
/// Fenced and indented code blocks are emitted as
/// `<pre class="code-block" data-code-language="..."><code class="language-...">`.
pub fn render_markdown(content: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let mut events = Vec::new();
    let mut code: Option<(String, String)> = None;

    for event in Parser::new_ext(content, options) {
        if let Some((_, source)) = code.as_mut() {
            match event {
                Event::Text(text) => source.push_str(&text),
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((language, source)) = code.take() {
                        events.push(Event::Html(CowStr::from(code_block(&language, &source))));
                    }
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => code_language(&info),
                    CodeBlockKind::Indented => String::new(),
                };
                code = Some((language, String::new()));
            }
            event => events.push(event),
        }
    }

    let mut output = String::with_capacity(content.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    output
}

/// First word of a fence info string, e.g. `rust` for "```rust title=x".
fn code_language(info: &str) -> String {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

fn code_block(language: &str, source: &str) -> String {
    let language = if language.is_empty() { "text" } else { language };
    let language = html_escape(language);

    format!(
        "<pre class=\"code-block\" data-code-language=\"{language}\"><code class=\"language-{language}\">{}</code></pre>\n",
        html_escape(source)
    )
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_markdown() {
        let html = render_markdown("# Title\n\nSome *text* and ~~old~~.");

        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>text</em>"));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn renders_tables_and_tasks() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n");

        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn renders_fenced_code() {
        let html = render_markdown("```rust title=main\nfn main() { a < b }\n```\n");

        assert!(html.contains(
            "<pre class=\"code-block\" data-code-language=\"rust\"><code class=\"language-rust\">fn main() { a &lt; b }\n</code></pre>"
        ));
    }

    #[test]
    fn untagged_code_is_text() {
        let html = render_markdown("```\n<b>\n```\n");

        assert!(html.contains("data-code-language=\"text\""));
        assert!(html.contains("&lt;b&gt;"));
    }

    #[test]
    fn keeps_html_comments() {
        let html = render_markdown("before\n\n<!--COMPONENT_SLOT_0_x-->\n\nafter");

        assert!(html.contains("<!--COMPONENT_SLOT_0_x-->"));
    }

    #[test]
    fn escapes_attributes() {
        assert_eq!(html_escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
