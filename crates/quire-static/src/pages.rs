//! Rendered pages waiting to be written, and the output path rule.

use std::path::Path;

use crate::i18n::LanguageConfig;
use crate::url::canonical_to_relative_path;

/// Logging details attached to a page write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteMeta {
    /// Step name, e.g. `BUILD_PAGE`; `WRITE_HTML` when empty
    pub action: String,
    pub source: String,
    /// Content template name, or `static` for copied HTML
    pub kind: String,
    pub lang: String,
    pub template: Option<String>,
    pub items: Option<usize>,
    /// `"{page}/{total}"` for paginated pages
    pub page: Option<String>,
    pub input_bytes: Option<usize>,
}

impl WriteMeta {
    pub fn new(action: &str, kind: &str, source: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            action: action.to_string(),
            kind: kind.to_string(),
            source: source.into(),
            lang: lang.into(),
            ..Default::default()
        }
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn items(mut self, items: usize) -> Self {
        self.items = Some(items);
        self
    }

    pub fn page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    pub fn input_bytes(mut self, bytes: usize) -> Self {
        self.input_bytes = Some(bytes);
        self
    }
}

/// One rendered HTML page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub html: String,
    /// `/`-separated path relative to the output directory
    pub output_path: String,
    pub source_path: String,
    pub lang: String,
    pub template: String,
    pub layout: String,
    pub meta: WriteMeta,
}

/// Pages rendered during a build, written together at the end.
#[derive(Debug, Default)]
pub struct PageRegistry {
    pages: Vec<RenderedPage>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, page: RenderedPage) {
        if page.output_path.is_empty() {
            tracing::warn!("Skipping page without output path: {}", page.source_path);
            return;
        }
        self.pages.push(page);
    }

    pub fn count(&self) -> usize {
        self.pages.len()
    }

    pub fn contains_output(&self, output_path: &str) -> bool {
        self.pages.iter().any(|p| p.output_path == output_path)
    }

    pub fn pages(&self) -> &[RenderedPage] {
        &self.pages
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }

    /// Write every page under `output_dir` in output path order. Returns the number written.
    pub async fn flush(&self, output_dir: &Path) -> std::io::Result<usize> {
        let mut pages: Vec<&RenderedPage> = self.pages.iter().collect();
        pages.sort_by(|a, b| a.output_path.cmp(&b.output_path));

        for page in &pages {
            let dest = output_dir.join(&page.output_path);
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&dest, &page.html).await?;
            log_write(&dest, page);
        }

        Ok(pages.len())
    }
}

fn log_write(dest: &Path, page: &RenderedPage) {
    let meta = &page.meta;
    let action = if meta.action.is_empty() {
        "WRITE_HTML"
    } else {
        meta.action.as_str()
    };
    let kind = if meta.kind.is_empty() { "html" } else { meta.kind.as_str() };

    tracing::info!(
        dest = %normalize_log_path(&dest.display().to_string()),
        source = %normalize_log_path(&meta.source),
        kind,
        lang = %meta.lang,
        template = meta.template.as_deref().unwrap_or(""),
        items = %meta.items.map(|n| n.to_string()).unwrap_or_default(),
        page = meta.page.as_deref().unwrap_or(""),
        input = %meta.input_bytes.map(format_bytes).unwrap_or_default(),
        output = %format_bytes(page.html.len()),
        "{}",
        action
    );
}

/// Output file of a page, relative to the output directory.
///
/// A canonical with a path wins; otherwise non-default languages are nested under their code.
/// `.` and `..` segments are dropped so a page can never land outside the output directory.
pub fn build_output_path(canonical: &str, lang: &str, slug: &str, languages: &LanguageConfig) -> String {
    let mut segments = Vec::new();

    match canonical_to_relative_path(canonical) {
        Some(relative) => segments.extend(path_segments(&relative)),
        None => {
            if !lang.is_empty() && !languages.is_default(lang) {
                segments.extend(path_segments(lang));
            }
            segments.extend(path_segments(slug));
        }
    }

    segments.push("index.html".to_string());
    segments.join("/")
}

fn path_segments(path: &str) -> impl Iterator<Item = String> + '_ {
    path.split('/')
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .map(str::to_string)
}

/// Human readable size: `0B`, `512B`, `1.50KB`, `2.00MB`.
pub fn format_bytes(bytes: usize) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }

    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{}{}", bytes, UNITS[0])
    } else {
        format!("{:.2}{}", value, UNITS[unit])
    }
}

/// `/`-separated path without a leading `./`.
pub fn normalize_log_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    match path.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use tempfile::tempdir;

    fn languages() -> LanguageConfig {
        LanguageConfig {
            default: "en".to_string(),
            supported: vec!["en".to_string(), "tr".to_string()],
            languages: IndexMap::new(),
        }
    }

    fn page(output_path: &str, html: &str) -> RenderedPage {
        RenderedPage {
            html: html.to_string(),
            output_path: output_path.to_string(),
            source_path: "src/content/x.md".to_string(),
            lang: "en".to_string(),
            template: "page".to_string(),
            layout: "default".to_string(),
            meta: WriteMeta::new("BUILD_PAGE", "content", "src/content/x.md", "en"),
        }
    }

    #[test]
    fn output_paths() {
        let langs = languages();

        assert_eq!(build_output_path("", "en", "about", &langs), "about/index.html");
        assert_eq!(build_output_path("", "tr", "/hakkinda/", &langs), "tr/hakkinda/index.html");
        assert_eq!(build_output_path("", "en", "", &langs), "index.html");
        assert_eq!(build_output_path("", "tr", "", &langs), "tr/index.html");
        assert_eq!(
            build_output_path("https://example.com/docs/intro/", "tr", "x", &langs),
            "docs/intro/index.html"
        );
        assert_eq!(build_output_path("~/custom", "en", "x", &langs), "custom/index.html");
    }

    #[test]
    fn output_paths_stay_inside_the_output_dir() {
        let langs = languages();

        assert_eq!(build_output_path("~/../../x", "en", "y", &langs), "x/index.html");
        assert_eq!(build_output_path("", "tr", "../../etc", &langs), "tr/etc/index.html");
        assert_eq!(build_output_path("", "en", "a/./b", &langs), "a/b/index.html");
        assert_eq!(build_output_path("~/..", "en", "y", &langs), "index.html");
    }

    #[test]
    fn byte_formatting() {
        assert_eq!(format_bytes(0), "0B");
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(1536), "1.50KB");
        assert_eq!(format_bytes(2 * 1024 * 1024), "2.00MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024 * 1024), "5120.00GB");
    }

    #[test]
    fn log_paths() {
        assert_eq!(normalize_log_path("./dist/index.html"), "dist/index.html");
        assert_eq!(normalize_log_path("dist\\a\\index.html"), "dist/a/index.html");
    }

    #[test]
    fn registry_skips_pages_without_output() {
        let mut registry = PageRegistry::new();
        registry.add(page("", "x"));
        registry.add(page("a/index.html", "a"));

        assert_eq!(registry.count(), 1);
        assert!(registry.contains_output("a/index.html"));
        assert!(!registry.contains_output("b/index.html"));
    }

    #[tokio::test]
    async fn flush_writes_every_page() {
        let temp = tempdir().unwrap();
        let mut registry = PageRegistry::new();
        registry.add(page("tr/index.html", "<p>tr</p>"));
        registry.add(page("index.html", "<p>en</p>"));

        let written = registry.flush(temp.path()).await.unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("tr/index.html")).unwrap(),
            "<p>tr</p>"
        );
        assert!(temp.path().join("index.html").exists());
    }
}
