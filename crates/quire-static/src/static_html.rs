//! Post-processing for HTML output and hand-written HTML files copied from `src/`.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::Utc;
use regex::{Captures, Regex};

use crate::i18n::LanguageConfig;
use crate::meta::normalize_alternate_locales;
use crate::url::UrlResolver;

/// Short hex token appended to asset URLs so browsers refetch them after a build.
pub fn version_token() -> String {
    let micros = Utc::now().timestamp_micros() as u64;
    format!("{:012x}", micros & 0xffff_ffff_ffff)
}

/// Cache-bust `/output.css` and `/output.js` and turn `~/` links into root-relative ones.
pub fn transform_html(html: &str, version_token: &str) -> String {
    static CSS_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"/output\.css(\?v=[^"']+)?"#).expect("Invalid stylesheet regex")
    });
    static JS_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"/output\.js(\?v=[^"']+)?"#).expect("Invalid script regex")
    });
    static HOME_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"\b(src|href)="~/"#).expect("Invalid link regex"));

    let css = format!("/output.css?v={version_token}");
    let js = format!("/output.js?v={version_token}");

    let output = CSS_RE.replace_all(html, regex::NoExpand(&css));
    let output = JS_RE.replace_all(&output, regex::NoExpand(&js));
    HOME_RE.replace_all(&output, "$1=\"/").into_owned()
}

/// Point a shared page at `lang`: html lang, meta language, canonical, og/twitter URLs and
/// og locales. Languages without build settings are left untouched.
pub fn apply_language_metadata(html: &str, lang: &str, urls: &UrlResolver<'_>) -> String {
    static HTML_LANG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(<html\b[^>]*\slang=")(.*?)""#).expect("Invalid html lang regex")
    });
    static META_LANGUAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(<meta name="language" content=")(.*?)""#).expect("Invalid meta language regex")
    });
    static CANONICAL_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(<link rel="canonical" href=")(.*?)(" data-canonical)"#)
            .expect("Invalid canonical regex")
    });
    static OG_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(<meta property="og:url" content=")(.*?)(" data-og-url)"#)
            .expect("Invalid og:url regex")
    });
    static TWITTER_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(<meta name="twitter:url" content=")(.*?)(" data-twitter-url)"#)
            .expect("Invalid twitter:url regex")
    });
    static OG_LOCALE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(<meta property="og:locale" content=")(.*?)(" data-og-locale)"#)
            .expect("Invalid og:locale regex")
    });

    let languages = urls.languages();
    if languages.build(lang).is_none() {
        return html.to_string();
    }

    let canonical = urls.language_base_url(lang);
    let og_locale = languages
        .og_locale(lang)
        .unwrap_or_else(|| languages.culture(lang));

    let set = |re: &Regex, html: &str, value: &str| -> String {
        re.replacen(html, 1, |caps: &Captures| {
            let tail = caps.get(3).map(|m| m.as_str()).unwrap_or("\"");
            format!("{}{}{}", &caps[1], value, tail)
        })
        .into_owned()
    };

    let output = set(&HTML_LANG_RE, html, &languages.lang_attr(lang));
    let output = set(&META_LANGUAGE_RE, &output, &languages.meta_language(lang));
    let output = set(&CANONICAL_RE, &output, &canonical);
    let output = set(&OG_URL_RE, &output, &canonical);
    let output = set(&TWITTER_URL_RE, &output, &canonical);
    let output = set(&OG_LOCALE_RE, &output, &og_locale);

    let alt_locales = normalize_alternate_locales(languages.alt_locales(lang), &[]);
    inject_alternate_locale_meta(&output, &alt_locales)
}

/// Replace every `og:locale:alternate` tag with one tag per locale, placed after `og:locale`.
pub fn inject_alternate_locale_meta(html: &str, locales: &[String]) -> String {
    static CLEANUP_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r#"[^\S\r\n]*<meta property="og:locale:alternate" content=".*?" data-og-locale-alt\s*/?>\s*"#,
        )
        .expect("Invalid alternate locale regex")
    });
    static INDENT_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r#"([^\S\r\n]*)<meta property="og:locale:alternate" content=".*?" data-og-locale-alt\s*/?>"#,
        )
        .expect("Invalid alternate locale indent regex")
    });
    static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(<meta property="og:locale" content=".*?" data-og-locale\s*/?>)"#)
            .expect("Invalid og:locale anchor regex")
    });

    let indent = INDENT_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "  ".to_string());
    let output = CLEANUP_RE.replace_all(html, "").into_owned();

    if locales.is_empty() {
        return output;
    }

    let tags = locales
        .iter()
        .map(|locale| {
            format!(r#"{indent}<meta property="og:locale:alternate" content="{locale}" data-og-locale-alt />"#)
        })
        .collect::<Vec<_>>()
        .join("\n");

    if ANCHOR_RE.is_match(&output) {
        return ANCHOR_RE
            .replacen(&output, 1, |caps: &Captures| format!("{}\n{}", &caps[1], tags))
            .into_owned();
    }

    format!("{tags}\n{output}")
}

/// Top-level `*.html` files in `src_dir`, sorted by name.
pub fn static_html_files(src_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !src_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(src_dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("html") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Output path of the copy of `index.html` for `lang`.
pub fn localized_index_path(lang: &str, languages: &LanguageConfig) -> String {
    if languages.is_default(lang) {
        "index.html".to_string()
    } else {
        format!("{lang}/index.html")
    }
}

/// Legacy `<slug>.html` paths a generated page shadows.
pub fn shadowed_paths(lang: &str, slug: &str, languages: &LanguageConfig) -> Vec<String> {
    let slug = slug.trim_matches('/');
    if slug.is_empty() {
        return Vec::new();
    }

    let file = if slug.ends_with(".html") {
        slug.to_string()
    } else {
        format!("{slug}.html")
    };

    let mut paths = vec![file.clone()];
    if !lang.is_empty() && !languages.is_default(lang) {
        paths.push(format!("{lang}/{file}"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LanguageBuild;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn languages() -> LanguageConfig {
        let mut languages = IndexMap::new();
        languages.insert(
            "tr".to_string(),
            LanguageBuild {
                canonical: Some("https://example.com/tr".to_string()),
                lang_attr: Some("tr-TR".to_string()),
                og_locale: Some("tr_TR".to_string()),
                alt_locale: vec!["en_US".to_string(), "en_US".to_string()],
                ..Default::default()
            },
        );
        LanguageConfig {
            default: "en".to_string(),
            supported: vec!["en".to_string(), "tr".to_string()],
            languages,
        }
    }

    const PAGE: &str = r#"<html class="x" lang="en">
<head>
  <meta name="language" content="en">
  <link rel="canonical" href="https://example.com/" data-canonical>
  <meta property="og:url" content="https://example.com/" data-og-url>
  <meta name="twitter:url" content="https://example.com/" data-twitter-url>
  <meta property="og:locale" content="en_US" data-og-locale>
  <meta property="og:locale:alternate" content="tr_TR" data-og-locale-alt />
</head>"#;

    #[test]
    fn cache_busts_assets_and_rewrites_home_links() {
        let html = r#"<link href="/output.css?v=old"><script src="/output.js"></script><a href="~/about/">x</a>"#;

        let out = transform_html(html, "abc");

        assert_eq!(
            out,
            r#"<link href="/output.css?v=abc"><script src="/output.js?v=abc"></script><a href="/about/">x</a>"#
        );
    }

    #[test]
    fn applies_language_metadata() {
        let langs = languages();
        let urls = UrlResolver::new("https://example.com", &langs);

        let out = apply_language_metadata(PAGE, "tr", &urls);

        assert!(out.contains(r#"<html class="x" lang="tr-TR">"#));
        assert!(out.contains(r#"<meta name="language" content="tr-TR">"#));
        assert!(out.contains(r#"href="https://example.com/tr/" data-canonical"#));
        assert!(out.contains(r#"content="https://example.com/tr/" data-og-url"#));
        assert!(out.contains(r#"content="https://example.com/tr/" data-twitter-url"#));
        assert!(out.contains(r#"content="tr_TR" data-og-locale>"#));
        assert_eq!(out.matches("og:locale:alternate").count(), 1);
        assert!(out.contains(r#"<meta property="og:locale:alternate" content="en_US" data-og-locale-alt />"#));
    }

    #[test]
    fn language_without_settings_is_untouched() {
        let langs = languages();
        let urls = UrlResolver::new("https://example.com", &langs);

        assert_eq!(apply_language_metadata(PAGE, "en", &urls), PAGE);
    }

    #[test]
    fn alternate_locales_follow_anchor() {
        let out = inject_alternate_locale_meta(PAGE, &["de_DE".to_string(), "fr_FR".to_string()]);

        assert!(out.contains(
            "data-og-locale>\n  <meta property=\"og:locale:alternate\" content=\"de_DE\" data-og-locale-alt />\n  <meta property=\"og:locale:alternate\" content=\"fr_FR\" data-og-locale-alt />"
        ));
        assert!(!out.contains("tr_TR\" data-og-locale-alt"));

        let removed = inject_alternate_locale_meta(PAGE, &[]);
        assert!(!removed.contains("og:locale:alternate"));

        let prepended = inject_alternate_locale_meta("<p></p>", &["de_DE".to_string()]);
        assert!(prepended.starts_with("  <meta property=\"og:locale:alternate\""));
    }

    #[test]
    fn shadowing_and_index_paths() {
        let langs = languages();

        assert_eq!(shadowed_paths("tr", "/hakkinda/", &langs), vec!["hakkinda.html", "tr/hakkinda.html"]);
        assert_eq!(shadowed_paths("en", "about", &langs), vec!["about.html"]);
        assert!(shadowed_paths("en", "", &langs).is_empty());
        assert_eq!(localized_index_path("en", &langs), "index.html");
        assert_eq!(localized_index_path("tr", &langs), "tr/index.html");
    }

    #[test]
    fn finds_top_level_html() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("index.html"), "").unwrap();
        std::fs::write(temp.path().join("404.html"), "").unwrap();
        std::fs::write(temp.path().join("notes.md"), "").unwrap();
        std::fs::create_dir_all(temp.path().join("nested")).unwrap();
        std::fs::write(temp.path().join("nested/skip.html"), "").unwrap();

        let files = static_html_files(temp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["404.html", "index.html"]);
        assert_eq!(version_token().len(), 12);
    }
}
