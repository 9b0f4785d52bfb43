//! Canonical, content and alternate-language URL resolution.

use indexmap::IndexMap;
use serde::Serialize;

use quire_content::{Alternate, ContentHeader};

use crate::i18n::LanguageConfig;

/// Per-language counterpart URLs of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlternateUrlMap {
    /// Root URL of every supported language.
    pub base: IndexMap<String, String>,

    /// Page URL per language.
    #[serde(flatten)]
    pub urls: IndexMap<String, String>,

    /// Always the page's own canonical URL.
    pub default: String,
}

impl AlternateUrlMap {
    /// URL for `lang`, falling back to `default`.
    pub fn url(&self, lang: &str) -> &str {
        self.urls.get(lang).map(String::as_str).unwrap_or(&self.default)
    }
}

/// One hreflang entry for the language switcher and `<link rel="alternate">`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternateLink {
    pub lang: String,
    pub hreflang: String,
    pub url: String,
    pub label: String,
    pub base_url: String,
}

/// URL builder over the site base URL and language settings.
#[derive(Debug, Clone, Copy)]
pub struct UrlResolver<'a> {
    base_url: &'a str,
    languages: &'a LanguageConfig,
}

impl<'a> UrlResolver<'a> {
    pub fn new(base_url: &'a str, languages: &'a LanguageConfig) -> Self {
        Self {
            base_url,
            languages,
        }
    }

    pub fn languages(&self) -> &'a LanguageConfig {
        self.languages
    }

    /// Join a site path against the base URL. Absolute URLs pass through.
    pub fn resolve_url(&self, value: &str) -> String {
        let value = value.trim();
        if is_absolute_url(value) {
            return value.to_string();
        }

        let path = value.strip_prefix("~/").unwrap_or(value);
        format!(
            "{}/{}",
            self.base_url.trim().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Site-relative home of `lang`: `/` for the default language, `/<lang>/` otherwise.
    pub fn language_home_path(&self, lang: &str) -> String {
        if lang.is_empty() || self.languages.is_default(lang) {
            "/".to_string()
        } else {
            collapse_slashes(&format!("/{lang}/"))
        }
    }

    /// Root URL of `lang`, always with a trailing slash.
    pub fn language_base_url(&self, lang: &str) -> String {
        match self.languages.canonical(lang) {
            Some(canonical) => ensure_trailing_slash(canonical),
            None => self.resolve_url(&self.language_home_path(lang)),
        }
    }

    /// Absolute canonical URL derived from language and slug.
    pub fn default_canonical(&self, lang: &str, slug: &str) -> String {
        let slug = slug.trim_matches('/');
        let base = self.language_base_url(lang);
        if slug.is_empty() {
            base
        } else {
            format!("{base}{slug}/")
        }
    }

    /// Site-relative directory URL of a page.
    ///
    /// A non-blank `canonical` wins; otherwise the URL is derived from `lang` and `slug`.
    /// The result always starts and ends with `/`.
    pub fn build_content_url(&self, canonical: Option<&str>, lang: &str, slug: &str) -> String {
        let lang = if lang.is_empty() {
            self.languages.default.as_str()
        } else {
            lang
        };

        if let Some(canonical) = canonical.map(str::trim).filter(|c| !c.is_empty()) {
            return match canonical_to_relative_path(canonical) {
                Some(relative) => directory_path(&relative),
                None => "/".to_string(),
            };
        }

        if let Some(relative) = canonical_to_relative_path(&self.default_canonical(lang, slug)) {
            return directory_path(&relative);
        }

        let slug = slug.trim_matches('/');
        if self.languages.is_default(lang) {
            directory_path(slug)
        } else {
            directory_path(&format!("{lang}/{slug}"))
        }
    }

    /// Explicit per-language overrides from the `alternate` front-matter field.
    pub fn alternate_overrides(&self, alternate: Alternate<'_>, lang: &str) -> IndexMap<String, String> {
        let mut overrides = IndexMap::new();

        match alternate {
            Alternate::None => {}
            Alternate::Single(url) => {
                if let Some(target) = self.shorthand_target(lang) {
                    overrides.insert(target, self.resolve_url(url));
                }
            }
            Alternate::PerLanguage(map) => {
                for (code, value) in map {
                    if !self.languages.is_supported(code) {
                        continue;
                    }
                    if let Some(url) = value.as_str().map(str::trim).filter(|u| !u.is_empty()) {
                        overrides.insert(code.clone(), self.resolve_url(url));
                    }
                }
            }
        }

        overrides
    }

    /// Language a shorthand `alternate` string points at.
    ///
    /// With a single other language that language is the target. With several, a page in a
    /// non-default language targets the default language and a default-language page has no
    /// target.
    fn shorthand_target(&self, lang: &str) -> Option<String> {
        let others: Vec<&str> = self.languages.others(lang).collect();
        match others.as_slice() {
            [] => None,
            [only] => Some(only.to_string()),
            _ if !self.languages.is_default(lang) => Some(self.languages.default.clone()),
            _ => None,
        }
    }

    /// Alternate URL map for a page in `lang` whose canonical URL is `canonical_url`.
    pub fn build_alternate_map(
        &self,
        header: &ContentHeader,
        lang: &str,
        canonical_url: &str,
    ) -> AlternateUrlMap {
        let overrides = self.alternate_overrides(header.alternate(), lang);
        self.alternate_map_with(&overrides, lang, canonical_url)
    }

    /// Alternate URL map using already-resolved overrides.
    pub fn alternate_map_with(
        &self,
        overrides: &IndexMap<String, String>,
        lang: &str,
        canonical_url: &str,
    ) -> AlternateUrlMap {
        let mut map = AlternateUrlMap {
            default: canonical_url.to_string(),
            ..Default::default()
        };

        for code in &self.languages.supported {
            map.base.insert(code.clone(), self.language_base_url(code));

            let url = if code == lang {
                canonical_url.to_string()
            } else if let Some(url) = overrides.get(code) {
                url.clone()
            } else if let Some(canonical) = self.languages.canonical(code) {
                canonical.to_string()
            } else {
                self.resolve_url(&self.language_home_path(code))
            };
            map.urls.insert(code.clone(), url);
        }

        map
    }

    /// One hreflang entry per supported language.
    pub fn alternate_links(&self, map: &AlternateUrlMap) -> Vec<AlternateLink> {
        let default_base = map
            .base
            .get(&self.languages.default)
            .cloned()
            .unwrap_or_default();

        self.languages
            .supported
            .iter()
            .map(|code| AlternateLink {
                lang: code.clone(),
                hreflang: code.clone(),
                url: map.url(code).to_string(),
                label: self.languages.label(code),
                base_url: map.base.get(code).cloned().unwrap_or_else(|| default_base.clone()),
            })
            .collect()
    }
}

fn is_absolute_url(value: &str) -> bool {
    let lower = value.get(..8).unwrap_or(value).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Strip `~/` or `scheme://host` and surrounding slashes. Empty results are `None`.
pub fn canonical_to_relative_path(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }

    let path = if let Some(rest) = value.strip_prefix("~/") {
        rest
    } else if is_absolute_url(value) {
        let after_scheme = &value[value.find("://").map(|i| i + 3).unwrap_or(0)..];
        after_scheme.find('/').map(|i| &after_scheme[i..]).unwrap_or("")
    } else {
        value
    };

    let path = path.trim().trim_matches('/');
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

/// Append `/` unless already present.
pub fn ensure_trailing_slash(value: &str) -> String {
    if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    }
}

fn directory_path(relative: &str) -> String {
    ensure_trailing_slash(&collapse_slashes(&format!("/{relative}")))
}

fn collapse_slashes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}
