//! Page metadata: titles, canonical URLs, Open Graph, Twitter cards and JSON-LD.

use std::collections::HashSet;

use chrono::{Datelike, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Map, Value};

use quire_content::format::normalize_string_array;
use quire_content::{parse_date, ContentHeader};

use crate::config::SiteConfig;
use crate::i18n::Translator;
use crate::url::{AlternateLink, AlternateUrlMap, UrlResolver};

const FALLBACK_TEXT: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub image: String,
    pub locale: String,
    pub alt_locale: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwitterCard {
    pub card: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub url: String,
}

/// Everything the layout needs for `<head>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub robots: String,
    pub canonical: String,
    pub alternates: AlternateUrlMap,
    pub alternate_links: Vec<AlternateLink>,
    pub og: OpenGraph,
    pub twitter: TwitterCard,
    /// JSON-LD, already escaped for an inline `<script>`
    pub structured_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteLanguages {
    pub supported: Vec<String>,
    pub default: String,
    pub canonical_url: IndexMap<String, String>,
    pub cultures: IndexMap<String, String>,
}

/// Site-wide values exposed to every template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub owner: String,
    pub role: String,
    pub quote: String,
    pub home: String,
    pub url: String,
    pub current_language: String,
    pub current_culture: String,
    pub current_canonical: String,
    pub current_lang_label: String,
    pub theme_color: String,
    pub year: i32,
    pub languages: SiteLanguages,
    pub languages_csv: String,
    pub default_language: String,
    pub page_size: usize,
    pub features: IndexMap<String, bool>,
}

/// Builds [`PageMeta`] and [`SiteData`].
#[derive(Clone, Copy)]
pub struct MetaBuilder<'a> {
    site: &'a SiteConfig,
    urls: UrlResolver<'a>,
    translator: &'a dyn Translator,
}

impl<'a> MetaBuilder<'a> {
    pub fn new(site: &'a SiteConfig, urls: UrlResolver<'a>, translator: &'a dyn Translator) -> Self {
        Self {
            site,
            urls,
            translator,
        }
    }

    pub fn site_data(&self, lang: &str) -> SiteData {
        let languages = self.urls.languages();
        let identity = &self.site.identity;
        let t = |key: &str| self.translator.t(lang, key, FALLBACK_TEXT);

        SiteData {
            title: t("site.title"),
            description: self.translator.t(lang, "site.description", ""),
            author: identity.author.clone(),
            owner: t("site.owner"),
            role: t("site.role"),
            quote: t("site.quote"),
            home: self.urls.language_home_path(lang),
            url: identity.url.clone(),
            current_language: lang.to_string(),
            current_culture: self.translator.culture(lang),
            current_canonical: languages
                .canonical(lang)
                .map(str::to_string)
                .unwrap_or_else(|| self.urls.resolve_url(&self.urls.language_home_path(lang))),
            current_lang_label: languages.label(lang),
            theme_color: identity.theme_color.clone(),
            year: Utc::now().year(),
            languages: SiteLanguages {
                supported: languages.supported.clone(),
                default: languages.default.clone(),
                canonical_url: languages
                    .supported
                    .iter()
                    .filter_map(|code| {
                        languages
                            .canonical(code)
                            .map(|url| (code.clone(), url.to_string()))
                    })
                    .collect(),
                cultures: languages
                    .supported
                    .iter()
                    .map(|code| (code.clone(), self.translator.culture(code)))
                    .collect(),
            },
            languages_csv: languages.supported.join(","),
            default_language: languages.default.clone(),
            page_size: self.site.pagination.effective_page_size(),
            features: self.site.features.clone(),
        }
    }

    /// Metadata for a page in `lang` served at `slug`.
    pub fn page_meta(&self, header: &ContentHeader, lang: &str, slug: &str) -> PageMeta {
        let front = header.raw();
        let canonical = match front.non_empty("canonical") {
            Some(canonical) => self.urls.resolve_url(canonical),
            None => self.urls.default_canonical(lang, slug),
        };

        let title = page_title(header);
        let description = header.description().to_string();
        let cover = match header.cover().trim() {
            "" => self.site.seo.default_image.as_str(),
            cover => cover,
        };
        let image = self.urls.resolve_url(cover);

        let alternates = self.urls.build_alternate_map(header, lang, &canonical);
        let alternate_links = self.urls.alternate_links(&alternates);

        let is_article = is_article(header);
        let structured = if is_article {
            self.article_data(header, lang, &canonical, &image)
        } else if header.template().to_lowercase() == "home" {
            self.home_data(lang, &canonical)
        } else {
            self.web_page_data(header, lang, &canonical)
        };

        let (locale, alt_locale) = self.og_locales(header, lang);
        let text_or = |key: &str, fallback: &str| {
            front.non_empty(key).unwrap_or(fallback).to_string()
        };

        PageMeta {
            robots: text_or("robots", "index,follow"),
            og: OpenGraph {
                title: text_or("ogTitle", &title),
                description: description.clone(),
                kind: text_or("ogType", if is_article { "article" } else { "website" }),
                url: canonical.clone(),
                image: image.clone(),
                locale: text_or("ogLocale", &locale),
                alt_locale,
            },
            twitter: TwitterCard {
                card: text_or("twitterCard", "summary_large_image"),
                title: text_or("twitterTitle", &title),
                description: description.clone(),
                image,
                url: canonical.clone(),
            },
            structured_data: serialize_for_inline_script(&structured),
            title,
            description,
            canonical,
            alternates,
            alternate_links,
        }
    }

    fn og_locales(&self, header: &ContentHeader, lang: &str) -> (String, Vec<String>) {
        let languages = self.urls.languages();
        let locale = languages
            .og_locale(lang)
            .unwrap_or_else(|| self.translator.culture(lang));

        let configured = languages.alt_locales(lang);
        let fallback: Vec<String> = if configured.is_empty() {
            languages
                .others(lang)
                .map(|code| self.translator.culture(code))
                .collect()
        } else {
            configured.to_vec()
        };

        let declared = normalize_string_array(header.raw().get("ogAltLocale"));
        (locale, normalize_alternate_locales(&declared, &fallback))
    }

    fn publisher(&self) -> Value {
        json!({
            "@type": "Person",
            "name": self.site.identity.author,
            "url": self.site.identity.url,
        })
    }

    fn article_data(&self, header: &ContentHeader, lang: &str, canonical: &str, image: &str) -> Value {
        let mut data = json!({
            "@context": "https://schema.org",
            "@type": "Article",
            "headline": header.title(),
            "description": header.description(),
            "author": self.publisher(),
            "publisher": self.publisher(),
            "inLanguage": lang,
            "mainEntityOfPage": {"@type": "WebPage", "@id": canonical},
        });

        let Value::Object(map) = &mut data else {
            return data;
        };
        if let Some(published) = iso_timestamp(&header.date()) {
            map.insert("datePublished".into(), published.into());
        }
        if let Some(modified) = iso_timestamp(&header.updated()) {
            map.insert("dateModified".into(), modified.into());
        }
        if !image.is_empty() {
            map.insert("image".into(), json!([image]));
        }

        let category = header.raw().str("category").unwrap_or("").trim().to_lowercase();
        if !category.is_empty() {
            let section = self
                .translator
                .t(lang, &format!("categories.{category}"), &category);
            map.insert("articleSection".into(), section.into());
        }
        insert_keywords(map, header);

        data
    }

    fn home_data(&self, lang: &str, canonical: &str) -> Value {
        let mut publisher = self.publisher();
        if let Value::Object(map) = &mut publisher {
            map.insert("sameAs".into(), json!(self.site.identity.social_profiles()));
        }

        json!({
            "@context": "https://schema.org",
            "@type": "WebSite",
            "name": self.translator.t(lang, "site.title", FALLBACK_TEXT),
            "url": canonical,
            "inLanguage": lang,
            "description": self.translator.t(lang, "site.description", ""),
            "publisher": publisher,
        })
    }

    fn web_page_data(&self, header: &ContentHeader, lang: &str, canonical: &str) -> Value {
        let identity = &self.site.identity;
        let is_collection = header.is_collection_page();

        let kind = if header.is_about_page() {
            "AboutPage"
        } else if header.is_contact_page() {
            "ContactPage"
        } else if is_collection {
            "CollectionPage"
        } else {
            "WebPage"
        };

        let description = match header.description() {
            "" if is_collection => self.collection_description(header, lang),
            description => description.to_string(),
        };

        let mut map = Map::new();
        map.insert("@context".into(), "https://schema.org".into());
        map.insert("@type".into(), kind.into());
        map.insert("headline".into(), header.title().into());
        map.insert("description".into(), description.into());
        map.insert("publisher".into(), self.publisher());
        map.insert("inLanguage".into(), lang.into());
        map.insert(
            "mainEntityOfPage".into(),
            json!({"@type": "WebPage", "@id": canonical}),
        );

        if header.is_policy() {
            map.insert(
                "about".into(),
                json!({"@type": "Thing", "name": "Website Legal Information"}),
            );
        }
        if header.is_about_page() {
            map.insert(
                "about".into(),
                json!({
                    "@type": "Person",
                    "name": identity.author,
                    "url": identity.url,
                    "sameAs": identity.social_profiles(),
                }),
            );
        }
        if header.is_contact_page() {
            map.insert(
                "about".into(),
                json!({"@type": "Person", "name": identity.author, "url": identity.url}),
            );
            map.insert(
                "contactPoint".into(),
                json!({
                    "@type": "ContactPoint",
                    "contactType": "general inquiry",
                    "email": identity.email,
                }),
            );
        }
        insert_keywords(&mut map, header);

        Value::Object(map)
    }

    fn collection_description(&self, header: &ContentHeader, lang: &str) -> String {
        let group = match header.collection_type() {
            "tag" => "tags",
            "category" => "category",
            "series" => "series",
            _ => return String::new(),
        };

        self.translator
            .t(lang, &format!("seo.collections.{group}.description"), "")
            .replacen("{{label}}", header.list_key(), 1)
    }
}

fn insert_keywords(map: &mut Map<String, Value>, header: &ContentHeader) {
    let keywords: Vec<String> = header
        .keywords()
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    if !keywords.is_empty() {
        map.insert("keywords".into(), json!(keywords));
    }
}

/// `metaTitle`, else `title`, else `Untitled`.
pub fn page_title(header: &ContentHeader) -> String {
    let front = header.raw();
    front
        .non_empty("metaTitle")
        .or_else(|| front.non_empty("title"))
        .unwrap_or("Untitled")
        .to_string()
}

/// Posts and article-like page types.
pub fn is_article(header: &ContentHeader) -> bool {
    header.template().to_lowercase() == "post"
        || matches!(
            header.page_type().to_lowercase().as_str(),
            "article" | "guide" | "post"
        )
}

fn iso_timestamp(text: &str) -> Option<String> {
    parse_date(text).map(|date| date.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Trimmed, deduplicated locales from `declared`, or from `fallback` when none are declared.
pub fn normalize_alternate_locales(declared: &[String], fallback: &[String]) -> Vec<String> {
    let source = if declared.is_empty() { fallback } else { declared };
    let mut seen = HashSet::new();

    source
        .iter()
        .map(|locale| locale.trim())
        .filter(|locale| !locale.is_empty() && seen.insert(*locale))
        .map(str::to_string)
        .collect()
}

/// JSON safe to embed inside an inline `<script>` element.
pub fn serialize_for_inline_script<T: Serialize + ?Sized>(value: &T) -> String {
    let json = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
    let mut out = String::with_capacity(json.len());

    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{I18n, LanguageBuild, LanguageConfig};
    use pretty_assertions::assert_eq;
    use quire_content::FrontMatter;

    fn header(value: Value) -> ContentHeader {
        match value {
            Value::Object(map) => ContentHeader::new(FrontMatter::from_map(map)),
            _ => panic!("test front-matter must be an object"),
        }
    }

    fn languages() -> LanguageConfig {
        let mut languages = IndexMap::new();
        languages.insert(
            "en".to_string(),
            LanguageBuild {
                og_locale: Some("en_US".to_string()),
                culture: Some("en-US".to_string()),
                ..Default::default()
            },
        );
        languages.insert(
            "tr".to_string(),
            LanguageBuild {
                culture: Some("tr-TR".to_string()),
                ..Default::default()
            },
        );
        LanguageConfig {
            default: "en".to_string(),
            supported: vec!["en".to_string(), "tr".to_string()],
            languages,
        }
    }

    fn site() -> SiteConfig {
        let mut site = SiteConfig::default();
        site.identity.author = "Ada".to_string();
        site.identity.url = "https://example.com".to_string();
        site.identity.email = "ada@example.com".to_string();
        site.identity
            .social
            .insert("github".to_string(), "https://github.com/ada".to_string());
        site.seo.default_image = "/img/default.png".to_string();
        site
    }

    fn structured(meta: &PageMeta) -> Value {
        serde_json::from_str(&meta.structured_data).unwrap()
    }

    #[test]
    fn article_meta() {
        let langs = languages();
        let site = site();
        let i18n = I18n::new(langs.clone())
            .with_dictionary("en", json!({"categories": {"notes": "Notes"}}));
        let meta = MetaBuilder::new(&site, UrlResolver::new("https://example.com", &langs), &i18n);

        let page = meta.page_meta(
            &header(json!({
                "title": "Hello",
                "template": "post",
                "description": "A post",
                "category": "Notes",
                "keywords": ["rust", " "],
                "date": "2024-06-01",
            })),
            "en",
            "hello",
        );

        assert_eq!(page.title, "Hello");
        assert_eq!(page.canonical, "https://example.com/hello/");
        assert_eq!(page.robots, "index,follow");
        assert_eq!(page.og.kind, "article");
        assert_eq!(page.og.image, "https://example.com/img/default.png");
        assert_eq!(page.og.locale, "en_US");
        assert_eq!(page.og.alt_locale, vec!["tr-TR"]);
        assert_eq!(page.twitter.card, "summary_large_image");
        assert_eq!(page.alternates.url("tr"), "https://example.com/tr/");

        let data = structured(&page);
        assert_eq!(data["@type"], "Article");
        assert_eq!(data["datePublished"], "2024-06-01T00:00:00.000Z");
        assert_eq!(data["articleSection"], "Notes");
        assert_eq!(data["keywords"], json!(["rust"]));
        assert_eq!(data["author"]["name"], "Ada");
        assert!(data.get("dateModified").is_none());
    }

    #[test]
    fn explicit_canonical_and_overrides() {
        let langs = languages();
        let site = site();
        let i18n = I18n::new(langs.clone());
        let meta = MetaBuilder::new(&site, UrlResolver::new("https://example.com", &langs), &i18n);

        let page = meta.page_meta(
            &header(json!({
                "metaTitle": "Meta",
                "title": "Plain",
                "canonical": "~/custom/",
                "robots": "noindex",
                "ogAltLocale": "de_DE, de_DE, fr_FR",
            })),
            "tr",
            "ignored",
        );

        assert_eq!(page.title, "Meta");
        assert_eq!(page.canonical, "https://example.com/custom/");
        assert_eq!(page.robots, "noindex");
        assert_eq!(page.og.kind, "website");
        assert_eq!(page.og.locale, "tr-TR");
        assert_eq!(page.og.alt_locale, vec!["de_DE", "fr_FR"]);
        assert_eq!(structured(&page)["@type"], "WebPage");
    }

    #[test]
    fn page_kinds() {
        let langs = languages();
        let site = site();
        let i18n = I18n::new(langs.clone()).with_dictionary(
            "en",
            json!({"site": {"title": "Quire"}, "seo": {"collections": {"tags": {"description": "Posts tagged {{label}}"}}}}),
        );
        let meta = MetaBuilder::new(&site, UrlResolver::new("https://example.com", &langs), &i18n);
        let kind = |front: Value| structured(&meta.page_meta(&header(front), "en", "x"));

        let home = kind(json!({"template": "home"}));
        assert_eq!(home["@type"], "WebSite");
        assert_eq!(home["name"], "Quire");
        assert_eq!(home["publisher"]["sameAs"], json!(["https://github.com/ada"]));

        let about = kind(json!({"type": "about"}));
        assert_eq!(about["@type"], "AboutPage");
        assert_eq!(about["about"]["sameAs"], json!(["https://github.com/ada"]));

        let contact = kind(json!({"type": "contact"}));
        assert_eq!(contact["@type"], "ContactPage");
        assert_eq!(contact["contactPoint"]["email"], "ada@example.com");

        let tag = kind(json!({"collectionType": "tag", "listKey": "rust"}));
        assert_eq!(tag["@type"], "CollectionPage");
        assert_eq!(tag["description"], "Posts tagged rust");

        let policy = kind(json!({"category": "policy"}));
        assert_eq!(policy["about"]["name"], "Website Legal Information");

        assert_eq!(kind(json!({"type": "guide"}))["@type"], "Article");
        assert_eq!(page_title(&header(json!({}))), "Untitled");
    }

    #[test]
    fn site_data_per_language() {
        let langs = languages();
        let site = site();
        let i18n = I18n::new(langs.clone()).with_dictionary("tr", json!({"site": {"title": "Kitap"}}));
        let meta = MetaBuilder::new(&site, UrlResolver::new("https://example.com", &langs), &i18n);

        let data = meta.site_data("tr");

        assert_eq!(data.title, "Kitap");
        assert_eq!(data.owner, "-");
        assert_eq!(data.home, "/tr/");
        assert_eq!(data.current_canonical, "https://example.com/tr/");
        assert_eq!(data.current_culture, "tr-TR");
        assert_eq!(data.languages_csv, "en,tr");
        assert_eq!(data.page_size, 5);
        assert_eq!(data.languages.cultures["en"], "en-US");
    }

    #[test]
    fn inline_script_escaping() {
        let value = json!({"html": "</script><b>&", "sep": "a\u{2028}b\u{2029}"});

        let out = serialize_for_inline_script(&value);

        assert!(!out.contains('<'));
        assert!(!out.contains('>'));
        assert!(!out.contains('&'));
        assert!(out.contains("\\u003c/script\\u003e"));
        assert!(out.contains("\\u2028"));
        let back: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn alternate_locale_normalization() {
        let declared = vec![" a ".to_string(), "a".to_string(), "".to_string()];
        let fallback = vec!["z".to_string()];

        assert_eq!(normalize_alternate_locales(&declared, &fallback), vec!["a"]);
        assert_eq!(normalize_alternate_locales(&[], &fallback), vec!["z"]);
    }
}
