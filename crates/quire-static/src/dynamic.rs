//! Synthetic taxonomy pages with no backing content file.

use serde_json::{Map, Value};

use quire_content::{ContentHeader, FrontMatter};

use crate::collections::CollectionEntry;
use crate::config::{CollectionTypeConfig, SiteConfig};
use crate::context::BuildContext;
use crate::i18n::{LanguageConfig, Translator};
use crate::listing::{dedupe_collection_items, normalize_collection_type, resolve_collection_type};
use crate::url::UrlResolver;

/// One generated page: a taxonomy key in one language.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicPage {
    /// Key of the collection config, e.g. `tags`
    pub config_key: String,
    /// Taxonomy key, e.g. `rust`
    pub key: String,
    pub lang: String,
    pub header: ContentHeader,
    /// Filtered and deduplicated entries
    pub items: Vec<CollectionEntry>,
    pub fallback_type: String,
}

impl DynamicPage {
    pub fn slug(&self) -> &str {
        self.header.slug()
    }

    pub fn template(&self) -> &str {
        self.header.template()
    }

    /// Logical source shown in logs, grouped by collection config.
    pub fn source(&self) -> String {
        format!("collections/{}", self.config_key)
    }
}

/// Synthesizes front-matter for every configured taxonomy.
pub struct DynamicCollectionBuilder<'a> {
    site: &'a SiteConfig,
    languages: &'a LanguageConfig,
    ctx: &'a BuildContext,
    urls: UrlResolver<'a>,
    translator: &'a dyn Translator,
}

impl<'a> DynamicCollectionBuilder<'a> {
    pub fn new(
        site: &'a SiteConfig,
        ctx: &'a BuildContext,
        urls: UrlResolver<'a>,
        translator: &'a dyn Translator,
    ) -> Self {
        Self {
            site,
            languages: urls.languages(),
            ctx,
            urls,
            translator,
        }
    }

    /// One page per (taxonomy key, language) with at least one accepted entry.
    pub fn pages(&self) -> Vec<DynamicPage> {
        let mut pages = Vec::new();

        for (config_key, config) in &self.site.collections {
            let types: Vec<&str> = config
                .types
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect();
            if types.is_empty() {
                continue;
            }

            for lang in &self.languages.supported {
                let Some(collections) = self.ctx.collections_for(lang) else {
                    continue;
                };

                for (key, entries) in collections {
                    let typed: Vec<CollectionEntry> = entries
                        .iter()
                        .filter(|entry| types.contains(&entry.kind.as_str()))
                        .cloned()
                        .collect();
                    let items = dedupe_collection_items(typed);
                    if items.is_empty() {
                        continue;
                    }

                    pages.push(self.page(config_key, config, &types, lang, key, items));
                }
            }
        }

        pages
    }

    fn page(
        &self,
        config_key: &str,
        config: &CollectionTypeConfig,
        types: &[&str],
        lang: &str,
        key: &str,
        items: Vec<CollectionEntry>,
    ) -> DynamicPage {
        let slug = self.site.collection_slug(config_key, key, lang);
        let is_series = config_key == "series";

        let display_key = resolve_collection_display_key(config_key, key, &items);
        let suffix = self.translator.t(
            lang,
            &format!("seo.collections.{config_key}.titleSuffix"),
            "",
        );
        let effective_title = match suffix.trim() {
            "" => display_key.clone(),
            suffix => format!("{display_key} | {suffix}"),
        };

        let template = match config.template.trim() {
            "" => "category",
            t => t,
        };

        let mut front = FrontMatter::new();
        front.insert(
            "title",
            if is_series { display_key.clone() } else { effective_title.clone() },
        );
        front.insert("metaTitle", effective_title.clone());
        front.insert("slug", slug);
        front.insert("template", template);
        front.insert("listKey", key);
        front.insert("listHeading", effective_title);
        front.insert("lang", lang);
        front.insert("status", "published");

        if let Some(alternate) = self.alternate(config_key, config, lang, key) {
            front.insert("alternate", alternate);
        }
        if is_series {
            front.insert("series", key);
            front.insert("seriesTitle", display_key);
        }

        let fallback_type = match types {
            [only] => normalize_collection_type(only),
            _ => String::new(),
        };
        let header = ContentHeader::new(front);
        let collection_type = resolve_collection_type(&header, &items, &fallback_type);
        let mut front = header.into_raw();
        if !collection_type.is_empty() {
            front.insert("collectionType", collection_type);
        }

        DynamicPage {
            config_key: config_key.to_string(),
            key: key.to_string(),
            lang: lang.to_string(),
            header: ContentHeader::new(front),
            items,
            fallback_type,
        }
    }

    /// Content URLs of the paired keys in the other languages.
    fn alternate(
        &self,
        config_key: &str,
        config: &CollectionTypeConfig,
        lang: &str,
        key: &str,
    ) -> Option<Value> {
        let pair = config.pairs.get(key)?;
        let mut urls = Map::new();

        for alt_lang in self.languages.others(lang) {
            let Some(alt_key) = pair.get(alt_lang).map(|k| k.trim()).filter(|k| !k.is_empty()) else {
                continue;
            };
            let alt_slug = self.site.collection_slug(config_key, alt_key, alt_lang);
            urls.insert(
                alt_lang.to_string(),
                Value::String(self.urls.build_content_url(None, alt_lang, &alt_slug)),
            );
        }

        (!urls.is_empty()).then_some(Value::Object(urls))
    }
}

/// Series pages are titled by the first series title among their entries.
pub fn resolve_collection_display_key(config_key: &str, key: &str, items: &[CollectionEntry]) -> String {
    if config_key == "series" {
        let title = items
            .iter()
            .filter_map(|item| item.series_title.as_deref())
            .map(str::trim)
            .find(|title| !title.is_empty());
        if let Some(title) = title {
            return title.to_string();
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::I18n;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use quire_content::ContentEntry;
    use serde_json::json;

    fn languages() -> LanguageConfig {
        LanguageConfig {
            default: "en".to_string(),
            supported: vec!["en".to_string(), "tr".to_string()],
            languages: IndexMap::new(),
        }
    }

    fn site() -> SiteConfig {
        let mut site = SiteConfig::default();

        let mut tags = CollectionTypeConfig {
            types: vec!["tag".to_string()],
            ..Default::default()
        };
        tags.slug_pattern.insert("en".to_string(), "tag/{{key}}".to_string());
        tags.slug_pattern.insert("tr".to_string(), "etiket/{{key}}".to_string());
        let mut pair = IndexMap::new();
        pair.insert("tr".to_string(), "dil".to_string());
        tags.pairs.insert("lang".to_string(), pair);
        site.collections.insert("tags".to_string(), tags);

        let series = CollectionTypeConfig {
            template: "series".to_string(),
            types: vec!["series".to_string()],
            ..Default::default()
        };
        site.collections.insert("series".to_string(), series);

        site.collections.insert("empty".to_string(), CollectionTypeConfig::default());
        site
    }

    fn entries() -> Vec<ContentEntry> {
        [
            "---\nid: a\nlang: en\nslug: a\nstatus: published\ntags: [lang, rust]\nseries: guide\nseriesTitle: The Guide\n---\n",
            "---\nid: b\nlang: en\nslug: b\nstatus: published\ntags: [rust]\ncategory: notes\n---\n",
            "---\nid: c\nlang: tr\nslug: c\nstatus: published\ntags: [dil]\n---\n",
        ]
        .iter()
        .map(|source| ContentEntry::parse(source, "x.md").unwrap())
        .collect()
    }

    fn build_pages() -> Vec<DynamicPage> {
        let langs = languages();
        let site = site();
        let urls = UrlResolver::new("https://example.com", &langs);
        let ctx = BuildContext::build(&entries(), urls, "");
        let i18n = I18n::new(langs.clone())
            .with_dictionary("en", json!({"seo": {"collections": {"tags": {"titleSuffix": "Tags"}}}}));

        DynamicCollectionBuilder::new(&site, &ctx, urls, &i18n).pages()
    }

    #[test]
    fn one_page_per_key_and_language() {
        let pages = build_pages();

        let ids: Vec<_> = pages
            .iter()
            .map(|p| format!("{}:{}:{}", p.config_key, p.lang, p.key))
            .collect();
        assert_eq!(
            ids,
            vec!["tags:en:lang", "tags:en:rust", "tags:tr:dil", "series:en:guide"]
        );
    }

    #[test]
    fn synthesizes_front_matter() {
        let pages = build_pages();
        let rust = &pages[1];
        let front = rust.header.raw();

        assert_eq!(rust.slug(), "tag/rust");
        assert_eq!(rust.template(), "category");
        assert_eq!(front.str("title"), Some("rust | Tags"));
        assert_eq!(front.str("metaTitle"), Some("rust | Tags"));
        assert_eq!(front.str("listKey"), Some("rust"));
        assert_eq!(front.str("collectionType"), Some("tag"));
        assert_eq!(rust.items.len(), 2);
        assert_eq!(rust.source(), "collections/tags");
    }

    #[test]
    fn pairs_become_alternates() {
        let pages = build_pages();
        let lang = &pages[0];

        assert_eq!(lang.header.raw().get("alternate"), Some(&json!({"tr": "/tr/etiket/dil/"})));
        assert_eq!(pages[1].header.raw().get("alternate"), None);
    }

    #[test]
    fn series_pages_use_series_title() {
        let pages = build_pages();
        let series = &pages[3];
        let front = series.header.raw();

        assert_eq!(front.str("title"), Some("The Guide"));
        assert_eq!(front.str("seriesTitle"), Some("The Guide"));
        assert_eq!(front.str("series"), Some("guide"));
        assert_eq!(series.slug(), "guide");
        assert_eq!(series.template(), "series");
    }

    #[test]
    fn tag_pages_default_to_the_tag_link_slug() {
        let langs = languages();
        let mut site = site();
        site.collections["tags"].slug_pattern.clear();
        let urls = UrlResolver::new("https://example.com", &langs);
        let ctx = BuildContext::build(&entries(), urls, "");
        let i18n = I18n::new(langs.clone());

        let pages = DynamicCollectionBuilder::new(&site, &ctx, urls, &i18n).pages();

        assert_eq!(pages[1].slug(), "tag/rust");
        assert_eq!(pages[1].slug(), site.tag_slug("rust", "en"));
        assert_eq!(pages[0].header.raw().get("alternate"), Some(&json!({"tr": "/tr/tag/dil/"})));
    }

    #[test]
    fn display_key_falls_back_to_key() {
        assert_eq!(resolve_collection_display_key("series", "k", &[]), "k");
        assert_eq!(resolve_collection_display_key("tags", "k", &[]), "k");
    }
}
