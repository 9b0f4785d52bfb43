//! Taxonomy collections, the cross-language content index and footer policies.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::Serialize;

use quire_content::format::date_sort_key;
use quire_content::{collation_cmp, ContentEntry, ContentSummary};

use crate::url::UrlResolver;

/// Which taxonomy an entry was filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Home,
    Category,
    Tag,
    Series,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Category => "category",
            Self::Tag => "tag",
            Self::Series => "series",
        }
    }
}

/// One occurrence of a content entry in a taxonomy list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionEntry {
    #[serde(flatten)]
    pub summary: ContentSummary,

    #[serde(rename = "type")]
    pub kind: CollectionKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_title: Option<String>,
}

impl CollectionEntry {
    pub fn id(&self) -> &str {
        &self.summary.id
    }

    pub fn has_series_title(&self) -> bool {
        self.series_title.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Taxonomy key to ordered entries, for one language.
pub type LangCollections = IndexMap<String, Vec<CollectionEntry>>;

/// Language to taxonomy collections.
pub type CollectionsByLang = IndexMap<String, LangCollections>;

/// Minimal cross-language record of a content entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedContent {
    pub id: String,
    pub lang: String,
    pub title: String,
    pub canonical: String,
}

/// Content id to language to record.
pub type ContentIndex = IndexMap<String, IndexMap<String, IndexedContent>>;

/// A policy page linked from the footer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FooterPolicy {
    pub lang: String,
    pub key: String,
    pub label: String,
    pub url: String,
}

/// Language to footer policies, sorted by label.
pub type FooterPolicies = IndexMap<String, Vec<FooterPolicy>>;

/// Builds the per-build indexes from loaded content.
///
/// Only valid, published entries are considered.
pub struct CollectionIndexer<'a> {
    urls: UrlResolver<'a>,
    default_cover: &'a str,
}

impl<'a> CollectionIndexer<'a> {
    pub fn new(urls: UrlResolver<'a>, default_cover: &'a str) -> Self {
        Self {
            urls,
            default_cover,
        }
    }

    fn content_url(&self, entry: &ContentEntry) -> String {
        let header = &entry.header;
        self.urls
            .build_content_url(Some(header.canonical()), header.lang(), header.slug())
    }

    fn summary(&self, entry: &ContentEntry) -> ContentSummary {
        let pattern = self.urls.languages().date_format(entry.header.lang());
        let mut summary = ContentSummary::from_header(&entry.header, self.default_cover, pattern);
        summary.canonical = self.content_url(entry);
        summary
    }

    /// File every eligible entry under home, its category, each tag and its series.
    pub fn collections(&self, entries: &[ContentEntry]) -> CollectionsByLang {
        let mut by_lang = CollectionsByLang::new();

        for entry in entries.iter().filter(|e| e.is_eligible()) {
            let header = &entry.header;
            let summary = self.summary(entry);
            let store = by_lang.entry(header.lang().to_string()).or_default();

            let mut add = |key: String, kind: CollectionKind, series_title: Option<String>| {
                store.entry(key).or_default().push(CollectionEntry {
                    summary: summary.clone(),
                    kind,
                    series_title,
                });
            };

            if entry.is_post_template() && header.is_featured() {
                add("home".to_string(), CollectionKind::Home, None);
            }

            let category = header.category();
            if !category.is_empty() {
                add(category, CollectionKind::Category, None);
            }

            for tag in header.tags() {
                add(tag, CollectionKind::Tag, None);
            }

            let series = header.series();
            if !series.is_empty() {
                add(
                    series,
                    CollectionKind::Series,
                    Some(header.series_title().to_string()),
                );
            }
        }

        for collections in by_lang.values_mut() {
            for items in collections.values_mut() {
                items.sort_by(compare_entries);
            }
        }

        by_lang
    }

    /// Index eligible entries with an id by id and language. Later entries overwrite earlier ones.
    pub fn content_index(&self, entries: &[ContentEntry]) -> ContentIndex {
        let mut index = ContentIndex::new();

        for entry in entries.iter().filter(|e| e.is_eligible()) {
            let header = &entry.header;
            if header.id().is_empty() {
                continue;
            }

            index.entry(header.id().to_string()).or_default().insert(
                header.lang().to_string(),
                IndexedContent {
                    id: header.id().to_string(),
                    lang: header.lang().to_string(),
                    title: header.title().to_string(),
                    canonical: self.content_url(entry),
                },
            );
        }

        index
    }

    /// Eligible `policy` pages per language, sorted by label.
    pub fn footer_policies(&self, entries: &[ContentEntry]) -> FooterPolicies {
        let mut policies = FooterPolicies::new();

        for entry in entries.iter().filter(|e| e.is_eligible() && e.header.is_policy()) {
            let header = &entry.header;
            policies
                .entry(header.lang().to_string())
                .or_default()
                .push(FooterPolicy {
                    lang: header.lang().to_string(),
                    key: header.id().to_string(),
                    label: header.menu_label().to_string(),
                    url: self.content_url(entry),
                });
        }

        for list in policies.values_mut() {
            list.sort_by(|a, b| collation_cmp(&a.label, &b.label));
        }

        policies
    }
}

/// Newest first, then by title.
pub fn compare_entries(a: &CollectionEntry, b: &CollectionEntry) -> Ordering {
    date_sort_key(&b.summary.date)
        .cmp(&date_sort_key(&a.summary.date))
        .then_with(|| collation_cmp(&a.summary.title, &b.summary.title))
}
