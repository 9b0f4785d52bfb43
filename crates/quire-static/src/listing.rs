//! Resolving which taxonomy list a page shows.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use quire_content::{slugify, ContentHeader};

use crate::collections::CollectionEntry;
use crate::context::BuildContext;

/// Boolean helpers templates use to branch on the collection type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionTypeFlags {
    pub collection_type: String,
    pub is_tag: bool,
    pub is_category: bool,
    pub is_author: bool,
    pub is_series: bool,
    pub is_home: bool,
}

impl CollectionTypeFlags {
    pub fn new(kind: &str) -> Self {
        let kind = normalize_collection_type(kind);
        Self {
            is_tag: kind == "tag",
            is_category: kind == "category",
            is_author: kind == "author",
            is_series: kind == "series",
            is_home: kind == "home",
            collection_type: kind,
        }
    }
}

/// Paging state attached to a listing that spans several pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPagination {
    pub page: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub has_pagination: bool,
    pub prev_url: String,
    pub next_url: String,
}

/// A resolved taxonomy list ready for templates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub key: String,
    pub lang: String,
    pub items: Vec<CollectionEntry>,
    pub has_items: bool,
    pub empty_message: String,
    pub heading: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(flatten)]
    pub flags: CollectionTypeFlags,

    #[serde(flatten)]
    pub pagination: Option<ListingPagination>,
}

impl Listing {
    /// Replace the items with one page of them.
    pub fn paged(&self, items: Vec<CollectionEntry>, pagination: ListingPagination) -> Self {
        Self {
            has_items: !items.is_empty(),
            items,
            pagination: Some(pagination),
            ..self.clone()
        }
    }
}

/// Builds [`Listing`]s from the build context.
#[derive(Debug, Clone, Copy)]
pub struct ListingResolver<'a> {
    ctx: &'a BuildContext,
    default_lang: &'a str,
}

impl<'a> ListingResolver<'a> {
    pub fn new(ctx: &'a BuildContext, default_lang: &'a str) -> Self {
        Self { ctx, default_lang }
    }

    /// The listing a content page declares through its front-matter.
    pub fn listing(&self, header: &ContentHeader, lang: &str) -> Listing {
        let lang = if lang.is_empty() { self.default_lang } else { lang };
        let key = resolve_listing_key(header);
        let items = if key.is_empty() {
            Vec::new()
        } else {
            dedupe_collection_items(self.ctx.collection(lang, &key).to_vec())
        };

        self.listing_with_items(header, lang, key, items, "")
    }

    /// A listing over already-selected items.
    pub fn listing_with_items(
        &self,
        header: &ContentHeader,
        lang: &str,
        key: String,
        items: Vec<CollectionEntry>,
        fallback_type: &str,
    ) -> Listing {
        let kind = resolve_collection_type(header, &items, fallback_type);

        Listing {
            key,
            lang: lang.to_string(),
            has_items: !items.is_empty(),
            items,
            empty_message: resolve_listing_empty(header, lang, self.default_lang),
            heading: resolve_listing_heading(header),
            flags: CollectionTypeFlags::new(&kind),
            kind,
            pagination: None,
        }
    }
}

/// First non-empty slug among `listKey`, `slug`, `category` and `id`.
pub fn resolve_listing_key(header: &ContentHeader) -> String {
    let front = header.raw();
    ["listKey", "slug", "category", "id"]
        .into_iter()
        .filter_map(|field| front.str(field))
        .map(slugify)
        .find(|key| !key.is_empty())
        .unwrap_or_default()
}

/// `listingEmpty` as text, or its entry for `lang`, or for the default language.
pub fn resolve_listing_empty(header: &ContentHeader, lang: &str, default_lang: &str) -> String {
    let non_blank = |value: Option<&Value>| {
        value
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    match header.listing_empty() {
        Some(Value::String(_)) => non_blank(header.listing_empty()).unwrap_or_default(),
        Some(Value::Object(map)) => non_blank(map.get(lang))
            .or_else(|| non_blank(map.get(default_lang)))
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// `listHeading`, else the title.
pub fn resolve_listing_heading(header: &ContentHeader) -> String {
    match header.list_heading() {
        "" => header.title().trim().to_string(),
        heading => heading.to_string(),
    }
}

pub fn normalize_collection_type(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Explicit `collectionType`, `listType` or `type`; else the first item's type; else `fallback`.
pub fn resolve_collection_type(
    header: &ContentHeader,
    items: &[CollectionEntry],
    fallback: &str,
) -> String {
    [header.collection_type(), header.list_type(), header.page_type()]
        .into_iter()
        .map(normalize_collection_type)
        .find(|kind| !kind.is_empty())
        .or_else(|| items.first().map(|item| item.kind.as_str().to_string()))
        .unwrap_or_else(|| normalize_collection_type(fallback))
}

/// Drop repeated ids, keeping first-seen order.
///
/// A later duplicate carrying a series title replaces an earlier one without it, in place.
/// Items without an id are always kept.
pub fn dedupe_collection_items(items: Vec<CollectionEntry>) -> Vec<CollectionEntry> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<CollectionEntry> = Vec::with_capacity(items.len());

    for item in items {
        if item.id().is_empty() {
            out.push(item);
            continue;
        }

        match positions.get(item.id()) {
            None => {
                positions.insert(item.id().to_string(), out.len());
                out.push(item);
            }
            Some(&index) => {
                if item.has_series_title() && !out[index].has_series_title() {
                    out[index] = item;
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::CollectionKind;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use quire_content::{ContentSummary, FrontMatter};
    use serde_json::json;

    fn header(value: Value) -> ContentHeader {
        match value {
            Value::Object(map) => ContentHeader::new(FrontMatter::from_map(map)),
            _ => panic!("test front-matter must be an object"),
        }
    }

    fn item(id: &str, kind: CollectionKind, series_title: Option<&str>) -> CollectionEntry {
        CollectionEntry {
            summary: ContentSummary {
                id: id.to_string(),
                title: id.to_uppercase(),
                ..Default::default()
            },
            kind,
            series_title: series_title.map(str::to_string),
        }
    }

    #[test]
    fn listing_key_priority() {
        assert_eq!(resolve_listing_key(&header(json!({"listKey": "Go Lang", "slug": "x"}))), "go-lang");
        assert_eq!(resolve_listing_key(&header(json!({"listKey": " ", "slug": "Blog"}))), "blog");
        assert_eq!(resolve_listing_key(&header(json!({"category": "Web", "id": "x"}))), "web");
        assert_eq!(resolve_listing_key(&header(json!({"id": "Notes"}))), "notes");
        assert_eq!(resolve_listing_key(&header(json!({"slug": 3}))), "");
    }

    #[test]
    fn listing_empty_message() {
        let h = header(json!({"listingEmpty": " Nothing yet "}));
        assert_eq!(resolve_listing_empty(&h, "tr", "en"), "Nothing yet");

        let h = header(json!({"listingEmpty": {"en": "Nothing", "tr": "Yok"}}));
        assert_eq!(resolve_listing_empty(&h, "tr", "en"), "Yok");
        assert_eq!(resolve_listing_empty(&h, "de", "en"), "Nothing");

        assert_eq!(resolve_listing_empty(&header(json!({"listingEmpty": 4})), "en", "en"), "");
    }

    #[test]
    fn listing_heading_falls_back_to_title() {
        assert_eq!(resolve_listing_heading(&header(json!({"listHeading": "Latest", "title": "Blog"}))), "Latest");
        assert_eq!(resolve_listing_heading(&header(json!({"title": " Blog "}))), "Blog");
    }

    #[test]
    fn collection_type_priority() {
        let tagged = vec![item("a", CollectionKind::Tag, None)];

        assert_eq!(resolve_collection_type(&header(json!({"collectionType": " Series "})), &tagged, "x"), "series");
        assert_eq!(resolve_collection_type(&header(json!({"listType": "category"})), &tagged, "x"), "category");
        assert_eq!(resolve_collection_type(&header(json!({"type": "Author"})), &tagged, "x"), "author");
        assert_eq!(resolve_collection_type(&header(json!({})), &tagged, "x"), "tag");
        assert_eq!(resolve_collection_type(&header(json!({})), &[], " Home "), "home");
        assert_eq!(resolve_collection_type(&header(json!({})), &[], ""), "");
    }

    #[test]
    fn type_flags() {
        let flags = CollectionTypeFlags::new(" Author ");
        assert_eq!(flags.collection_type, "author");
        assert!(flags.is_author);
        assert!(!flags.is_tag);
    }

    #[test]
    fn dedupe_prefers_series_title() {
        let items = vec![
            item("a", CollectionKind::Tag, None),
            item("b", CollectionKind::Tag, None),
            item("a", CollectionKind::Series, Some("S")),
        ];

        let out = dedupe_collection_items(items);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id(), "a");
        assert_eq!(out[0].series_title.as_deref(), Some("S"));
        assert_eq!(out[1].id(), "b");
    }

    #[test]
    fn dedupe_keeps_items_without_id() {
        let items = vec![
            item("", CollectionKind::Tag, None),
            item("", CollectionKind::Tag, None),
            item("a", CollectionKind::Tag, Some("first")),
            item("a", CollectionKind::Tag, Some("second")),
        ];

        let out = dedupe_collection_items(items);

        assert_eq!(out.len(), 3);
        assert_eq!(out[2].series_title.as_deref(), Some("first"));
    }

    #[test]
    fn listing_from_context() {
        let mut ctx = BuildContext::default();
        ctx.collections.entry("en".to_string()).or_default().insert(
            "go".to_string(),
            vec![item("a", CollectionKind::Tag, None), item("a", CollectionKind::Tag, None)],
        );
        let resolver = ListingResolver::new(&ctx, "en");

        let listing = resolver.listing(&header(json!({"listKey": "go", "title": "Go"})), "");

        assert_eq!(listing.key, "go");
        assert_eq!(listing.lang, "en");
        assert_eq!(listing.items.len(), 1);
        assert!(listing.has_items);
        assert_eq!(listing.heading, "Go");
        assert_eq!(listing.kind, "tag");
        assert!(listing.flags.is_tag);

        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["is_tag"], true);
        assert_eq!(value["type"], "tag");
        assert!(value.get("page").is_none());
    }

    #[test]
    fn unknown_key_gives_empty_listing() {
        let ctx = BuildContext::default();
        let listing = ListingResolver::new(&ctx, "en")
            .listing(&header(json!({"slug": "nothing", "listingEmpty": "Empty"})), "en");

        assert!(!listing.has_items);
        assert_eq!(listing.empty_message, "Empty");
    }

    fn arb_items() -> impl Strategy<Value = Vec<CollectionEntry>> {
        prop::collection::vec(("[abc]?", any::<bool>()), 0..12).prop_map(|raw| {
            raw.into_iter()
                .map(|(id, series)| {
                    item(&id, CollectionKind::Tag, series.then_some("S"))
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn dedupe_is_idempotent(items in arb_items()) {
            let once = dedupe_collection_items(items);
            let twice = dedupe_collection_items(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn dedupe_leaves_unique_ids(items in arb_items()) {
            let out = dedupe_collection_items(items);
            let ids: Vec<_> = out.iter().map(|i| i.id()).filter(|id| !id.is_empty()).collect();
            let mut unique = ids.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(ids.len(), unique.len());
        }
    }
}
