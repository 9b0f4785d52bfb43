//! Immutable per-build snapshot of the content indexes.

use quire_content::ContentEntry;

use crate::collections::{
    CollectionEntry, CollectionIndexer, CollectionsByLang, ContentIndex, FooterPolicies,
    FooterPolicy, LangCollections,
};
use crate::menu::MenuIndex;
use crate::url::UrlResolver;

/// Everything page rendering needs to know about the whole site.
///
/// Built once after all content is loaded and never mutated afterwards; reloading content
/// means building a new context.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    pub collections: CollectionsByLang,
    pub content_index: ContentIndex,
    pub footer_policies: FooterPolicies,
    pub menus: MenuIndex,
}

impl BuildContext {
    pub fn build(entries: &[ContentEntry], urls: UrlResolver<'_>, default_cover: &str) -> Self {
        let indexer = CollectionIndexer::new(urls, default_cover);

        Self {
            collections: indexer.collections(entries),
            content_index: indexer.content_index(entries),
            footer_policies: indexer.footer_policies(entries),
            menus: MenuIndex::build(entries, &urls),
        }
    }

    pub fn collections_for(&self, lang: &str) -> Option<&LangCollections> {
        self.collections.get(lang)
    }

    /// Entries under `key` in `lang`; empty when either is unknown.
    pub fn collection(&self, lang: &str, key: &str) -> &[CollectionEntry] {
        self.collections
            .get(lang)
            .and_then(|c| c.get(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn policies(&self, lang: &str) -> Option<&[FooterPolicy]> {
        self.footer_policies.get(lang).map(Vec::as_slice)
    }

    pub fn collection_count(&self) -> usize {
        self.collections.values().map(|c| c.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LanguageConfig;

    #[test]
    fn builds_every_index_from_one_scan() {
        let langs = LanguageConfig::default();
        let entries = vec![
            ContentEntry::parse(
                "---\nid: a\ntitle: A\nlang: en\nslug: a\nstatus: published\ntags: [go, rust]\ncategory: policy\n---\n",
                "a.md",
            )
            .unwrap(),
        ];

        let ctx = BuildContext::build(&entries, UrlResolver::new("https://example.com", &langs), "");

        assert_eq!(ctx.collection("en", "go").len(), 1);
        assert!(ctx.collection("en", "missing").is_empty());
        assert!(ctx.collection("tr", "go").is_empty());
        assert_eq!(ctx.collection_count(), 3);
        assert_eq!(ctx.content_index["a"]["en"].canonical, "/a/");
        assert_eq!(ctx.policies("en").map(|p| p.len()), Some(1));
        assert_eq!(ctx.menus.entries("en").len(), 1);
    }
}
