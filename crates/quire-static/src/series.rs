//! Linking the ordered `related` ids of a page.

use serde::Serialize;

use quire_content::ContentHeader;

use crate::collections::{ContentIndex, IndexedContent};

/// One position in a series navigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesItem {
    pub id: String,
    pub label: String,
    pub url: String,
    pub has_url: bool,
    pub is_current: bool,
    pub is_placeholder: bool,
}

impl SeriesItem {
    fn placeholder() -> Self {
        Self {
            id: String::new(),
            label: "...".to_string(),
            url: String::new(),
            has_url: false,
            is_current: false,
            is_placeholder: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesListing {
    pub label: String,
    pub has_label: bool,
    pub has_items: bool,
    pub items: Vec<SeriesItem>,
}

/// Resolves `related` ids against the content index.
#[derive(Debug, Clone, Copy)]
pub struct SeriesLinker<'a> {
    index: &'a ContentIndex,
}

impl<'a> SeriesLinker<'a> {
    pub fn new(index: &'a ContentIndex) -> Self {
        Self { index }
    }

    /// Prefer `lang`, then the page's own language, then any language.
    fn lookup(&self, id: &str, lang: &str, page_lang: &str) -> Option<&'a IndexedContent> {
        let by_lang = self.index.get(id)?;
        by_lang
            .get(lang)
            .or_else(|| by_lang.get(page_lang))
            .or_else(|| by_lang.values().next())
    }

    /// Series navigation for a page, in declared order.
    pub fn link(&self, header: &ContentHeader, lang: &str) -> SeriesListing {
        let label = match header.raw().non_empty("seriesTitle") {
            Some(title) => title.trim().to_string(),
            None => header.raw().str("series").unwrap_or("").trim().to_string(),
        };
        let current_id = header.id();
        let lang = if lang.is_empty() { header.lang() } else { lang };

        let items: Vec<SeriesItem> = header
            .related()
            .into_iter()
            .map(|id| {
                if id.is_empty() {
                    return SeriesItem::placeholder();
                }

                let is_current = id == current_id;
                let found = self.lookup(&id, lang, header.lang());
                let label = match found {
                    Some(content) if !content.title.is_empty() => content.title.clone(),
                    _ if is_current && !header.title().is_empty() => header.title().to_string(),
                    _ => id.clone(),
                };
                let url = found.map(|c| c.canonical.clone()).unwrap_or_default();

                SeriesItem {
                    has_url: !url.is_empty(),
                    id,
                    label,
                    url,
                    is_current,
                    is_placeholder: false,
                }
            })
            .collect();

        SeriesListing {
            has_label: !label.is_empty(),
            label,
            has_items: !items.is_empty(),
            items,
        }
    }
}
