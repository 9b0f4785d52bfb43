//! Per-language navigation menus.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use quire_content::{collation_cmp, ContentEntry, ContentHeader};

use crate::i18n::Translator;
use crate::url::UrlResolver;

/// A menu entry as indexed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuEntry {
    pub key: String,
    pub label: String,
    pub url: String,
    pub order: i64,
}

/// A menu entry prepared for a specific page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub url: String,
    pub order: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MenuData {
    pub items: Vec<MenuItem>,
    pub active_key: String,
}

/// Sorted menu entries per language.
#[derive(Debug, Clone, Default)]
pub struct MenuIndex {
    by_lang: IndexMap<String, Vec<MenuEntry>>,
}

impl MenuIndex {
    /// Index every eligible entry that is not hidden on the menu.
    pub fn build(entries: &[ContentEntry], urls: &UrlResolver<'_>) -> Self {
        let mut by_lang: IndexMap<String, Vec<MenuEntry>> = IndexMap::new();

        for entry in entries
            .iter()
            .filter(|e| e.is_eligible() && !e.header.is_hidden_on_menu())
        {
            let header = &entry.header;
            by_lang
                .entry(header.lang().to_string())
                .or_default()
                .push(MenuEntry {
                    key: header.id().to_string(),
                    label: header.menu_label().to_string(),
                    url: urls.build_content_url(
                        Some(header.canonical()),
                        header.lang(),
                        header.slug(),
                    ),
                    order: header.menu_order(),
                });
        }

        for items in by_lang.values_mut() {
            items.sort_by(|a, b| {
                a.order
                    .cmp(&b.order)
                    .then_with(|| collation_cmp(&a.label, &b.label))
            });

            // Entries without an id never collide.
            let mut seen = HashSet::new();
            items.retain(|item| item.key.is_empty() || seen.insert(item.key.clone()));
        }

        Self { by_lang }
    }

    pub fn entries(&self, lang: &str) -> &[MenuEntry] {
        self.by_lang.get(lang).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Translated menu for `lang` with the active item marked.
    ///
    /// An absent or unknown `active_key` makes the first item active.
    pub fn menu_data(&self, lang: &str, active_key: Option<&str>, translator: &dyn Translator) -> MenuData {
        let entries = self.entries(lang);
        let requested = active_key.map(str::trim).filter(|k| !k.is_empty());

        let active = requested
            .and_then(|key| entries.iter().position(|item| item.key == key))
            .unwrap_or(0);
        let active_key = entries.get(active).map(|item| item.key.clone()).unwrap_or_default();

        let items = entries
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let fallback = if item.label.is_empty() { &item.key } else { &item.label };
                MenuItem {
                    key: item.key.clone(),
                    label: translator.t(lang, &format!("menu.{}", item.key), fallback),
                    url: item.url.clone(),
                    order: item.order,
                    is_active: index == active,
                }
            })
            .collect();

        MenuData { items, active_key }
    }
}

/// The menu key a page highlights: its id, else its slug.
pub fn resolve_active_menu_key(header: &ContentHeader) -> Option<String> {
    [header.id(), header.slug().trim()]
        .into_iter()
        .find(|key| !key.is_empty())
        .map(str::to_string)
}
