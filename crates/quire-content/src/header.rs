//! Typed, total view over raw front-matter.

use serde_json::{Map, Value};

use crate::format::{
    date_text, format_date, is_truthy, normalize_string_array, reading_time, slugify, to_order,
};
use crate::frontmatter::FrontMatter;

/// The `alternate` front-matter field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alternate<'a> {
    None,
    /// Shorthand: a single URL for "the other language".
    Single(&'a str),
    /// Explicit URL per language code.
    PerLanguage(&'a Map<String, Value>),
}

/// Normalized metadata of a content entry.
///
/// Every getter is total: a missing or mistyped field yields an empty default instead of
/// an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentHeader {
    front: FrontMatter,
}

impl ContentHeader {
    pub fn new(front: FrontMatter) -> Self {
        Self { front }
    }

    pub fn raw(&self) -> &FrontMatter {
        &self.front
    }

    pub fn into_raw(self) -> FrontMatter {
        self.front
    }

    fn string(&self, key: &str) -> &str {
        self.front.str(key).unwrap_or("")
    }

    fn trimmed(&self, key: &str) -> &str {
        self.string(key).trim()
    }

    pub fn status(&self) -> String {
        self.trimmed("status").to_lowercase()
    }

    pub fn id(&self) -> &str {
        self.trimmed("id")
    }

    pub fn lang(&self) -> &str {
        self.string("lang")
    }

    pub fn slug(&self) -> &str {
        self.string("slug")
    }

    pub fn canonical(&self) -> &str {
        self.string("canonical")
    }

    pub fn alternate(&self) -> Alternate<'_> {
        match self.front.get("alternate") {
            Some(Value::String(s)) if !s.trim().is_empty() => Alternate::Single(s.trim()),
            Some(Value::Object(map)) => Alternate::PerLanguage(map),
            _ => Alternate::None,
        }
    }

    /// Cross-language taxonomy key this page pairs with.
    pub fn pair(&self) -> &str {
        self.trimmed("pair")
    }

    pub fn title(&self) -> &str {
        self.string("title")
    }

    pub fn meta_title(&self) -> &str {
        self.trimmed("metaTitle")
    }

    pub fn template(&self) -> &str {
        match self.front.str("template") {
            Some(t) => t.trim(),
            None => "page",
        }
    }

    pub fn layout(&self) -> &str {
        match self.front.str("layout") {
            Some(l) => l.trim(),
            None => "default",
        }
    }

    pub fn list_key(&self) -> &str {
        self.trimmed("listKey")
    }

    pub fn list_heading(&self) -> &str {
        self.trimmed("listHeading")
    }

    /// Raw `listingEmpty`: either a string or a per-language object.
    pub fn listing_empty(&self) -> Option<&Value> {
        self.front.get("listingEmpty")
    }

    pub fn list_type(&self) -> &str {
        self.trimmed("listType")
    }

    pub fn page_type(&self) -> &str {
        self.trimmed("type")
    }

    /// Ordered related ids; non-string items become blanks so positions are kept.
    pub fn related(&self) -> Vec<String> {
        match self.front.get("related") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(|s| s.trim().to_string()).unwrap_or_default())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_featured(&self) -> bool {
        is_truthy(self.front.get("featured"))
    }

    pub fn category(&self) -> String {
        slugify(self.string("category"))
    }

    pub fn tags(&self) -> Vec<String> {
        normalize_string_array(self.front.get("tags"))
            .iter()
            .map(|tag| slugify(tag))
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    pub fn keywords(&self) -> Vec<String> {
        normalize_string_array(self.front.get("keywords"))
    }

    pub fn series(&self) -> String {
        slugify(self.string("series"))
    }

    pub fn collection_type(&self) -> &str {
        self.trimmed("collectionType")
    }

    pub fn is_collection_page(&self) -> bool {
        matches!(self.collection_type(), "tag" | "category" | "series")
    }

    pub fn is_policy(&self) -> bool {
        self.trimmed("category") == "policy"
    }

    pub fn is_about_page(&self) -> bool {
        self.page_type() == "about"
    }

    pub fn is_contact_page(&self) -> bool {
        self.page_type() == "contact"
    }

    pub fn date(&self) -> String {
        date_text(self.front.get("date"))
    }

    pub fn updated(&self) -> String {
        date_text(self.front.get("updated"))
    }

    /// `date` formatted with `pattern`, or `None` when there is no parseable date.
    pub fn date_display(&self, pattern: &str) -> Option<String> {
        format_date(&self.date(), pattern)
    }

    pub fn description(&self) -> &str {
        self.string("description")
    }

    /// Cover image path; empty when blank so callers can apply the site default.
    pub fn cover(&self) -> &str {
        let cover = self.string("cover");
        if cover.trim().is_empty() {
            ""
        } else {
            cover
        }
    }

    pub fn cover_alt(&self) -> &str {
        self.string("coverAlt")
    }

    pub fn cover_caption(&self) -> &str {
        self.string("coverCaption")
    }

    pub fn reading_time(&self) -> u32 {
        reading_time(self.front.get("readingTime"))
    }

    /// Display title of the series, falling back to the raw `series` value.
    pub fn series_title(&self) -> &str {
        let series = self.string("series");
        if series.trim().is_empty() {
            return "";
        }

        match self.front.non_empty("seriesTitle") {
            Some(title) => title,
            None => series,
        }
    }

    pub fn menu_label(&self) -> &str {
        self.front
            .non_empty("menu")
            .or_else(|| self.front.non_empty("title"))
            .or_else(|| self.front.non_empty("id"))
            .or_else(|| self.front.non_empty("slug"))
            .unwrap_or("")
    }

    pub fn is_hidden_on_menu(&self) -> bool {
        match self.front.get("show") {
            Some(value) => !is_truthy(Some(value)),
            None => false,
        }
    }

    pub fn menu_order(&self) -> i64 {
        to_order(self.front.get("order"))
    }
}

impl From<FrontMatter> for ContentHeader {
    fn from(front: FrontMatter) -> Self {
        Self::new(front)
    }
}
