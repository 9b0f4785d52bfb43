//! Template contexts for content templates, layouts and components.

use serde::Serialize;
use serde_json::{json, Map, Value};

use quire_content::format::{format_date, normalize_string_array};
use quire_content::{slugify, ContentHeader};

use crate::config::SiteConfig;
use crate::context::BuildContext;
use crate::footer::{FooterBuilder, FooterData};
use crate::i18n::Translator;
use crate::listing::{normalize_collection_type, CollectionTypeFlags, Listing};
use crate::menu::MenuData;
use crate::meta::{serialize_for_inline_script, MetaBuilder, PageMeta, SiteData};
use crate::series::SeriesLinker;
use crate::url::UrlResolver;

/// A tag as linked from a post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagLink {
    pub label: String,
    pub url: String,
}

/// Context of a content template (`templates/<name>`).
#[derive(Debug, Clone, Serialize)]
pub struct ContentView<'v> {
    /// Rendered markdown body
    pub content: &'v str,
    /// Raw front-matter plus display fields
    pub front: Value,
    pub lang: &'v str,
    pub listing: &'v Listing,
    pub site: SiteData,
    pub locale: String,
    pub i18n: Value,

    #[serde(flatten)]
    pub flags: &'v CollectionTypeFlags,
}

/// Context of a layout (`layouts/<name>`).
#[derive(Debug, Clone, Serialize)]
pub struct LayoutView {
    pub lang: String,
    pub locale: String,
    pub theme: &'static str,
    pub site: SiteData,
    pub menu: MenuData,
    pub footer: FooterData,
    pub i18n: Value,
    pub page: PageMeta,
    pub content: String,

    /// The view itself as inline JSON when debug output is on
    pub debug: String,
}

/// Builds template contexts for one build.
#[derive(Clone, Copy)]
pub struct ViewBuilder<'a> {
    site: &'a SiteConfig,
    ctx: &'a BuildContext,
    urls: UrlResolver<'a>,
    translator: &'a dyn Translator,
}

impl<'a> ViewBuilder<'a> {
    pub fn new(
        site: &'a SiteConfig,
        ctx: &'a BuildContext,
        urls: UrlResolver<'a>,
        translator: &'a dyn Translator,
    ) -> Self {
        Self {
            site,
            ctx,
            urls,
            translator,
        }
    }

    pub fn meta(&self) -> MetaBuilder<'a> {
        MetaBuilder::new(self.site, self.urls, self.translator)
    }

    /// Front-matter as content templates see it.
    ///
    /// Adds `tags`, `tag_links`, `has_tags`, `category_url`, `category_label`,
    /// `date_display`, `updated_display`, `cover`, `cover_alt`, `lang`,
    /// `collectionType` and `series_listing` to the raw fields.
    pub fn front(&self, header: &ContentHeader, lang: &str) -> Value {
        let raw = header.raw();
        let mut front: Map<String, Value> = raw.as_map().clone();
        let date_format = self.urls.languages().date_format(lang);

        let tags = normalize_string_array(raw.get("tags"));
        let tag_links: Vec<TagLink> = tags
            .iter()
            .map(|tag| TagLink {
                label: tag.clone(),
                url: self.urls.build_content_url(
                    None,
                    lang,
                    &self.site.tag_slug(&slugify(tag), lang),
                ),
            })
            .collect();
        front.insert("has_tags".into(), Value::Bool(!tag_links.is_empty()));
        front.insert("tags".into(), json!(tags));
        front.insert("tag_links".into(), json!(tag_links));

        let category = header.category();
        let category_url = if category.is_empty() {
            String::new()
        } else {
            self.urls.build_content_url(None, lang, &category)
        };
        let category_label = raw.str("category").map(str::trim).unwrap_or("");
        front.insert("category_url".into(), json!(category_url));
        front.insert("category_label".into(), json!(category_label));

        let date_display = format_date(&header.date(), date_format).unwrap_or_default();
        let updated_display = format_date(&header.updated(), date_format).unwrap_or_default();
        front.insert("date_display".into(), json!(date_display));
        front.insert("updated_display".into(), json!(updated_display));

        let cover = match header.cover() {
            "" => self.site.seo.default_image.as_str(),
            cover => cover,
        };
        front.insert("cover".into(), json!(cover));
        front.insert("cover_alt".into(), json!(header.cover_alt()));
        front.insert("lang".into(), json!(lang));

        let collection_type = normalize_collection_type(header.collection_type());
        if !collection_type.is_empty() {
            front.insert("collectionType".into(), json!(collection_type));
        }

        let series = SeriesLinker::new(&self.ctx.content_index).link(header, lang);
        front.insert("series_listing".into(), json!(series));

        Value::Object(front)
    }

    pub fn content_view<'v>(
        &self,
        header: &ContentHeader,
        lang: &'v str,
        content: &'v str,
        listing: &'v Listing,
    ) -> ContentView<'v> {
        ContentView {
            content,
            front: self.front(header, lang),
            lang,
            listing,
            site: self.meta().site_data(lang),
            locale: self.translator.culture(lang),
            i18n: self.translator.dictionary(lang),
            flags: &listing.flags,
        }
    }

    /// What component templates embedded in a markdown body receive.
    pub fn component_context(&self, header: &ContentHeader, lang: &str) -> Value {
        json!({
            "front": self.front(header, lang),
            "lang": lang,
            "i18n": self.translator.dictionary(lang),
            "pages": self.ctx.collections_for(lang),
        })
    }

    pub fn layout_view(
        &self,
        lang: &str,
        active_menu_key: Option<&str>,
        page: PageMeta,
        content: String,
    ) -> LayoutView {
        let footer = FooterBuilder::new(self.site, self.ctx, self.urls, self.translator).footer(lang);
        let menu = self.ctx.menus.menu_data(lang, active_menu_key, self.translator);

        let mut view = LayoutView {
            lang: lang.to_string(),
            locale: self.translator.culture(lang),
            theme: "light",
            site: self.meta().site_data(lang),
            menu,
            footer,
            i18n: self.translator.dictionary(lang),
            page,
            content,
            debug: String::new(),
        };

        if self.site.build.debug {
            view.debug = serialize_for_inline_script(&view);
        }
        view
    }
}
