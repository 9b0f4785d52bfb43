//! Rendering content files and dynamic collections into pages.

use quire_components::{render_components, ComponentError};
use quire_content::{ContentEntry, ContentHeader};

use crate::config::SiteConfig;
use crate::context::BuildContext;
use crate::dynamic::DynamicPage;
use crate::i18n::Translator;
use crate::listing::{Listing, ListingPagination, ListingResolver};
use crate::markdown::render_markdown;
use crate::menu::resolve_active_menu_key;
use crate::pages::{build_output_path, format_bytes, normalize_log_path, RenderedPage, WriteMeta};
use crate::pagination::Paginator;
use crate::static_html::{shadowed_paths, transform_html};
use crate::templates::{TemplateEngine, TemplateError};
use crate::url::UrlResolver;
use crate::view::ViewBuilder;

/// Errors that stop a page from rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("{path}: {source}")]
    Component {
        path: String,
        #[source]
        source: ComponentError,
    },
}

/// Renders pages for one build. Nothing is written here.
pub struct PageRenderer<'a> {
    templates: &'a TemplateEngine,
    site: &'a SiteConfig,
    ctx: &'a BuildContext,
    urls: UrlResolver<'a>,
    views: ViewBuilder<'a>,
    version: &'a str,
}

impl<'a> PageRenderer<'a> {
    pub fn new(
        templates: &'a TemplateEngine,
        site: &'a SiteConfig,
        ctx: &'a BuildContext,
        urls: UrlResolver<'a>,
        translator: &'a dyn Translator,
        version: &'a str,
    ) -> Self {
        Self {
            templates,
            site,
            ctx,
            urls,
            views: ViewBuilder::new(site, ctx, urls, translator),
            version,
        }
    }

    fn resolver(&self) -> ListingResolver<'a> {
        ListingResolver::new(self.ctx, &self.urls.languages().default)
    }

    /// Render one content file. `collection` and `home` templates produce one page per
    /// listing page; everything else produces a single page.
    pub fn render_content(&self, entry: &ContentEntry) -> Result<Vec<RenderedPage>, RenderError> {
        let header = &entry.header;
        let lang = self.urls.languages().resolve(header.lang());
        let source = normalize_log_path(&entry.source_path.display().to_string());
        let template = header.template();

        tracing::info!(
            file = %source,
            lang,
            template,
            size = %format_bytes(entry.body.len()),
            "PROCESS_CONTENT"
        );

        let component_ctx = self.views.component_context(header, lang);
        let doc = render_components(&entry.body, &component_ctx, self.templates).map_err(|e| {
            RenderError::Component {
                path: source.clone(),
                source: e,
            }
        })?;
        if doc.has_slots() {
            tracing::info!(file = %source, count = doc.placeholders.len(), "COMPONENT_SLOTS");
        }
        let content_html = doc.inject(&render_markdown(&doc.markdown));

        let listing = self.resolver().listing(header, lang);

        if matches!(template, "collection" | "home") {
            return self.render_listing_pages(header, lang, &content_html, &listing, &source, "BUILD_COLLECTION");
        }

        let meta = WriteMeta::new("BUILD_PAGE", template, source.as_str(), lang);
        let page = self.render_page(header, lang, &content_html, &listing, &source, meta)?;
        Ok(vec![page])
    }

    /// Render a synthetic taxonomy page. It always lists every item on one page.
    pub fn render_dynamic(&self, page: &DynamicPage) -> Result<RenderedPage, RenderError> {
        let listing = self.resolver().listing_with_items(
            &page.header,
            &page.lang,
            page.key.clone(),
            page.items.clone(),
            &page.fallback_type,
        );

        let source = page.source();
        let meta = WriteMeta::new("BUILD_DYNAMIC_COLLECTION", page.template(), source.as_str(), &page.lang)
            .items(listing.items.len());
        self.render_page(&page.header, &page.lang, "", &listing, &source, meta)
    }

    fn render_listing_pages(
        &self,
        header: &ContentHeader,
        lang: &str,
        content_html: &str,
        listing: &Listing,
        source: &str,
        action: &str,
    ) -> Result<Vec<RenderedPage>, RenderError> {
        let paginator = Paginator::for_language(&self.site.pagination, lang, &self.urls.languages().default);
        let base_slug = header.slug();
        let mut pages = Vec::new();

        for slice in paginator.pages(&listing.items, base_slug) {
            let mut front = header.raw().clone();
            front.insert("slug", slice.slug.clone());
            match paginator.page_canonical(header.canonical(), slice.page) {
                Some(canonical) => front.insert("canonical", canonical),
                None => {
                    front.remove("canonical");
                }
            }
            if !listing.kind.is_empty() {
                front.insert("collectionType", listing.kind.clone());
            }
            let page_header = ContentHeader::new(front);

            let content_url = |slug: &Option<String>| {
                slug.as_deref()
                    .map(|slug| self.urls.build_content_url(None, lang, slug))
                    .unwrap_or_default()
            };
            let paged = listing.paged(
                slice.items.to_vec(),
                ListingPagination {
                    page: slice.page,
                    total_pages: slice.total_pages,
                    has_prev: slice.has_prev(),
                    has_next: slice.has_next(),
                    has_pagination: slice.has_pagination(),
                    prev_url: content_url(&slice.prev_slug),
                    next_url: content_url(&slice.next_slug),
                },
            );

            let meta = WriteMeta::new(action, page_header.template(), source, lang)
                .items(slice.items.len())
                .page(slice.label());
            pages.push(self.render_page(&page_header, lang, content_html, &paged, source, meta)?);
        }

        Ok(pages)
    }

    fn render_page(
        &self,
        header: &ContentHeader,
        lang: &str,
        content_html: &str,
        listing: &Listing,
        source: &str,
        meta: WriteMeta,
    ) -> Result<RenderedPage, RenderError> {
        let template = header.template();
        let layout = header.layout();
        let slug = header.slug();

        let view = self.views.content_view(header, lang, content_html, listing);
        let content = self.templates.render(&format!("templates/{template}"), &view)?;
        let input_bytes = content.len();

        let page_meta = self.views.meta().page_meta(header, lang, slug);
        let active = resolve_active_menu_key(header);
        let layout_view = self.views.layout_view(lang, active.as_deref(), page_meta, content);
        let html = self.templates.render(&format!("layouts/{layout}"), &layout_view)?;

        Ok(RenderedPage {
            html: transform_html(&html, self.version),
            output_path: build_output_path(header.canonical(), lang, slug, self.urls.languages()),
            source_path: source.to_string(),
            lang: lang.to_string(),
            template: template.to_string(),
            layout: layout.to_string(),
            meta: meta.template(layout).input_bytes(input_bytes),
        })
    }

    /// Output paths a rendered page claims, including legacy `<slug>.html` files it shadows.
    pub fn claimed_paths(&self, page: &RenderedPage, slug: &str) -> Vec<String> {
        let mut paths = vec![page.output_path.clone()];
        paths.extend(shadowed_paths(&page.lang, slug, self.urls.languages()));
        paths
    }
}
