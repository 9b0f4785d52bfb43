//! Splitting listings into pages.

use crate::config::{PaginationConfig, DEFAULT_PAGE_SIZE};

/// Fixed-size pager with a per-language slug segment (`page-2`, `sayfa-2`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Paginator {
    page_size: usize,
    segment: String,
}

impl Paginator {
    /// A zero page size falls back to the default.
    pub fn new(page_size: usize, segment: impl Into<String>) -> Self {
        let page_size = if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size };
        let segment = segment.into();
        let segment = match segment.trim() {
            "" => "page".to_string(),
            s => s.to_string(),
        };

        Self { page_size, segment }
    }

    /// Paginator for `lang` using the configured size and segment.
    pub fn for_language(config: &PaginationConfig, lang: &str, default_lang: &str) -> Self {
        Self::new(
            config.effective_page_size(),
            resolve_pagination_segment(config, lang, default_lang),
        )
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// At least one page, even for an empty list.
    pub fn total_pages(&self, count: usize) -> usize {
        count.div_ceil(self.page_size).max(1)
    }

    /// Slug of page `page` (1-based) under `base_slug`.
    pub fn page_slug(&self, base_slug: &str, page: usize) -> String {
        if page <= 1 {
            return base_slug.to_string();
        }

        let base = base_slug.trim_end_matches('/');
        if base.is_empty() {
            format!("{}-{page}", self.segment)
        } else {
            format!("{base}/{}-{page}", self.segment)
        }
    }

    /// Canonical override of page `page` given the source canonical.
    ///
    /// Page one keeps the source canonical; later pages extend an explicit canonical and
    /// otherwise leave it unset.
    pub fn page_canonical(&self, canonical: &str, page: usize) -> Option<String> {
        let canonical = canonical.trim();
        if page <= 1 {
            return Some(canonical.to_string()).filter(|c| !c.is_empty());
        }
        if canonical.is_empty() {
            return None;
        }

        Some(format!(
            "{}/{}-{page}/",
            canonical.trim_end_matches('/'),
            self.segment
        ))
    }

    /// Every page of `items`, in order.
    pub fn pages<'a, T>(&'a self, items: &'a [T], base_slug: &'a str) -> Pages<'a, T> {
        Pages {
            paginator: self,
            items,
            base_slug,
            total_pages: self.total_pages(items.len()),
            next: 1,
        }
    }
}

/// Pagination word for `lang`, else the default language's, else `page`.
pub fn resolve_pagination_segment(config: &PaginationConfig, lang: &str, default_lang: &str) -> String {
    [lang, default_lang]
        .into_iter()
        .filter_map(|code| config.segment.get(code))
        .map(|segment| segment.trim())
        .find(|segment| !segment.is_empty())
        .unwrap_or("page")
        .to_string()
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<'a, T> {
    /// 1-based page number
    pub page: usize,
    pub total_pages: usize,
    pub items: &'a [T],
    pub slug: String,

    /// Slug of the previous page, if any
    pub prev_slug: Option<String>,

    /// Slug of the next page, if any
    pub next_slug: Option<String>,
}

impl<T> PageSlice<'_, T> {
    pub fn has_prev(&self) -> bool {
        self.prev_slug.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.next_slug.is_some()
    }

    pub fn has_pagination(&self) -> bool {
        self.total_pages > 1
    }

    /// `"{page}/{total}"`, as logged.
    pub fn label(&self) -> String {
        format!("{}/{}", self.page, self.total_pages)
    }
}

/// Iterator over the pages of a listing.
pub struct Pages<'a, T> {
    paginator: &'a Paginator,
    items: &'a [T],
    base_slug: &'a str,
    total_pages: usize,
    next: usize,
}

impl<'a, T> Iterator for Pages<'a, T> {
    type Item = PageSlice<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.total_pages {
            return None;
        }

        let page = self.next;
        self.next += 1;

        let size = self.paginator.page_size;
        let start = ((page - 1) * size).min(self.items.len());
        let end = (start + size).min(self.items.len());

        Some(PageSlice {
            page,
            total_pages: self.total_pages,
            items: &self.items[start..end],
            slug: self.paginator.page_slug(self.base_slug, page),
            prev_slug: (page > 1).then(|| self.paginator.page_slug(self.base_slug, page - 1)),
            next_slug: (page < self.total_pages)
                .then(|| self.paginator.page_slug(self.base_slug, page + 1)),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total_pages + 1).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Pages<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn slug_scheme() {
        let paginator = Paginator::new(2, "page");
        let items = [1, 2, 3, 4, 5];

        let pages: Vec<_> = paginator.pages(&items, "blog").collect();

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].slug, "blog");
        assert_eq!(pages[0].prev_slug, None);
        assert_eq!(pages[0].next_slug.as_deref(), Some("blog/page-2"));
        assert_eq!(pages[1].slug, "blog/page-2");
        assert_eq!(pages[1].prev_slug.as_deref(), Some("blog"));
        assert_eq!(pages[2].slug, "blog/page-3");
        assert_eq!(pages[2].prev_slug.as_deref(), Some("blog/page-2"));
        assert_eq!(pages[2].next_slug, None);
        assert_eq!(pages[2].items, &[5]);
        assert_eq!(pages[2].label(), "3/3");
    }

    #[test]
    fn empty_base_slug() {
        let paginator = Paginator::new(1, "sayfa");
        assert_eq!(paginator.page_slug("", 2), "sayfa-2");
        assert_eq!(paginator.page_slug("blog/", 2), "blog/sayfa-2");
        assert_eq!(paginator.page_slug("blog/", 1), "blog/");
    }

    #[test]
    fn empty_list_has_one_empty_page() {
        let paginator = Paginator::new(5, "page");
        let items: [u8; 0] = [];

        let pages: Vec<_> = paginator.pages(&items, "blog").collect();

        assert_eq!(pages.len(), 1);
        assert!(pages[0].items.is_empty());
        assert!(!pages[0].has_pagination());
        assert!(!pages[0].has_next());
    }

    #[test]
    fn zero_page_size_falls_back() {
        assert_eq!(Paginator::new(0, "page").page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(Paginator::new(3, "  ").segment(), "page");
    }

    #[test]
    fn page_canonicals() {
        let paginator = Paginator::new(5, "page");

        assert_eq!(paginator.page_canonical("", 1), None);
        assert_eq!(paginator.page_canonical("~/blog/", 1).as_deref(), Some("~/blog/"));
        assert_eq!(paginator.page_canonical("~/blog/", 3).as_deref(), Some("~/blog/page-3/"));
        assert_eq!(paginator.page_canonical(" ", 2), None);
    }

    #[test]
    fn segment_resolution() {
        let mut segment = IndexMap::new();
        segment.insert("en".to_string(), "page".to_string());
        segment.insert("tr".to_string(), " sayfa ".to_string());
        segment.insert("de".to_string(), " ".to_string());
        let config = PaginationConfig {
            page_size: 5,
            segment,
        };

        assert_eq!(resolve_pagination_segment(&config, "tr", "en"), "sayfa");
        assert_eq!(resolve_pagination_segment(&config, "de", "en"), "page");
        assert_eq!(resolve_pagination_segment(&PaginationConfig::default(), "tr", "en"), "page");
        assert_eq!(Paginator::for_language(&config, "tr", "en").segment(), "sayfa");
    }

    proptest! {
        #[test]
        fn pages_reconstruct_the_list(len in 0usize..60, size in 1usize..9) {
            let items: Vec<usize> = (0..len).collect();
            let paginator = Paginator::new(size, "page");

            let pages: Vec<_> = paginator.pages(&items, "blog").collect();
            let joined: Vec<usize> = pages.iter().flat_map(|p| p.items.iter().copied()).collect();

            prop_assert_eq!(&joined, &items);
            prop_assert_eq!(pages.len(), len.div_ceil(size).max(1));
            prop_assert_eq!(pages.len(), paginator.total_pages(len));
        }
    }
}
