//! Footer data: policy links, popular tags, social links and the tagline.

use std::cmp::Reverse;

use indexmap::IndexMap;
use serde::Serialize;

use crate::collections::CollectionKind;
use crate::config::SiteConfig;
use crate::context::BuildContext;
use crate::i18n::Translator;
use crate::url::UrlResolver;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FooterLink {
    pub key: String,
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FooterData {
    pub policies: Vec<FooterLink>,
    pub tags: Vec<FooterLink>,
    pub social: Vec<FooterLink>,
    pub tagline: String,
    pub has_policies: bool,
    pub has_tags: bool,
    pub has_social: bool,
}

pub struct FooterBuilder<'a> {
    site: &'a SiteConfig,
    ctx: &'a BuildContext,
    urls: UrlResolver<'a>,
    translator: &'a dyn Translator,
}

impl<'a> FooterBuilder<'a> {
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

    pub fn footer(&self, lang: &str) -> FooterData {
        let policies = self.policies(lang);
        let tags = self.tags(lang);
        let social = self.social(lang);

        FooterData {
            has_policies: !policies.is_empty(),
            has_tags: !tags.is_empty(),
            has_social: !social.is_empty(),
            policies,
            tags,
            social,
            tagline: self.translator.t(lang, "footer.tagline", "-"),
        }
    }

    /// Policies of `lang`, or of the default language when `lang` has none.
    fn policies(&self, lang: &str) -> Vec<FooterLink> {
        let default_lang = &self.urls.languages().default;
        let policies = self
            .ctx
            .policies(lang)
            .or_else(|| self.ctx.policies(default_lang))
            .unwrap_or(&[]);

        policies
            .iter()
            .map(|policy| FooterLink {
                key: policy.key.clone(),
                label: self.translator.t(
                    lang,
                    &format!("footer.policies.{}", policy.key),
                    &policy.label,
                ),
                url: policy.url.clone(),
            })
            .collect()
    }

    fn tags(&self, lang: &str) -> Vec<FooterLink> {
        footer_tags(self.ctx, lang, self.site.seo.footer_tag_count)
            .into_iter()
            .map(|(key, _)| {
                let slug = self.site.tag_slug(&key, lang);
                FooterLink {
                    label: self.translator.t(lang, &format!("footer.tags.{key}"), &key),
                    url: self.urls.build_content_url(None, lang, &slug),
                    key,
                }
            })
            .collect()
    }

    fn social(&self, lang: &str) -> Vec<FooterLink> {
        self.site
            .identity
            .social
            .iter()
            .filter(|(_, url)| !url.trim().is_empty())
            .map(|(key, url)| FooterLink {
                key: key.clone(),
                label: self
                    .translator
                    .t(lang, &format!("footer.social.{key}"), &key.to_uppercase()),
                url: url.trim().to_string(),
            })
            .collect()
    }
}

/// Tag keys of `lang` with their entry counts, most used first.
///
/// A `limit` of zero keeps every tag.
pub fn footer_tags(ctx: &BuildContext, lang: &str, limit: usize) -> Vec<(String, usize)> {
    let Some(collections) = ctx.collections_for(lang) else {
        return Vec::new();
    };

    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for (key, entries) in collections {
        let count = entries
            .iter()
            .filter(|entry| entry.kind == CollectionKind::Tag)
            .count();
        if count > 0 {
            *counts.entry(key.as_str()).or_default() += count;
        }
    }

    let mut tags: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(key, count)| (key.to_string(), count))
        .collect();
    tags.sort_by(|a, b| (Reverse(a.1), &a.0).cmp(&(Reverse(b.1), &b.0)));

    if limit > 0 {
        tags.truncate(limit);
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{I18n, LanguageConfig};
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

    fn entries() -> Vec<ContentEntry> {
        [
            "---\nid: a\nlang: en\nslug: a\nstatus: published\ntags: [rust, go]\n---\n",
            "---\nid: b\nlang: en\nslug: b\nstatus: published\ntags: [go]\n---\n",
            "---\nid: c\nlang: en\nslug: c\nstatus: published\ntags: [zig]\ncategory: zig\n---\n",
            "---\nid: privacy\nlang: en\nslug: privacy\ntitle: Privacy\nstatus: published\ncategory: policy\n---\n",
        ]
        .iter()
        .map(|source| ContentEntry::parse(source, "x.md").unwrap())
        .collect()
    }

    #[test]
    fn tags_sorted_by_count_then_key() {
        let langs = languages();
        let ctx = BuildContext::build(&entries(), UrlResolver::new("https://example.com", &langs), "");

        assert_eq!(
            footer_tags(&ctx, "en", 0),
            vec![("go".to_string(), 2), ("rust".to_string(), 1), ("zig".to_string(), 1)]
        );
        assert_eq!(footer_tags(&ctx, "en", 1).len(), 1);
        assert!(footer_tags(&ctx, "tr", 0).is_empty());
    }

    #[test]
    fn footer_for_language() {
        let langs = languages();
        let urls = UrlResolver::new("https://example.com", &langs);
        let ctx = BuildContext::build(&entries(), urls, "");
        let mut site = SiteConfig::default();
        site.seo.footer_tag_count = 2;
        site.identity
            .social
            .insert("github".to_string(), "https://github.com/quire".to_string());
        site.identity.social.insert("blank".to_string(), " ".to_string());
        let i18n = I18n::new(langs.clone()).with_dictionary(
            "tr",
            json!({"footer": {"tagline": "Merhaba", "policies": {"privacy": "Gizlilik"}}}),
        );

        let footer = FooterBuilder::new(&site, &ctx, urls, &i18n).footer("tr");

        assert_eq!(footer.tagline, "Merhaba");
        assert_eq!(footer.policies.len(), 1);
        assert_eq!(footer.policies[0].label, "Gizlilik");
        assert_eq!(footer.policies[0].url, "/privacy/");
        assert!(!footer.has_tags);
        assert_eq!(footer.social.len(), 1);
        assert_eq!(footer.social[0].label, "GITHUB");

        let en = FooterBuilder::new(&site, &ctx, urls, &i18n).footer("en");
        assert_eq!(en.tagline, "-");
        let keys: Vec<_> = en.tags.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["go", "rust"]);
        assert_eq!(en.tags[0].url, "/tag/go/");
    }
}
