//! Static site generator for quire.
//!
//! Loads markdown content, files it into per-language taxonomies (home, categories, tags,
//! series), paginates listings, resolves canonical and alternate-language URLs, and renders
//! every page through minijinja layouts into an output tree.

pub mod builder;
pub mod collections;
pub mod config;
pub mod context;
pub mod dynamic;
pub mod footer;
pub mod i18n;
pub mod listing;
pub mod markdown;
pub mod menu;
pub mod meta;
pub mod pages;
pub mod pagination;
pub mod plugins;
pub mod render;
pub mod series;
pub mod static_html;
pub mod templates;
pub mod url;
pub mod view;

pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use collections::{CollectionEntry, CollectionKind};
pub use config::{ConfigError, ProjectConfig, SiteConfig};
pub use context::BuildContext;
pub use i18n::{I18n, LanguageConfig, Translator};
pub use listing::{Listing, ListingResolver};
pub use pagination::Paginator;
pub use plugins::{Hook, Plugin, PluginContext, PluginError, PluginRegistry};
pub use templates::{TemplateEngine, TemplateError};
pub use url::UrlResolver;
