//! Project configuration (`quire.toml`).

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::i18n::LanguageConfig;

/// Placeholder replaced by the taxonomy key in slug patterns.
pub const KEY_PLACEHOLDER: &str = "{{key}}";

/// Fallback page size when the configured one is not positive.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Collection config key whose pages tag links point at.
pub const TAGS_COLLECTION: &str = "tags";

const DEFAULT_TAG_SLUG_PATTERN: &str = "tag/{{key}}";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid language configuration: {0}")]
    Languages(String),
}

/// The whole `quire.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub paths: PathsConfig,
    pub site: SiteConfig,
    pub i18n: LanguageConfig,
}

impl ProjectConfig {
    /// Parse configuration text. `origin` only labels errors.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let mut config: ProjectConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse {
                path: origin.to_string(),
                message: e.to_string(),
            })?;
        config.i18n.normalize()?;
        Ok(config)
    }

    /// Load configuration from `path`, falling back to defaults when the file is missing.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::from_toml_str(&content, &path.display().to_string())
    }
}

/// Source and output directories.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub src: PathBuf,
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::from("src"),
            output: PathBuf::from("dist"),
        }
    }
}

/// Site-wide settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub identity: Identity,
    pub pagination: PaginationConfig,
    /// Synthetic taxonomy pages, in declaration order.
    pub collections: IndexMap<String, CollectionTypeConfig>,
    pub seo: SeoConfig,
    pub build: BuildSettings,
    pub features: IndexMap<String, bool>,
}

impl SiteConfig {
    /// Slug of the generated page for `key` under the `config_key` collection in `lang`.
    ///
    /// Links and generated pages both go through here, so they always agree.
    pub fn collection_slug(&self, config_key: &str, key: &str, lang: &str) -> String {
        let pattern = self
            .collections
            .get(config_key)
            .and_then(|config| config.slug_pattern.get(lang))
            .map(String::as_str)
            .or_else(|| default_slug_pattern(config_key));
        apply_slug_pattern(pattern, key)
    }

    /// Slug of the tag page for `key` in `lang`.
    pub fn tag_slug(&self, key: &str, lang: &str) -> String {
        self.collection_slug(TAGS_COLLECTION, key, lang)
    }
}

fn default_slug_pattern(config_key: &str) -> Option<&'static str> {
    (config_key == TAGS_COLLECTION).then_some(DEFAULT_TAG_SLUG_PATTERN)
}

/// Substitute `key` into a slug pattern; no pattern means the key itself.
pub fn apply_slug_pattern(pattern: Option<&str>, key: &str) -> String {
    match pattern {
        Some(pattern) if pattern.contains(KEY_PLACEHOLDER) => pattern.replacen(KEY_PLACEHOLDER, key, 1),
        Some(pattern) => pattern.to_string(),
        None => key.to_string(),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub author: String,
    pub url: String,
    pub email: String,
    pub theme_color: String,
    /// Social profile URLs keyed by network name.
    pub social: IndexMap<String, String>,
}

impl Identity {
    /// Non-blank social profile URLs in declaration order.
    pub fn social_profiles(&self) -> Vec<String> {
        self.social
            .values()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub page_size: i64,
    /// Pagination word per language, e.g. `page` or `sayfa`.
    pub segment: IndexMap<String, String>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE as i64,
            segment: IndexMap::new(),
        }
    }
}

impl PaginationConfig {
    /// Positive page size, falling back to [`DEFAULT_PAGE_SIZE`].
    pub fn effective_page_size(&self) -> usize {
        if self.page_size > 0 {
            self.page_size as usize
        } else {
            DEFAULT_PAGE_SIZE
        }
    }
}

/// One synthetic taxonomy, e.g. the tag index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionTypeConfig {
    pub template: String,
    pub slug_pattern: IndexMap<String, String>,
    /// Collection entry types accepted on these pages.
    pub types: Vec<String>,
    /// Cross-language key pairs: `key -> (lang -> key)`.
    pub pairs: IndexMap<String, IndexMap<String, String>>,
}

impl Default for CollectionTypeConfig {
    fn default() -> Self {
        Self {
            template: "category".to_string(),
            slug_pattern: IndexMap::new(),
            types: Vec::new(),
            pairs: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoConfig {
    pub default_image: String,
    /// Maximum tags in the footer; 0 keeps all.
    pub footer_tag_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Embed the serialized page view in every page.
    pub debug: bool,
}
