//! Static site builder.

use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use quire_content::ContentEntry;

use crate::config::ProjectConfig;
use crate::context::BuildContext;
use crate::dynamic::DynamicCollectionBuilder;
use crate::i18n::I18n;
use crate::pages::{PageRegistry, RenderedPage, WriteMeta};
use crate::plugins::{Hook, PluginContext, PluginEngine, PluginRegistry};
use crate::render::{PageRenderer, RenderError};
use crate::static_html::{
    apply_language_metadata, localized_index_path, static_html_files, transform_html, version_token,
};
use crate::templates::TemplateEngine;
use crate::url::UrlResolver;

/// Configuration for building a site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Project root
    pub root_dir: PathBuf,

    /// Config file, relative to the root
    pub config_file: PathBuf,

    /// Output directory; overrides `[paths] output`
    pub output_dir: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            config_file: PathBuf::from("quire.toml"),
            output_dir: None,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of HTML files written
    pub pages: usize,

    /// Number of taxonomy collections across all languages
    pub collections: usize,

    /// Number of asset files copied
    pub assets: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to load configuration: {0}")]
    ConfigError(String),

    #[error("Failed to read sources: {0}")]
    ReadError(String),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to render component: {0}")]
    ComponentError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

impl From<RenderError> for BuildError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::Template(e) => Self::TemplateError(e.to_string()),
            component @ RenderError::Component { .. } => Self::ComponentError(component.to_string()),
        }
    }
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    plugins: PluginEngine,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            plugins: PluginEngine::default(),
        }
    }

    /// Run `plugins` at the build hooks.
    pub fn with_plugins(mut self, plugins: PluginRegistry) -> Self {
        self.plugins = PluginEngine::new(plugins);
        self
    }

    /// Build the site.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let root = self.config.root_dir.as_path();

        let project = ProjectConfig::load(&root.join(&self.config.config_file))
            .await
            .map_err(|e| BuildError::ConfigError(e.to_string()))?;
        let src_dir = root.join(&project.paths.src);
        let output_dir = match &self.config.output_dir {
            Some(dir) => dir.clone(),
            None => root.join(&project.paths.output),
        };

        let i18n = I18n::load(project.i18n.clone(), &src_dir.join("i18n"))
            .await
            .map_err(|e| BuildError::ConfigError(e.to_string()))?;
        let mut templates = TemplateEngine::new();
        let loaded = templates
            .load_project(&src_dir)
            .await
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;
        tracing::debug!("Loaded {} project templates", loaded);

        let (src, out) = (src_dir.as_path(), output_dir.as_path());
        let hook = move |hook| PluginContext::new(hook, root, src, out);

        clean_output(&output_dir).await?;
        self.plugins.execute(&hook(Hook::DistClean));

        let assets = copy_assets(&src_dir.join("assets"), &output_dir.join("assets")).await?;
        tracing::debug!("Copied {} assets", assets);
        self.plugins.execute(&hook(Hook::AssetsCopy));

        let entries = load_content(&src_dir.join("content")).await?;
        tracing::info!("Loaded {} content files", entries.len());
        self.plugins.execute(&hook(Hook::ContentLoad).with_entries(&entries));

        let languages = i18n.languages();
        let urls = UrlResolver::new(&project.site.identity.url, languages);
        let ctx = BuildContext::build(&entries, urls, &project.site.seo.default_image);
        self.plugins.execute(&hook(Hook::ContentReady).with_entries(&entries).with_build(&ctx));

        let version = version_token();
        let renderer = PageRenderer::new(&templates, &project.site, &ctx, urls, &i18n, &version);
        let mut registry = PageRegistry::new();
        let mut claimed: Vec<String> = Vec::new();

        for entry in entries.iter().filter(|e| e.is_valid && !e.is_draft()) {
            for page in renderer.render_content(entry)? {
                claimed.extend(renderer.claimed_paths(&page, entry.header.slug()));
                registry.add(page);
            }
        }

        for dynamic in DynamicCollectionBuilder::new(&project.site, &ctx, urls, &i18n).pages() {
            let page = renderer.render_dynamic(&dynamic)?;
            claimed.extend(renderer.claimed_paths(&page, dynamic.slug()));
            registry.add(page);
        }

        self.copy_static_html(&src_dir, &version, urls, &claimed, &mut registry)
            .await?;

        let pages = registry
            .flush(&output_dir)
            .await
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages,
            collections: ctx.collection_count(),
            assets,
            duration_ms: duration.as_millis() as u64,
            output_dir,
        })
    }

    /// Register top-level `src/*.html` files no generated page claims. `index.html` is
    /// emitted once per supported language.
    async fn copy_static_html(
        &self,
        src_dir: &Path,
        version: &str,
        urls: UrlResolver<'_>,
        claimed: &[String],
        registry: &mut PageRegistry,
    ) -> Result<(), BuildError> {
        let files = static_html_files(src_dir).map_err(|e| BuildError::ReadError(e.to_string()))?;
        let languages = urls.languages();

        for path in files {
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            if claimed.contains(&name) {
                tracing::debug!("Skipping {}: shadowed by a generated page", name);
                continue;
            }

            let raw = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;
            let html = transform_html(&raw, version);
            let source = path.display().to_string();

            if name != "index.html" {
                registry.add(static_page(html, name, &source, &languages.default));
                continue;
            }

            for lang in &languages.supported {
                let output_path = localized_index_path(lang, languages);
                if claimed.contains(&output_path) {
                    continue;
                }
                let localized = apply_language_metadata(&html, lang, &urls);
                let mut page = static_page(localized, output_path, &source, lang);
                page.meta = page.meta.input_bytes(html.len());
                registry.add(page);
            }
        }

        Ok(())
    }
}

fn static_page(html: String, output_path: String, source: &str, lang: &str) -> RenderedPage {
    let input_bytes = html.len();
    RenderedPage {
        html,
        output_path,
        source_path: source.to_string(),
        lang: lang.to_string(),
        template: String::new(),
        layout: String::new(),
        meta: WriteMeta::new("COPY_HTML", "static", source, lang).input_bytes(input_bytes),
    }
}

/// Remove and recreate the output directory.
async fn clean_output(output_dir: &Path) -> Result<(), BuildError> {
    if tokio::fs::try_exists(output_dir).await.unwrap_or(false) {
        tokio::fs::remove_dir_all(output_dir)
            .await
            .map_err(|e| BuildError::WriteError(e.to_string()))?;
    }
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| BuildError::WriteError(e.to_string()))
}

/// Copy every file under `from` into `to`. A missing source directory copies nothing.
async fn copy_assets(from: &Path, to: &Path) -> Result<usize, BuildError> {
    if !from.is_dir() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in WalkDir::new(from).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let dest = to.join(relative);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BuildError::WriteError(e.to_string()))?;
        }
        tokio::fs::copy(entry.path(), &dest)
            .await
            .map_err(|e| BuildError::WriteError(format!("{}: {}", dest.display(), e)))?;
        count += 1;
    }

    Ok(count)
}

/// Every `*.md` under `content_dir`, in path order. Unparseable front-matter yields an
/// invalid entry rather than an error.
async fn load_content(content_dir: &Path) -> Result<Vec<ContentEntry>, BuildError> {
    if !content_dir.is_dir() {
        tracing::warn!("No content directory at {}", content_dir.display());
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(content_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("md"))
        .map(|e| e.path().to_path_buf())
        .collect();
    paths.sort();

    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;
        entries.push(ContentEntry::parse_or_invalid(&source, &path));
    }

    Ok(entries)
}
