//! Template engine for layouts, content templates, partials and components.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use minijinja::{escape_formatter, AutoEscape, Environment, Error, ErrorKind, Output, State};
use serde::Serialize;
use serde_json::Value;
use walkdir::WalkDir;

use quire_components::{ComponentError, ComponentRenderer};

use crate::markdown::html_escape;

/// Errors raised while loading or rendering templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Failed to load template {path}: {message}")]
    Load { path: String, message: String },

    #[error("Failed to render template {name}: {message}")]
    Render { name: String, message: String },
}

/// Template engine using minijinja.
///
/// Templates live in four namespaces, `layouts/`, `templates/`, `partials/` and
/// `components/`. Built-in defaults are registered first and project files replace them.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_formatter(html_formatter);

        for (name, source) in BUILTIN_TEMPLATES {
            env.add_template_owned(name.to_string(), source.to_string())
                .expect("Failed to add built-in template");
        }

        Self { env }
    }

    /// Register (or replace) a template.
    pub fn add(&mut self, name: impl Into<String>, source: impl Into<String>) -> Result<(), TemplateError> {
        let name = name.into();
        self.env
            .add_template_owned(name.clone(), source.into())
            .map_err(|e| TemplateError::Load {
                path: name,
                message: e.to_string(),
            })
    }

    /// Load project templates from `src_dir`.
    ///
    /// - `layouts/<name>.html` becomes `layouts/<name>`, except `layouts/_<name>.html` which
    ///   becomes the partial `partials/<name>`
    /// - `templates/<name>.html` becomes `templates/<name>`
    /// - `components/**/<name>.html` becomes `components/<path>/<name>`
    ///
    /// Returns the number of templates loaded.
    pub async fn load_project(&mut self, src_dir: &Path) -> Result<usize, TemplateError> {
        let mut count = 0;

        for namespace in ["layouts", "templates", "components"] {
            let dir = src_dir.join(namespace);
            for (path, relative) in html_files(&dir) {
                let name = match (namespace, relative.strip_prefix('_')) {
                    ("layouts", Some(partial)) => format!("partials/{partial}"),
                    _ => format!("{namespace}/{relative}"),
                };

                let source = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| TemplateError::Load {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })?;
                self.add(name.clone(), source)?;
                tracing::debug!("Loaded template {} from {}", name, path.display());
                count += 1;
            }
        }

        Ok(count)
    }

    pub fn has(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    /// Render `name` with `ctx`. A missing template is an error, never an empty string.
    pub fn render<S: Serialize>(&self, name: &str, ctx: &S) -> Result<String, TemplateError> {
        let tmpl = self.env.get_template(name).map_err(|e| match e.kind() {
            ErrorKind::TemplateNotFound => TemplateError::NotFound(name.to_string()),
            _ => TemplateError::Load {
                path: name.to_string(),
                message: e.to_string(),
            },
        })?;

        tmpl.render(ctx).map_err(|e| TemplateError::Render {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRenderer for TemplateEngine {
    fn render_component(&self, name: &str, ctx: &Value) -> Result<String, ComponentError> {
        self.render(name, ctx).map_err(|e| match e {
            TemplateError::NotFound(name) => ComponentError::NotFound(name),
            other => ComponentError::Render {
                name: name.to_string(),
                message: other.to_string(),
            },
        })
    }
}

/// HTML escaping that leaves `/` alone so URLs stay readable.
fn html_formatter(out: &mut Output<'_>, state: &State<'_, '_>, value: &minijinja::Value) -> Result<(), Error> {
    let escape = matches!(state.auto_escape(), AutoEscape::Html)
        && !value.is_safe()
        && !value.is_undefined()
        && !value.is_none();
    if !escape {
        return escape_formatter(out, state, value);
    }

    out.write_str(&html_escape(&value.to_string()))
        .map_err(|e| Error::new(ErrorKind::WriteFailure, e.to_string()))
}

/// `.html` files under `dir` with their extension-less, `/`-separated relative names, sorted.
fn html_files(dir: &Path) -> Vec<(PathBuf, String)> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut files: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("html"))
        .filter_map(|e| {
            let relative = e.path().strip_prefix(dir).ok()?.with_extension("");
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            Some((e.path().to_path_buf(), name))
        })
        .collect();

    files.sort_by(|a, b| a.1.cmp(&b.1));
    files
}

const BUILTIN_TEMPLATES: [(&str, &str); 8] = [
    ("layouts/default", DEFAULT_LAYOUT),
    ("templates/page", PAGE_TEMPLATE),
    ("templates/post", POST_TEMPLATE),
    ("templates/collection", COLLECTION_TEMPLATE),
    ("templates/home", HOME_TEMPLATE),
    ("templates/category", CATEGORY_TEMPLATE),
    ("partials/listing", LISTING_PARTIAL),
    ("partials/pagination", PAGINATION_PARTIAL),
];

const DEFAULT_LAYOUT: &str = r##"<!DOCTYPE html>
<html lang="{{ lang }}" data-theme="{{ theme }}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ page.title }}</title>
  <meta name="description" content="{{ page.description }}">
  <meta name="robots" content="{{ page.robots }}">
  <meta name="language" content="{{ locale }}" data-meta-language>
  <meta name="theme-color" content="{{ site.theme_color }}">
  <link rel="canonical" href="{{ page.canonical }}" data-canonical>
  {% for link in page.alternate_links %}<link rel="alternate" hreflang="{{ link.hreflang }}" href="{{ link.url }}">
  {% endfor %}<link rel="alternate" hreflang="x-default" href="{{ page.alternates.default }}">
  <meta property="og:title" content="{{ page.og.title }}">
  <meta property="og:description" content="{{ page.og.description }}">
  <meta property="og:type" content="{{ page.og.type }}">
  <meta property="og:url" content="{{ page.og.url }}" data-og-url>
  <meta property="og:image" content="{{ page.og.image }}">
  <meta property="og:locale" content="{{ page.og.locale }}" data-og-locale>
  {% for locale in page.og.alt_locale %}<meta property="og:locale:alternate" content="{{ locale }}" data-og-locale-alt />
  {% endfor %}<meta name="twitter:card" content="{{ page.twitter.card }}">
  <meta name="twitter:title" content="{{ page.twitter.title }}">
  <meta name="twitter:description" content="{{ page.twitter.description }}">
  <meta name="twitter:image" content="{{ page.twitter.image }}">
  <meta name="twitter:url" content="{{ page.twitter.url }}" data-twitter-url>
  <script type="application/ld+json">{{ page.structured_data | safe }}</script>
  <link rel="stylesheet" href="/output.css">
</head>
<body>
  <header class="site-header">
    <a class="site-title" href="{{ site.home }}">{{ site.title }}</a>
    <nav class="site-menu">
      {% for item in menu.items %}<a href="{{ item.url }}"{% if item.is_active %} aria-current="page"{% endif %}>{{ item.label }}</a>
      {% endfor %}
    </nav>
    <nav class="language-switch">
      {% for link in page.alternate_links %}<a href="{{ link.url }}" hreflang="{{ link.hreflang }}">{{ link.label }}</a>
      {% endfor %}
    </nav>
  </header>
  <main>
    {{ content | safe }}
  </main>
  <footer class="site-footer">
    {% if footer.has_policies %}<ul class="footer-policies">
      {% for link in footer.policies %}<li><a href="{{ link.url }}">{{ link.label }}</a></li>
      {% endfor %}
    </ul>{% endif %}
    {% if footer.has_tags %}<ul class="footer-tags">
      {% for link in footer.tags %}<li><a href="{{ link.url }}">{{ link.label }}</a></li>
      {% endfor %}
    </ul>{% endif %}
    {% if footer.has_social %}<ul class="footer-social">
      {% for link in footer.social %}<li><a href="{{ link.url }}" rel="me">{{ link.label }}</a></li>
      {% endfor %}
    </ul>{% endif %}
    <p class="tagline">{{ footer.tagline }}</p>
    <p class="copyright">&copy; {{ site.year }} {{ site.author }}</p>
  </footer>
  {% if debug %}<script type="application/json" id="quire-debug">{{ debug | safe }}</script>{% endif %}
  <script src="/output.js" defer></script>
</body>
</html>"##;

const PAGE_TEMPLATE: &str = r##"<article class="page">
  <h1>{{ front.title }}</h1>
  <div class="content">
    {{ content | safe }}
  </div>
</article>"##;

const POST_TEMPLATE: &str = r##"<article class="post">
  <header>
    <h1>{{ front.title }}</h1>
    {% if front.date_display %}<time datetime="{{ front.date }}">{{ front.date_display }}</time>{% endif %}
    {% if front.category_url %}<a class="category" href="{{ front.category_url }}">{{ front.category_label }}</a>{% endif %}
  </header>
  {% if front.cover %}<figure class="cover">
    <img src="{{ front.cover }}" alt="{{ front.cover_alt }}">
    {% if front.coverCaption %}<figcaption>{{ front.coverCaption }}</figcaption>{% endif %}
  </figure>{% endif %}
  {% if front.series_listing.has_items %}<nav class="series">
    {% if front.series_listing.has_label %}<h2>{{ front.series_listing.label }}</h2>{% endif %}
    <ol>
    {% for item in front.series_listing.items %}<li{% if item.is_current %} aria-current="page"{% endif %}>{% if item.has_url %}<a href="{{ item.url }}">{{ item.label }}</a>{% else %}{{ item.label }}{% endif %}</li>
    {% endfor %}</ol>
  </nav>{% endif %}
  <div class="content">
    {{ content | safe }}
  </div>
  {% if front.has_tags %}<ul class="tags">
    {% for tag in front.tag_links %}<li><a href="{{ tag.url }}">{{ tag.label }}</a></li>
    {% endfor %}
  </ul>{% endif %}
</article>"##;

const COLLECTION_TEMPLATE: &str = r##"<section class="collection">
  <h1>{{ front.title }}</h1>
  <div class="content">
    {{ content | safe }}
  </div>
  {% include "partials/listing" %}
  {% include "partials/pagination" %}
</section>"##;

const HOME_TEMPLATE: &str = r##"<section class="home">
  <div class="content">
    {{ content | safe }}
  </div>
  {% include "partials/listing" %}
  {% include "partials/pagination" %}
</section>"##;

const CATEGORY_TEMPLATE: &str = r##"<section class="collection collection-{{ listing.type }}">
  <h1>{{ listing.heading or front.title }}</h1>
  {% include "partials/listing" %}
  {% include "partials/pagination" %}
</section>"##;

const LISTING_PARTIAL: &str = r##"{% if listing.has_items %}<ul class="listing">
  {% for item in listing.items %}<li class="listing-item">
    <a href="{{ item.canonical }}">{{ item.title }}</a>
    {% if item.date_display %}<time datetime="{{ item.date }}">{{ item.date_display }}</time>{% endif %}
    {% if item.description %}<p>{{ item.description }}</p>{% endif %}
  </li>
  {% endfor %}
</ul>{% else %}<p class="listing-empty">{{ listing.empty_message }}</p>{% endif %}"##;

const PAGINATION_PARTIAL: &str = r##"{% if listing.has_pagination %}<nav class="pagination">
  {% if listing.has_prev %}<a rel="prev" href="{{ listing.prev_url }}">&larr;</a>{% endif %}
  <span>{{ listing.page }} / {{ listing.total_pages }}</span>
  {% if listing.has_next %}<a rel="next" href="{{ listing.next_url }}">&rarr;</a>{% endif %}
</nav>{% endif %}"##;
