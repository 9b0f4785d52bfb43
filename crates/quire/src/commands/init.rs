//! Scaffold a new site.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing quire...");

    let root = match config.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let config_name = config
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("quire.toml");

    let created = scaffold(root, config_name, yes)?;

    tracing::info!("Initialization complete! Created {} files.", created);
    tracing::info!("Run 'quire build' to build the site.");

    Ok(())
}

/// Write the starter files under `root`. Existing files are kept unless `overwrite` is set.
fn scaffold(root: &Path, config_name: &str, overwrite: bool) -> Result<usize> {
    let src_dir = root.join("src");
    if src_dir.exists() && !overwrite {
        tracing::warn!("src/ directory already exists. Use --yes to overwrite.");
        return Ok(0);
    }

    let files = [
        (config_name, DEFAULT_CONFIG),
        ("src/content/blog.md", DEFAULT_BLOG),
        ("src/content/posts/hello-world.md", DEFAULT_POST),
        ("src/i18n/en.toml", DEFAULT_DICTIONARY),
    ];

    let mut created = 0;
    for (relative, content) in files {
        let path = root.join(relative);
        if path.exists() && !overwrite {
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", relative))?;
        tracing::info!("Created {}", relative);
        created += 1;
    }

    Ok(created)
}

const DEFAULT_CONFIG: &str = r##"# Quire configuration

[paths]
src = "src"
output = "dist"

[site.identity]
author = "Your Name"
url = "https://example.com"
theme_color = "#ffffff"

[site.pagination]
page_size = 5
segment = { en = "page" }

[site.collections.tags]
template = "category"
types = ["tag"]
slug_pattern = { en = "tag/{{key}}" }

[site.seo]
default_image = "/assets/cover.png"
footer_tag_count = 10

[i18n]
default = "en"
supported = ["en"]

[i18n.languages.en]
culture = "en-US"
og_locale = "en_US"
label = "English"
"##;

const DEFAULT_BLOG: &str = r#"---
id: blog
title: Blog
slug: blog
lang: en
status: published
template: collection
listKey: notes
order: 1
listingEmpty: No posts yet.
---

Notes, guides and announcements.
"#;

const DEFAULT_POST: &str = r#"---
id: hello-world
title: Hello, world
slug: hello-world
lang: en
status: published
template: post
category: notes
tags: [welcome]
date: 2024-01-01
description: The first post on this site.
show: false
---

# Hello, world

This post lives in `src/content/posts/`. Its front-matter files it under the `notes`
category and the `welcome` tag, and the blog page lists it.
"#;

const DEFAULT_DICTIONARY: &str = r#"[site]
title = "My Site"
description = "A site built with quire"

[menu]
blog = "Blog"

[footer]
tagline = "Built with quire."
"#;
