//! Site build command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quire_static::{BuildConfig, StaticBuilder};

/// Split a config path into the project root and the file name relative to it.
fn project_paths(config: &Path) -> (PathBuf, PathBuf) {
    let root = match config.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file = config
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("quire.toml"));
    (root, file)
}

/// Run the build command.
pub async fn run(config: &Path, output: Option<PathBuf>) -> Result<()> {
    tracing::info!("Building site...");

    let (root_dir, config_file) = project_paths(config);
    let build = BuildConfig {
        root_dir,
        config_file,
        output_dir: output,
    };

    let result = StaticBuilder::new(build)
        .build()
        .await
        .with_context(|| format!("Build failed for {}", config.display()))?;

    tracing::info!(
        "Built {} pages across {} collections in {}ms",
        result.pages,
        result.collections,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_config_path() {
        assert_eq!(
            project_paths(Path::new("quire.toml")),
            (PathBuf::from("."), PathBuf::from("quire.toml"))
        );
        assert_eq!(
            project_paths(Path::new("site/custom.toml")),
            (PathBuf::from("site"), PathBuf::from("custom.toml"))
        );
    }
}
