use std::path::{Path, PathBuf};

use crate::frontmatter::{extract_frontmatter, FrontMatter, FrontmatterError};
use crate::header::ContentHeader;

/// One content source file: normalized header, markdown body and origin.
#[derive(Debug, Clone)]
pub struct ContentEntry {
    pub header: ContentHeader,
    pub body: String,
    pub source_path: PathBuf,
    pub is_valid: bool,
}

impl ContentEntry {
    pub fn new(front: FrontMatter, body: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            header: ContentHeader::new(front),
            body: body.into(),
            source_path: source_path.into(),
            is_valid: true,
        }
    }

    /// Parse a markdown source with a front-matter block.
    pub fn parse(source: &str, source_path: impl AsRef<Path>) -> Result<Self, FrontmatterError> {
        let (front, body) = extract_frontmatter(source)?;
        Ok(Self::new(front, body, source_path.as_ref()))
    }

    /// Placeholder for a source whose front-matter could not be parsed.
    pub fn invalid(source_path: impl Into<PathBuf>) -> Self {
        Self {
            header: ContentHeader::default(),
            body: String::new(),
            source_path: source_path.into(),
            is_valid: false,
        }
    }

    /// Parse a source, degrading to an invalid entry instead of failing.
    pub fn parse_or_invalid(source: &str, source_path: impl AsRef<Path>) -> Self {
        let source_path = source_path.as_ref();
        match Self::parse(source, source_path) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(
                    source = %source_path.display(),
                    error = %e,
                    "Skipping content with malformed front-matter"
                );
                Self::invalid(source_path)
            }
        }
    }

    pub fn is_published(&self) -> bool {
        self.header.status() == "published"
    }

    pub fn is_draft(&self) -> bool {
        self.header.status() == "draft"
    }

    /// Eligible for menus, collections and the content index.
    pub fn is_eligible(&self) -> bool {
        self.is_valid && self.is_published()
    }

    pub fn is_post_template(&self) -> bool {
        self.header.template() == "post"
    }
}
