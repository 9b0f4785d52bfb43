//! Content model for quire sites.
//!
//! This crate turns raw markdown sources into [`ContentEntry`] values: YAML front-matter
//! is extracted into a loosely-typed [`FrontMatter`] mapping and exposed through
//! [`ContentHeader`], whose getters never fail on missing or mistyped fields.

pub mod entry;
pub mod format;
pub mod frontmatter;
pub mod header;
pub mod summary;

pub use entry::ContentEntry;
pub use format::{collation_cmp, is_truthy, parse_date, slugify};
pub use frontmatter::{extract_frontmatter, FrontMatter, FrontmatterError};
pub use header::{Alternate, ContentHeader};
pub use summary::ContentSummary;
