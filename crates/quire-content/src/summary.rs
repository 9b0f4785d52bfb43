use serde::Serialize;

use crate::header::ContentHeader;

/// Display projection of an entry used by listings and collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub lang: String,
    pub canonical: String,
    pub date: String,
    pub updated: String,
    pub description: String,
    pub cover: String,
    pub cover_alt: String,
    pub cover_caption: String,
    pub reading_time: u32,
    pub date_display: Option<String>,
}

impl ContentSummary {
    /// Project a header, applying `default_cover` when the entry has none.
    pub fn from_header(header: &ContentHeader, default_cover: &str, date_pattern: &str) -> Self {
        let cover = match header.cover() {
            "" => default_cover,
            cover => cover,
        };

        Self {
            id: header.id().to_string(),
            title: header.title().to_string(),
            slug: header.slug().to_string(),
            lang: header.lang().to_string(),
            canonical: header.canonical().to_string(),
            date: header.date(),
            updated: header.updated(),
            description: header.description().to_string(),
            cover: cover.to_string(),
            cover_alt: header.cover_alt().to_string(),
            cover_caption: header.cover_caption().to_string(),
            reading_time: header.reading_time(),
            date_display: header.date_display(date_pattern),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrontMatter;
    use pretty_assertions::assert_eq;

    #[test]
    fn applies_default_cover() {
        let mut front = FrontMatter::new();
        front.insert("id", "a");
        front.insert("title", "A");
        front.insert("date", "2024-06-01");
        let header = ContentHeader::new(front);

        let summary = ContentSummary::from_header(&header, "/img/default.png", "%d.%m.%Y");

        assert_eq!(summary.cover, "/img/default.png");
        assert_eq!(summary.date_display.as_deref(), Some("01.06.2024"));
        assert_eq!(summary.id, "a");
    }
}
