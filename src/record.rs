//! Record types produced by the harvest pipeline

/// One question link discovered on a listing page
///
/// The title is the raw anchor text up to the first markup boundary; nested
/// markup inside the anchor is not followed and entities are not decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Anchor text of the question heading
    pub title: String,

    /// Raw `href` value as it appeared in the markup
    pub detail_link: String,
}

/// Content extracted from a single detail page
///
/// Both fields are empty strings when the page lacks the matching container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailContent {
    /// Concatenated text of the answer container
    pub answer: String,

    /// Link target of the first anchor in the source container
    pub source_link: String,
}

/// A harvested question with its answer and cited source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub title: String,
    pub answer: String,
    pub source_link: String,
}

impl Record {
    /// Combines a listing entry with the content of its detail page
    pub fn from_parts(entry: ListingEntry, content: DetailContent) -> Self {
        Self {
            title: entry.title,
            answer: content.answer,
            source_link: content.source_link,
        }
    }
}
