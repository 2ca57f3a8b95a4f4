//! Listing page extraction
//!
//! Listing pages are scanned as flat text rather than parsed as a tree. Each
//! question appears as a fixed motif, `<h2><a ... href="LINK" ...>TITLE</a></h2>`,
//! and the extractor repeatedly finds the next motif in the text that has not
//! been consumed yet.
//!
//! The title capture stops at the first `<` inside the anchor. A title that
//! contains nested markup (`<em>`, `<span>`, ...) does not match the motif at
//! all, and entities such as `&amp;` are kept verbatim.

use crate::crawler::ExtractionError;
use crate::record::ListingEntry;
use regex::Regex;

/// Extracts question entries from listing page markup
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    motif: Regex,
}

impl ListingExtractor {
    /// Builds an extractor for motifs wrapped in `<heading_tag>`
    pub fn new(heading_tag: &str) -> Result<Self, ExtractionError> {
        if heading_tag.is_empty() || !heading_tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ExtractionError::InvalidHeadingTag(heading_tag.to_string()));
        }

        let pattern = format!(
            r#"<{tag}><a[^>]+href="([^"]+)"[^>]*>([^<]+)</a></{tag}>"#,
            tag = heading_tag
        );

        Ok(Self {
            motif: Regex::new(&pattern)?,
        })
    }

    /// Lazily yields the entries of `markup` in document order
    ///
    /// The sequence is pure over its input: iterating twice over the same
    /// markup yields the same entries.
    pub fn entries<'a>(&'a self, markup: &'a str) -> ListingEntries<'a> {
        ListingEntries {
            motif: &self.motif,
            remaining: markup,
            steps_left: markup.len() + 1,
        }
    }

    /// Collects every entry of `markup` in document order
    pub fn extract_entries(&self, markup: &str) -> Vec<ListingEntry> {
        self.entries(markup).collect()
    }
}

/// Cursor over the unconsumed tail of a listing page
///
/// Every yielded entry advances the cursor past the end of its match. Because
/// each step consumes at least one byte, at most `len + 1` steps can occur;
/// the step budget turns any violation of that into termination instead of a
/// loop.
#[derive(Debug, Clone)]
pub struct ListingEntries<'a> {
    motif: &'a Regex,
    remaining: &'a str,
    steps_left: usize,
}

impl<'a> Iterator for ListingEntries<'a> {
    type Item = ListingEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.steps_left == 0 {
            return None;
        }
        self.steps_left -= 1;

        let captures = match self.motif.captures(self.remaining) {
            Some(captures) => captures,
            None => {
                self.finish();
                return None;
            }
        };

        let consumed = captures.get(0).map(|m| m.end()).unwrap_or(0);
        if consumed == 0 {
            tracing::warn!("Listing motif matched without advancing; stopping scan");
            self.finish();
            return None;
        }

        let detail_link = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let title = captures.get(2).map(|m| m.as_str()).unwrap_or_default();

        self.remaining = &self.remaining[consumed..];

        Some(ListingEntry {
            title: title.to_string(),
            detail_link: detail_link.to_string(),
        })
    }
}

impl<'a> ListingEntries<'a> {
    fn finish(&mut self) {
        self.remaining = "";
        self.steps_left = 0;
    }
}
