//! Crawler module for fetching and extracting question records
//!
//! This module contains the harvest pipeline:
//! - Page fetching behind the `PageFetcher` capability
//! - Listing page extraction (flat motif scanning)
//! - Detail page extraction (document tree queries)
//! - Pagination planning
//! - Overall crawl coordination

mod coordinator;
mod detail;
mod fetcher;
mod listing;
mod pagination;

pub use coordinator::{run_harvest, Coordinator, CrawlOutcome, HarvestSettings};
pub use detail::{ContainerSelectors, DetailExtractor, DocumentQuery, ScraperDocument};
pub use fetcher::{build_http_client, FetchError, HttpFetcher, PageFetcher};
pub use listing::{ListingEntries, ListingExtractor};
pub use pagination::{PagePlan, PaginationPlanner};

use thiserror::Error;

/// Errors raised while setting up the extractors
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid heading tag: '{0}'")]
    InvalidHeadingTag(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Pattern '{0}' has no capture group for the page count")]
    MissingCaptureGroup(String),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}
