//! Harvest statistics
//!
//! Counters collected by the coordinator while it runs, plus a plain-text
//! report printed at the end of a harvest.

use chrono::{DateTime, Utc};
use std::fmt;

/// Which stage an item was skipped in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipKind {
    /// A listing page could not be fetched
    ListingPage,

    /// A detail page link could not be resolved or fetched
    DetailPage,
}

impl fmt::Display for SkipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListingPage => write!(f, "listing"),
            Self::DetailPage => write!(f, "detail"),
        }
    }
}

/// A page that was skipped, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub kind: SkipKind,
    pub url: String,
    pub reason: String,
}

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the harvest started
    pub started_at: DateTime<Utc>,

    /// When the harvest reached Done
    pub finished_at: Option<DateTime<Utc>>,

    /// Page count reported by listing page 1
    pub total_pages: u32,

    /// Listing pages fetched and scanned
    pub pages_visited: u32,

    /// Listing pages skipped after a failed fetch
    pub listing_failures: u32,

    /// Question entries found across all listing pages
    pub entries_discovered: u64,

    /// Records produced from detail pages
    pub records: u64,

    /// Detail pages skipped after a failed fetch or bad link
    pub detail_failures: u64,

    /// Entries never attempted because the deadline had passed
    pub deadline_skipped: u64,

    /// True if the overall deadline stopped the harvest early
    pub deadline_reached: bool,

    /// Every skipped page, in the order it was skipped
    pub skipped: Vec<SkippedItem>,
}

impl CrawlStatistics {
    /// Creates empty statistics stamped with the current time
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            total_pages: 0,
            pages_visited: 0,
            listing_failures: 0,
            entries_discovered: 0,
            records: 0,
            detail_failures: 0,
            deadline_skipped: 0,
            deadline_reached: false,
            skipped: Vec::new(),
        }
    }

    /// Records a listing page that could not be fetched
    pub fn record_listing_failure(&mut self, url: &str, reason: impl ToString) {
        self.listing_failures += 1;
        self.skipped.push(SkippedItem {
            kind: SkipKind::ListingPage,
            url: url.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Records a detail page that could not be fetched
    pub fn record_detail_failure(&mut self, url: &str, reason: impl ToString) {
        self.detail_failures += 1;
        self.skipped.push(SkippedItem {
            kind: SkipKind::DetailPage,
            url: url.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Records an entry left unattempted because the deadline passed
    pub fn record_deadline_skip(&mut self) {
        self.deadline_skipped += 1;
        self.deadline_reached = true;
    }

    /// Stamps the finish time
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration of a finished harvest
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Share of attempted entries that became records, as a percentage
    ///
    /// Entries skipped by the deadline were never attempted and do not count.
    pub fn success_rate(&self) -> f64 {
        let attempted = self.entries_discovered.saturating_sub(self.deadline_skipped);
        if attempted == 0 {
            return 0.0;
        }
        (self.records as f64 / attempted as f64) * 100.0
    }
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a human-readable format
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = stats.duration_seconds() {
        println!("Duration: {} seconds", duration);
    }
    if stats.deadline_reached {
        println!("Stopped early: crawl deadline reached");
    }

    println!("\nListing pages:");
    println!("  Reported: {}", stats.total_pages);
    println!("  Visited: {}", stats.pages_visited);
    println!("  Failed: {}", stats.listing_failures);

    println!("\nQuestions:");
    println!("  Discovered: {}", stats.entries_discovered);
    println!("  Harvested: {}", stats.records);
    println!("  Failed: {}", stats.detail_failures);
    if stats.deadline_skipped > 0 {
        println!("  Not attempted (deadline): {}", stats.deadline_skipped);
    }
    println!("  Success rate: {:.2}%", stats.success_rate());

    if !stats.skipped.is_empty() {
        println!("\nSkipped:");
        for item in &stats.skipped {
            println!("  [{}] {} - {}", item.kind, item.url, item.reason);
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_statistics_are_empty() {
        let stats = CrawlStatistics::new();
        assert_eq!(stats.records, 0);
        assert_eq!(stats.detail_failures, 0);
        assert!(stats.finished_at.is_none());
        assert!(stats.duration_seconds().is_none());
        assert!(stats.skipped.is_empty());
    }

    #[test]
    fn test_record_failures() {
        let mut stats = CrawlStatistics::new();
        stats.record_listing_failure("https://example.com/page/2/", "HTTP 500");
        stats.record_detail_failure("https://example.com/q/1/", "timeout");
        stats.record_detail_failure("https://example.com/q/2/", "HTTP 404");

        assert_eq!(stats.listing_failures, 1);
        assert_eq!(stats.detail_failures, 2);
        assert_eq!(stats.skipped.len(), 3);
        assert_eq!(stats.skipped[0].kind, SkipKind::ListingPage);
        assert_eq!(stats.skipped[2].reason, "HTTP 404");
    }

    #[test]
    fn test_success_rate() {
        let mut stats = CrawlStatistics::new();
        stats.entries_discovered = 10;
        stats.records = 8;

        assert!((stats.success_rate() - 80.0).abs() < 0.01);
    }

    #[test]
    fn test_success_rate_ignores_deadline_skips() {
        let mut stats = CrawlStatistics::new();
        stats.entries_discovered = 10;
        stats.records = 4;
        for _ in 0..6 {
            stats.record_deadline_skip();
        }

        assert_eq!(stats.deadline_skipped, 6);
        assert!(stats.deadline_reached);
        assert!((stats.success_rate() - 100.0).abs() < 0.01);
        assert!(stats.skipped.is_empty());
    }

    #[test]
    fn test_success_rate_no_entries() {
        let stats = CrawlStatistics::new();
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_finish_sets_duration() {
        let mut stats = CrawlStatistics::new();
        stats.finish();
        assert!(stats.duration_seconds().unwrap() >= 0);
    }
}
