//! Pagination planning
//!
//! Listing page 1 carries a "page X of N" marker. The planner reads N from it
//! and derives the URL of every listing page from the canonical listing URL.

use crate::crawler::ExtractionError;
use crate::url::join_page_path;
use crate::{HarvestError, UrlResult};
use regex::Regex;
use url::Url;

/// The listing pages of one harvest run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePlan {
    total_pages: u32,
    listing_url: Url,
    page_path: String,
}

impl PagePlan {
    /// Builds a plan over `total_pages` pages rooted at `listing_url`
    pub fn new(total_pages: u32, listing_url: Url, page_path: &str) -> Self {
        Self {
            total_pages,
            listing_url,
            page_path: page_path.to_string(),
        }
    }

    /// Number of listing pages reported by the site
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// URL of listing page `index` (1-based)
    ///
    /// Page 1 (and 0) is the canonical listing URL; later pages append the
    /// page path, e.g. `https://example.com/category/maliki/page/2/`. A page
    /// path that does not join onto the listing URL is an error for that
    /// page, never a fallback to page 1.
    pub fn page_url(&self, index: u32) -> UrlResult<Url> {
        if index <= 1 {
            return Ok(self.listing_url.clone());
        }

        join_page_path(&self.listing_url, &self.page_path, index)
    }

    /// Iterates `(index, url)` for pages `1..=total_pages` in increasing order
    pub fn pages(&self) -> impl Iterator<Item = (u32, UrlResult<Url>)> + '_ {
        (1..=self.total_pages).map(move |index| (index, self.page_url(index)))
    }
}

/// Reads the page count from listing page 1
#[derive(Debug, Clone)]
pub struct PaginationPlanner {
    page_count: Regex,
    listing_url: Url,
    page_path: String,
}

impl PaginationPlanner {
    /// Builds a planner
    ///
    /// # Arguments
    ///
    /// * `pattern` - Pattern whose first capture group is the page count
    /// * `listing_url` - Canonical URL of listing page 1
    /// * `page_path` - Path appended for later pages, containing `{page}`
    pub fn new(pattern: &str, listing_url: Url, page_path: &str) -> Result<Self, ExtractionError> {
        let page_count = Regex::new(pattern)?;

        if page_count.captures_len() < 2 {
            return Err(ExtractionError::MissingCaptureGroup(pattern.to_string()));
        }

        Ok(Self {
            page_count,
            listing_url,
            page_path: page_path.to_string(),
        })
    }

    /// Canonical URL of listing page 1
    pub fn listing_url(&self) -> &Url {
        &self.listing_url
    }

    /// Finds the page count in `first_page` and builds the plan
    ///
    /// # Returns
    ///
    /// * `Ok(PagePlan)` - Page count found
    /// * `Err(HarvestError::PageCountNotFound)` - Pattern absent, or its
    ///   capture is not a non-negative integer
    pub fn plan(&self, first_page: &str) -> Result<PagePlan, HarvestError> {
        let not_found = || HarvestError::PageCountNotFound {
            url: self.listing_url.to_string(),
        };

        let captures = self.page_count.captures(first_page).ok_or_else(not_found)?;
        let count = captures.get(1).ok_or_else(not_found)?;

        let total_pages = count.as_str().trim().parse::<u32>().map_err(|e| {
            tracing::warn!("Page count '{}' is not a number: {}", count.as_str(), e);
            not_found()
        })?;

        Ok(PagePlan::new(
            total_pages,
            self.listing_url.clone(),
            &self.page_path,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner() -> PaginationPlanner {
        PaginationPlanner::new(
            r"Pg 1 of ([0-9]+)",
            Url::parse("https://example.com/category/maliki/").unwrap(),
            "page/{page}/",
        )
        .unwrap()
    }

    #[test]
    fn test_plan_reads_page_count() {
        let plan = planner()
            .plan("<span class=\"pages\">Pg 1 of 42</span>")
            .unwrap();
        assert_eq!(plan.total_pages(), 42);
    }

    #[test]
    fn test_plan_uses_first_occurrence() {
        let plan = planner().plan("Pg 1 of 3 ... Pg 1 of 9").unwrap();
        assert_eq!(plan.total_pages(), 3);
    }

    #[test]
    fn test_default_pattern_skips_non_ascii_digits() {
        let planner = PaginationPlanner::new(
            &crate::config::ExtractionConfig::default().page_count_pattern,
            Url::parse("https://example.com/category/maliki/").unwrap(),
            "page/{page}/",
        )
        .unwrap();

        let plan = planner.plan("Pg 1 of \u{663}\u{664} ... Pg 1 of 34").unwrap();
        assert_eq!(plan.total_pages(), 34);
    }

    #[test]
    fn test_missing_pattern_is_page_count_not_found() {
        let result = planner().plan("<html>No pagination here</html>");
        assert!(matches!(
            result,
            Err(HarvestError::PageCountNotFound { .. })
        ));
    }

    #[test]
    fn test_overflowing_count_is_page_count_not_found() {
        let result = planner().plan("Pg 1 of 99999999999999999999");
        assert!(matches!(
            result,
            Err(HarvestError::PageCountNotFound { .. })
        ));
    }

    #[test]
    fn test_zero_pages() {
        let plan = planner().plan("Pg 1 of 0").unwrap();
        assert_eq!(plan.total_pages(), 0);
        assert_eq!(plan.pages().count(), 0);
    }

    #[test]
    fn test_page_urls() {
        let plan = planner().plan("Pg 1 of 3").unwrap();

        assert_eq!(
            plan.page_url(1).unwrap().as_str(),
            "https://example.com/category/maliki/"
        );
        assert_eq!(
            plan.page_url(2).unwrap().as_str(),
            "https://example.com/category/maliki/page/2/"
        );
        assert_eq!(
            plan.page_url(10).unwrap().as_str(),
            "https://example.com/category/maliki/page/10/"
        );
    }

    #[test]
    fn test_pages_in_increasing_order() {
        let plan = planner().plan("Pg 1 of 3").unwrap();
        let indexes: Vec<u32> = plan.pages().map(|(index, _)| index).collect();
        assert_eq!(indexes, vec![1, 2, 3]);
    }

    #[test]
    fn test_query_style_page_path() {
        let plan = PagePlan::new(
            2,
            Url::parse("https://example.com/list/").unwrap(),
            "?paged={page}",
        );
        assert_eq!(
            plan.page_url(2).unwrap().as_str(),
            "https://example.com/list/?paged=2"
        );
    }

    #[test]
    fn test_unjoinable_page_path_is_error_not_first_page() {
        let listing = Url::parse("https://example.com/category/maliki/").unwrap();
        let plan = PagePlan::new(3, listing.clone(), "http://[{page}/");

        let urls: Vec<(u32, UrlResult<Url>)> = plan.pages().collect();
        assert_eq!(urls.len(), 3);
        assert_eq!(urls[0].1.as_ref().unwrap(), &listing);
        assert!(urls[1].1.is_err());
        assert!(urls[2].1.is_err());
    }

    #[test]
    fn test_pattern_without_group_rejected() {
        let result = PaginationPlanner::new(
            r"Pg 1 of \d+",
            Url::parse("https://example.com/").unwrap(),
            "page/{page}/",
        );
        assert!(matches!(
            result,
            Err(ExtractionError::MissingCaptureGroup(_))
        ));
    }
}
