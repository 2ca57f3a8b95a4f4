//! Crawler coordinator - main harvest orchestration logic
//!
//! The coordinator drives the harvest through its phases:
//! - Planning: fetch listing page 1 and read the page count
//! - Listing: fetch each listing page in order and extract its entries
//! - Detailing: fetch every entry's detail page and extract answer and source
//! - Done: hand the accumulated records back to the caller
//!
//! Failed listing or detail fetches are logged and skipped; only a failure
//! while planning ends the run with an error.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::detail::DetailExtractor;
use crate::crawler::fetcher::{FetchError, HttpFetcher, PageFetcher};
use crate::crawler::listing::ListingExtractor;
use crate::crawler::pagination::{PagePlan, PaginationPlanner};
use crate::output::CrawlStatistics;
use crate::record::{DetailContent, ListingEntry, Record};
use crate::state::CrawlPhase;
use crate::url::{normalize_listing_url, resolve_link};
use crate::{HarvestError, UrlError};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Runtime knobs of a harvest run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestSettings {
    /// Detail pages fetched at once (at least 1)
    pub max_concurrent_details: usize,

    /// Upper bound on a single fetch
    pub fetch_timeout: Duration,

    /// Pause after every fetch
    pub request_delay: Duration,

    /// Overall crawl deadline
    pub deadline: Option<Duration>,

    /// Maximum number of listing pages to visit
    pub max_pages: Option<u32>,
}

impl HarvestSettings {
    /// Derives settings from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_concurrent_details: config.max_concurrent_details.max(1) as usize,
            fetch_timeout: Duration::from_secs(config.request_timeout_secs),
            request_delay: Duration::from_millis(config.request_delay_ms),
            deadline: (config.crawl_deadline_secs > 0)
                .then(|| Duration::from_secs(config.crawl_deadline_secs)),
            max_pages: (config.max_pages > 0).then_some(config.max_pages),
        }
    }
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Result of a completed harvest
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Records in discovery order
    pub records: Vec<Record>,

    /// Counters collected along the way
    pub stats: CrawlStatistics,
}

/// Why a single detail page produced no record
#[derive(Debug)]
enum DetailFailure {
    Link(UrlError),
    Fetch(FetchError),
    Deadline,
}

/// Main harvest coordinator
pub struct Coordinator<F: PageFetcher> {
    fetcher: F,
    planner: PaginationPlanner,
    listing: ListingExtractor,
    detail: DetailExtractor,
    settings: HarvestSettings,
    phase: CrawlPhase,
    records: Vec<Record>,
    stats: CrawlStatistics,
}

impl<F: PageFetcher> Coordinator<F> {
    /// Creates a coordinator from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    /// * `fetcher` - Source of page markup
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Extractors built successfully
    /// * `Err(HarvestError)` - Listing URL, pattern, or markers are invalid
    pub fn new(config: &Config, fetcher: F) -> Result<Self, HarvestError> {
        let listing_url = normalize_listing_url(&config.site.listing_url)?;
        let extraction = &config.extraction;

        let planner = PaginationPlanner::new(
            &extraction.page_count_pattern,
            listing_url,
            &config.site.page_path,
        )?;
        let listing = ListingExtractor::new(&extraction.heading_tag)?;
        let detail = DetailExtractor::new(
            &extraction.answer_container_id,
            &extraction.source_container_class,
        )?;

        Ok(Self {
            fetcher,
            planner,
            listing,
            detail,
            settings: HarvestSettings::from_config(&config.crawler),
            phase: CrawlPhase::Planning,
            records: Vec::new(),
            stats: CrawlStatistics::new(),
        })
    }

    /// Replaces the runtime settings derived from configuration
    pub fn with_settings(mut self, settings: HarvestSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The phase the coordinator is currently in
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Fetches listing page 1 and plans pagination without harvesting
    pub async fn preview_plan(&self) -> Result<PagePlan, HarvestError> {
        let listing_url = self.planner.listing_url().clone();
        let first_page = self.fetch_page(&listing_url).await?;
        self.planner.plan(&first_page)
    }

    /// Runs the harvest to completion
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - Records in discovery order plus statistics
    /// * `Err(HarvestError)` - Page 1 could not be fetched or carries no page count
    pub async fn run(mut self) -> Result<CrawlOutcome, HarvestError> {
        let started = Instant::now();
        let listing_url = self.planner.listing_url().clone();

        tracing::info!("Planning: fetching {}", listing_url);
        let first_page = match self.fetch_page(&listing_url).await {
            Ok(markup) => markup,
            Err(e) => {
                tracing::error!("Failed to fetch first listing page: {}", e);
                self.phase.transition(CrawlPhase::Done)?;
                return Err(e.into());
            }
        };

        let plan = match self.planner.plan(&first_page) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::error!("{}", e);
                self.phase.transition(CrawlPhase::Done)?;
                return Err(e);
            }
        };

        self.stats.total_pages = plan.total_pages();
        tracing::info!("Total pages found: {}", plan.total_pages());

        let page_limit = match self.settings.max_pages {
            Some(limit) if limit < plan.total_pages() => {
                tracing::info!("Limiting harvest to the first {} pages", limit);
                limit
            }
            _ => plan.total_pages(),
        };

        self.phase.transition(CrawlPhase::Listing)?;
        let mut first_page = Some(first_page);

        for (index, page_url) in plan.pages().take(page_limit as usize) {
            if self.deadline_passed(started) {
                tracing::warn!("Crawl deadline reached before page {}; stopping", index);
                self.stats.deadline_reached = true;
                break;
            }

            let page_url = match page_url {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Skipping listing page {}: {}", index, e);
                    self.stats
                        .record_listing_failure(&format!("page {}", index), &e);
                    continue;
                }
            };

            tracing::info!("Page {}/{}: {}", index, page_limit, page_url);

            let markup = match first_page.take() {
                Some(markup) if index == 1 => Ok(markup),
                _ => self.fetch_page(&page_url).await,
            };

            let markup = match markup {
                Ok(markup) => markup,
                Err(e) => {
                    tracing::warn!("Skipping listing page {}: {}", index, e);
                    self.stats.record_listing_failure(page_url.as_str(), &e);
                    continue;
                }
            };

            self.stats.pages_visited += 1;

            let entries = self.listing.extract_entries(&markup);
            self.stats.entries_discovered += entries.len() as u64;

            if entries.is_empty() {
                tracing::debug!("No questions on page {}", index);
                continue;
            }

            tracing::debug!("Found {} questions on page {}", entries.len(), index);

            self.phase.transition(CrawlPhase::Detailing)?;
            self.harvest_details(&page_url, entries, started).await;
            self.phase.transition(CrawlPhase::Listing)?;
        }

        self.phase.transition(CrawlPhase::Done)?;
        self.stats.finish();

        tracing::info!(
            "Harvest completed: {} records from {} pages in {:?}",
            self.records.len(),
            self.stats.pages_visited,
            started.elapsed()
        );

        Ok(CrawlOutcome {
            records: self.records,
            stats: self.stats,
        })
    }

    /// Fetches and extracts the detail pages of one listing page
    ///
    /// Up to `max_concurrent_details` fetches run at once, but results are
    /// consumed in discovery order, so records keep listing order.
    async fn harvest_details(
        &mut self,
        page_url: &Url,
        entries: Vec<ListingEntry>,
        started: Instant,
    ) {
        let fetcher = &self.fetcher;
        let detail = &self.detail;
        let settings = &self.settings;

        let mut results = stream::iter(entries)
            .map(|entry| async move {
                let outcome =
                    fetch_detail(fetcher, detail, settings, page_url, &entry, started).await;
                (entry, outcome)
            })
            .buffered(settings.max_concurrent_details);

        while let Some((entry, outcome)) = results.next().await {
            match outcome {
                Ok(content) => {
                    tracing::debug!("Question: {}", entry.title);
                    self.records.push(Record::from_parts(entry, content));
                    self.stats.records += 1;
                }
                Err(DetailFailure::Deadline) => {
                    if self.stats.deadline_skipped == 0 {
                        tracing::warn!(
                            "Crawl deadline reached; skipping '{}' and later questions",
                            entry.title
                        );
                    }
                    self.stats.record_deadline_skip();
                }
                Err(DetailFailure::Link(e)) => {
                    tracing::warn!(
                        "Skipping '{}': bad link {}: {}",
                        entry.title,
                        entry.detail_link,
                        e
                    );
                    self.stats.record_detail_failure(&entry.detail_link, &e);
                }
                Err(DetailFailure::Fetch(e)) => {
                    tracing::warn!("Skipping '{}': {}", entry.title, e);
                    self.stats.record_detail_failure(e.url(), &e);
                }
            }
        }
    }

    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError> {
        fetch_with_timeout(&self.fetcher, url.as_str(), &self.settings).await
    }

    fn deadline_passed(&self, started: Instant) -> bool {
        deadline_passed(&self.settings, started)
    }
}

/// Resolves, fetches and extracts a single detail page
async fn fetch_detail<F: PageFetcher>(
    fetcher: &F,
    detail: &DetailExtractor,
    settings: &HarvestSettings,
    page_url: &Url,
    entry: &ListingEntry,
    started: Instant,
) -> Result<DetailContent, DetailFailure> {
    if deadline_passed(settings, started) {
        return Err(DetailFailure::Deadline);
    }

    let target = resolve_link(&entry.detail_link, page_url).map_err(DetailFailure::Link)?;
    let markup = fetch_with_timeout(fetcher, target.as_str(), settings)
        .await
        .map_err(DetailFailure::Fetch)?;

    Ok(detail.extract(&markup))
}

/// Fetches `url`, bounding the call by the fetch timeout and pausing afterwards
async fn fetch_with_timeout<F: PageFetcher>(
    fetcher: &F,
    url: &str,
    settings: &HarvestSettings,
) -> Result<String, FetchError> {
    let result = match tokio::time::timeout(settings.fetch_timeout, fetcher.fetch(url)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            url: url.to_string(),
        }),
    };

    if !settings.request_delay.is_zero() {
        tokio::time::sleep(settings.request_delay).await;
    }

    result
}

fn deadline_passed(settings: &HarvestSettings, started: Instant) -> bool {
    settings
        .deadline
        .map(|deadline| started.elapsed() >= deadline)
        .unwrap_or(false)
}

/// Runs a complete harvest over HTTP
///
/// # Example
///
/// ```no_run
/// use qna_harvest::config::load_config;
/// use qna_harvest::crawler::run_harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let outcome = run_harvest(&config).await?;
/// println!("{} records", outcome.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: &Config) -> Result<CrawlOutcome, HarvestError> {
    let fetcher = HttpFetcher::from_config(&config.user_agent, &config.crawler)?;
    Coordinator::new(config, fetcher)?.run().await
}
