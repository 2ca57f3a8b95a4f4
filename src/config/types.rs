use serde::Deserialize;

/// Main configuration structure for qna-harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// The listing site being harvested
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Canonical URL of listing page 1
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Top-level key of the output document
    #[serde(rename = "category-label")]
    pub category_label: String,

    /// Path appended to the listing URL for pages after the first;
    /// `{page}` is replaced with the page number
    #[serde(rename = "page-path", default = "default_page_path")]
    pub page_path: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Timeout for a single request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Timeout for establishing a connection (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Overall crawl deadline (seconds, 0 disables it)
    #[serde(rename = "crawl-deadline-secs")]
    pub crawl_deadline_secs: u64,

    /// Maximum number of detail pages fetched at once
    #[serde(rename = "max-concurrent-details")]
    pub max_concurrent_details: u32,

    /// Pause after every fetch (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Maximum number of listing pages to visit (0 visits all of them)
    #[serde(rename = "max-pages")]
    pub max_pages: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            crawl_deadline_secs: 0,
            max_concurrent_details: 1,
            request_delay_ms: 0,
            max_pages: 0,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "qna-harvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
            contact_email: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// `Name/Version (+ContactURL; ContactEmail)`, with the parenthesized part
    /// omitted when no contact details are configured.
    pub fn header_value(&self) -> String {
        let contact: Vec<String> = self
            .contact_url
            .iter()
            .map(|url| format!("+{}", url))
            .chain(self.contact_email.iter().cloned())
            .collect();

        if contact.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} ({})",
                self.crawler_name,
                self.crawler_version,
                contact.join("; ")
            )
        }
    }
}

/// Markup markers used by the extractors
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Heading element wrapping each question anchor on listing pages
    #[serde(rename = "heading-tag")]
    pub heading_tag: String,

    /// `id` of the element holding the answer on detail pages
    #[serde(rename = "answer-container-id")]
    pub answer_container_id: String,

    /// `class` of the element holding the source anchor on detail pages
    #[serde(rename = "source-container-class")]
    pub source_container_class: String,

    /// Pattern whose first capture group is the total page count
    #[serde(rename = "page-count-pattern")]
    pub page_count_pattern: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            heading_tag: "h2".to_string(),
            answer_container_id: "qna_only".to_string(),
            source_container_class: "original_source".to_string(),
            page_count_pattern: r"Pg 1 of ([0-9]+)".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON document written at the end of the run
    #[serde(rename = "json-path")]
    pub json_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: "questions.json".to_string(),
        }
    }
}

fn default_page_path() -> String {
    "page/{page}/".to_string()
}
