use crate::config::types::{
    Config, CrawlerConfig, ExtractionConfig, OutputConfig, SiteConfig, UserAgentConfig,
};
use crate::url::{join_page_path, normalize_listing_url};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Upper bound for concurrent detail fetches
const MAX_CONCURRENT_DETAILS: u32 = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_extraction_config(&config.extraction)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the listing site section
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.listing_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid listing-url '{}': {}", config.listing_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "listing-url '{}' must use http or https",
            config.listing_url
        )));
    }

    if config.category_label.trim().is_empty() {
        return Err(ConfigError::Validation(
            "category-label cannot be empty".to_string(),
        ));
    }

    if !config.page_path.contains("{page}") {
        return Err(ConfigError::Validation(format!(
            "page-path must contain the {{page}} placeholder, got '{}'",
            config.page_path
        )));
    }

    let listing_url = normalize_listing_url(&config.listing_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("listing-url: {}", e)))?;
    join_page_path(&listing_url, &config.page_path, 2).map_err(|e| {
        ConfigError::Validation(format!(
            "page-path '{}' does not form a page URL: {}",
            config.page_path, e
        ))
    })?;

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.max_concurrent_details < 1 || config.max_concurrent_details > MAX_CONCURRENT_DETAILS
    {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-details must be between 1 and {}, got {}",
            MAX_CONCURRENT_DETAILS, config.max_concurrent_details
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    if let Some(email) = &config.contact_email {
        validate_email(email)?;
    }

    Ok(())
}

/// Validates the extraction markers and page-count pattern
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    if config.heading_tag.is_empty()
        || !config.heading_tag.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ConfigError::Validation(format!(
            "heading-tag must be a non-empty alphanumeric tag name, got '{}'",
            config.heading_tag
        )));
    }

    validate_marker("answer-container-id", &config.answer_container_id)?;
    validate_marker("source-container-class", &config.source_container_class)?;

    let pattern = Regex::new(&config.page_count_pattern)
        .map_err(|e| ConfigError::InvalidPattern(format!("page-count-pattern: {}", e)))?;

    if pattern.captures_len() < 2 {
        return Err(ConfigError::InvalidPattern(format!(
            "page-count-pattern '{}' must contain a capture group for the page count",
            config.page_count_pattern
        )));
    }

    Ok(())
}

/// Validates an attribute value used inside a selector
fn validate_marker(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    if value
        .chars()
        .any(|c| c.is_whitespace() || c == '"' || c == '\'' || c == '\\')
    {
        return Err(ConfigError::Validation(format!(
            "{} cannot contain whitespace, quotes or backslashes, got '{}'",
            name, value
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.json_path.is_empty() {
        return Err(ConfigError::Validation(
            "json-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig {
            listing_url: "https://example.com/category/maliki/".to_string(),
            category_label: "Maliki".to_string(),
            page_path: "page/{page}/".to_string(),
        }
    }

    #[test]
    fn test_validate_site() {
        assert!(validate_site_config(&site()).is_ok());

        let mut bad_url = site();
        bad_url.listing_url = "not a url".to_string();
        assert!(matches!(
            validate_site_config(&bad_url),
            Err(ConfigError::InvalidUrl(_))
        ));

        let mut ftp = site();
        ftp.listing_url = "ftp://example.com/".to_string();
        assert!(validate_site_config(&ftp).is_err());

        let mut blank_label = site();
        blank_label.category_label = "  ".to_string();
        assert!(validate_site_config(&blank_label).is_err());

        let mut no_placeholder = site();
        no_placeholder.page_path = "page/".to_string();
        assert!(validate_site_config(&no_placeholder).is_err());

        let mut query_path = site();
        query_path.page_path = "?paged={page}".to_string();
        assert!(validate_site_config(&query_path).is_ok());
    }

    #[test]
    fn test_validate_site_rejects_unjoinable_page_path() {
        let mut bad_host = site();
        bad_host.page_path = "http://[{page}/".to_string();
        assert!(matches!(
            validate_site_config(&bad_host),
            Err(ConfigError::Validation(_))
        ));

        let mut other_scheme = site();
        other_scheme.page_path = "ftp://mirror.example.com/{page}/".to_string();
        assert!(validate_site_config(&other_scheme).is_err());
    }

    #[test]
    fn test_validate_crawler() {
        assert!(validate_crawler_config(&CrawlerConfig::default()).is_ok());

        let too_many = CrawlerConfig {
            max_concurrent_details: 33,
            ..CrawlerConfig::default()
        };
        assert!(validate_crawler_config(&too_many).is_err());

        let no_timeout = CrawlerConfig {
            request_timeout_secs: 0,
            ..CrawlerConfig::default()
        };
        assert!(validate_crawler_config(&no_timeout).is_err());
    }

    #[test]
    fn test_validate_extraction() {
        assert!(validate_extraction_config(&ExtractionConfig::default()).is_ok());

        let bad_tag = ExtractionConfig {
            heading_tag: "h2 class".to_string(),
            ..ExtractionConfig::default()
        };
        assert!(validate_extraction_config(&bad_tag).is_err());

        let quoted_id = ExtractionConfig {
            answer_container_id: "qna\"only".to_string(),
            ..ExtractionConfig::default()
        };
        assert!(validate_extraction_config(&quoted_id).is_err());

        let no_group = ExtractionConfig {
            page_count_pattern: r"Pg 1 of \d+".to_string(),
            ..ExtractionConfig::default()
        };
        assert!(matches!(
            validate_extraction_config(&no_group),
            Err(ConfigError::InvalidPattern(_))
        ));

        let broken = ExtractionConfig {
            page_count_pattern: r"Pg 1 of (\d+".to_string(),
            ..ExtractionConfig::default()
        };
        assert!(validate_extraction_config(&broken).is_err());
    }

    #[test]
    fn test_validate_user_agent() {
        assert!(validate_user_agent_config(&UserAgentConfig::default()).is_ok());

        let bad_name = UserAgentConfig {
            crawler_name: "bad name".to_string(),
            ..UserAgentConfig::default()
        };
        assert!(validate_user_agent_config(&bad_name).is_err());

        let bad_contact = UserAgentConfig {
            contact_url: Some("nope".to_string()),
            ..UserAgentConfig::default()
        };
        assert!(validate_user_agent_config(&bad_contact).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }
}
