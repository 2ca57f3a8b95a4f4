//! Detail page extraction
//!
//! Detail pages are parsed into a document tree and queried for two
//! fragments: the answer text and the cited source link. Parsing is lenient;
//! unclosed tags and other malformed markup only ever reduce what the queries
//! find, they never fail the extraction.

use crate::crawler::ExtractionError;
use crate::record::DetailContent;
use scraper::{Html, Selector};
use std::borrow::Cow;

/// Tree queries the detail extractor relies on
///
/// Keeping the queries behind this trait lets the parsing engine change
/// without touching the extractor or the coordinator.
pub trait DocumentQuery {
    /// Concatenated text of every text node under the element whose `id` is
    /// `container_id`, in document order, with no separators added
    ///
    /// Returns an empty string when no such element exists.
    fn select_text_under(&self, container_id: &str) -> String;

    /// `href` of the first anchor that is a direct child of the element whose
    /// `class` attribute equals `container_class`
    fn select_first_link(&self, container_class: &str) -> Option<String>;
}

/// Selectors for one pair of container markers, compiled once
#[derive(Debug, Clone)]
pub struct ContainerSelectors {
    answer_container_id: String,
    source_container_class: String,
    answer: Selector,
    source: Selector,
}

impl ContainerSelectors {
    /// Compiles the answer and source selectors for the given markers
    pub fn new(
        answer_container_id: &str,
        source_container_class: &str,
    ) -> Result<Self, ExtractionError> {
        Ok(Self {
            answer_container_id: answer_container_id.to_string(),
            source_container_class: source_container_class.to_string(),
            answer: answer_selector(answer_container_id)?,
            source: source_selector(source_container_class)?,
        })
    }

    /// Marker of the answer container
    pub fn answer_container_id(&self) -> &str {
        &self.answer_container_id
    }

    /// Marker of the source container
    pub fn source_container_class(&self) -> &str {
        &self.source_container_class
    }
}

/// `DocumentQuery` over a document parsed by `scraper`
///
/// Queries for the markers of the attached `ContainerSelectors` reuse their
/// compiled selectors; any other marker is compiled on demand.
pub struct ScraperDocument<'s> {
    html: Html,
    selectors: Option<&'s ContainerSelectors>,
}

impl ScraperDocument<'static> {
    /// Parses markup, recovering from any malformation
    pub fn parse(markup: &str) -> Self {
        Self {
            html: parse_html(markup),
            selectors: None,
        }
    }
}

impl<'s> ScraperDocument<'s> {
    /// Parses markup and attaches precompiled selectors
    pub fn parse_with(markup: &str, selectors: &'s ContainerSelectors) -> Self {
        Self {
            html: parse_html(markup),
            selectors: Some(selectors),
        }
    }

    fn answer_query(&self, container_id: &str) -> Option<Cow<'s, Selector>> {
        match self.selectors {
            Some(compiled) if compiled.answer_container_id == container_id => {
                Some(Cow::Borrowed(&compiled.answer))
            }
            _ => compile_on_demand(answer_selector(container_id)),
        }
    }

    fn source_query(&self, container_class: &str) -> Option<Cow<'s, Selector>> {
        match self.selectors {
            Some(compiled) if compiled.source_container_class == container_class => {
                Some(Cow::Borrowed(&compiled.source))
            }
            _ => compile_on_demand(source_selector(container_class)),
        }
    }
}

impl DocumentQuery for ScraperDocument<'_> {
    fn select_text_under(&self, container_id: &str) -> String {
        let selector = match self.answer_query(container_id) {
            Some(selector) => selector,
            None => return String::new(),
        };

        let mut answer = String::new();
        let mut containers = Vec::new();

        for container in self.html.select(&selector) {
            // Text under a nested duplicate container is already included
            if container
                .ancestors()
                .any(|ancestor| containers.contains(&ancestor.id()))
            {
                continue;
            }
            containers.push(container.id());
            answer.extend(container.text());
        }

        answer
    }

    fn select_first_link(&self, container_class: &str) -> Option<String> {
        let selector = self.source_query(container_class)?;

        self.html
            .select(&selector)
            .find_map(|anchor| anchor.value().attr("href"))
            .map(str::to_string)
    }
}

/// Extracts the answer and source link from detail page markup
#[derive(Debug, Clone)]
pub struct DetailExtractor {
    selectors: ContainerSelectors,
}

impl DetailExtractor {
    /// Builds an extractor for the given container markers
    ///
    /// Both selectors are compiled once here and reused for every page, so a
    /// bad marker is reported at startup rather than silently producing
    /// empty records.
    pub fn new(
        answer_container_id: &str,
        source_container_class: &str,
    ) -> Result<Self, ExtractionError> {
        Ok(Self {
            selectors: ContainerSelectors::new(answer_container_id, source_container_class)?,
        })
    }

    /// Parses `markup` and runs both queries against it
    pub fn extract(&self, markup: &str) -> DetailContent {
        self.extract_from(&ScraperDocument::parse_with(markup, &self.selectors))
    }

    /// Runs both queries against an already parsed document
    pub fn extract_from<D: DocumentQuery>(&self, document: &D) -> DetailContent {
        DetailContent {
            answer: document.select_text_under(self.selectors.answer_container_id()),
            source_link: document
                .select_first_link(self.selectors.source_container_class())
                .unwrap_or_default(),
        }
    }
}

fn parse_html(markup: &str) -> Html {
    let html = Html::parse_document(markup);
    if !html.errors.is_empty() {
        tracing::trace!("Recovered from {} markup errors", html.errors.len());
    }
    html
}

fn compile_on_demand<'s>(
    selector: Result<Selector, ExtractionError>,
) -> Option<Cow<'s, Selector>> {
    match selector {
        Ok(selector) => Some(Cow::Owned(selector)),
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    }
}

fn answer_selector(container_id: &str) -> Result<Selector, ExtractionError> {
    parse_selector(&format!(r#"div[id="{}"]"#, container_id))
}

fn source_selector(container_class: &str) -> Result<Selector, ExtractionError> {
    parse_selector(&format!(r#"div[class="{}"] > a[href]"#, container_class))
}

fn parse_selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}
