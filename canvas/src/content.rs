//! Content cards: URL/handle validation, platform sniffing, and the
//! ingestion/analysis lifecycle.
//!
//! Remote work happens elsewhere; this module only folds its outcomes into
//! the store. [`apply_ingest_event`] is safe to call with a stale id (the card
//! may have been deleted while a request was in flight) and with duplicate
//! notifications: a completion that was already applied changes nothing.

#[cfg(test)]
#[path = "content_test.rs"]
mod content_test;

use url::Url;

use crate::doc::{Analysis, CanvasElement, DocStore, ElementId, Platform};

/// Longest creator handle accepted by the search form.
const MAX_HANDLE_LEN: usize = 30;

/// Input rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("not a valid URL: {0}")]
    InvalidUrl(String),
    #[error("URL must use http or https: {0}")]
    UnsupportedScheme(String),
    #[error("invalid handle: {0}")]
    InvalidHandle(String),
}

/// Validate a pasted or typed content URL and detect its platform.
///
/// # Errors
///
/// `InvalidUrl` when the string does not parse or has no host,
/// `UnsupportedScheme` for anything but http(s).
pub fn parse_content_url(raw: &str) -> Result<(Url, Platform), ContentError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|_| ContentError::InvalidUrl(trimmed.to_owned()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ContentError::UnsupportedScheme(trimmed.to_owned()));
    }
    let Some(host) = url.host_str() else {
        return Err(ContentError::InvalidUrl(trimmed.to_owned()));
    };
    let platform = platform_for_host(host);
    Ok((url, platform))
}

/// Hostname substring match.
#[must_use]
pub fn platform_for_host(host: &str) -> Platform {
    let host = host.to_ascii_lowercase();
    if host.contains("instagram.com") {
        Platform::Instagram
    } else if host.contains("youtube.com") || host.contains("youtu.be") {
        Platform::Youtube
    } else if host.contains("tiktok.com") {
        Platform::Tiktok
    } else {
        Platform::Unknown
    }
}

/// Normalize a creator handle (`@name` or `name`) for search.
///
/// # Errors
///
/// `InvalidHandle` when empty, too long, or containing characters outside
/// `[A-Za-z0-9._]`.
pub fn normalize_handle(raw: &str) -> Result<String, ContentError> {
    let handle = raw.trim().trim_start_matches('@');
    let valid = !handle.is_empty()
        && handle.len() <= MAX_HANDLE_LEN
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
    if valid {
        Ok(handle.to_owned())
    } else {
        Err(ContentError::InvalidHandle(raw.trim().to_owned()))
    }
}

/// Scraped fields delivered on ingestion completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedContent {
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub caption: Option<String>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub views: Option<u64>,
    pub raw: Option<serde_json::Value>,
}

/// Outcome of one step of remote ingestion or analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestEvent {
    ScrapeStarted { scrape_id: Option<String> },
    ScrapeCompleted { scrape_id: Option<String>, content: ScrapedContent },
    ScrapeFailed { error: String },
    ScrapeTimedOut,
    AnalysisStarted,
    AnalysisCompleted { analysis: Analysis },
    AnalysisFailed { error: String },
    /// The analysis request was abandoned; the card becomes eligible again.
    AnalysisCancelled,
}

/// Message recorded when polling runs out of attempts.
pub const TIMEOUT_MESSAGE: &str = "timeout";

/// Fold an event into a content card's metadata.
///
/// Returns true when the store changed. A missing element, a non-content
/// element, or an already-applied completion all return false.
pub fn apply_ingest_event(doc: &mut DocStore, id: &ElementId, event: IngestEvent) -> bool {
    let changed = doc.modify(id, |el| fold_event(el, event));
    if !changed && !doc.contains(id) {
        log::debug!("ingest event for deleted element {id} discarded");
    }
    changed
}

fn fold_event(el: &mut CanvasElement, event: IngestEvent) -> bool {
    let Some(content) = el.as_content_mut() else {
        return false;
    };
    let meta = &mut content.metadata;
    match event {
        IngestEvent::ScrapeStarted { scrape_id } => {
            if meta.is_scraped {
                return false;
            }
            meta.is_scraping = true;
            meta.scraping_error = None;
            if scrape_id.is_some() {
                meta.scrape_id = scrape_id;
            }
            true
        }
        IngestEvent::ScrapeCompleted { scrape_id, content: scraped } => {
            if meta.is_scraped {
                return false;
            }
            meta.is_scraping = false;
            meta.is_scraped = true;
            meta.scraping_error = None;
            if scrape_id.is_some() {
                meta.scrape_id = scrape_id;
            }
            if let Some(v) = scraped.likes {
                meta.likes = v;
            }
            if let Some(v) = scraped.comments {
                meta.comments = v;
            }
            if let Some(v) = scraped.views {
                meta.views = v;
            }
            if scraped.caption.is_some() {
                meta.caption = scraped.caption;
            }
            if scraped.raw.is_some() {
                meta.processed_data = scraped.raw;
            }
            if let Some(title) = scraped.title {
                content.title = title;
            }
            if scraped.thumbnail_url.is_some() {
                content.thumbnail_url = scraped.thumbnail_url;
            }
            true
        }
        IngestEvent::ScrapeFailed { error } => record_scrape_error(meta, error),
        IngestEvent::ScrapeTimedOut => record_scrape_error(meta, TIMEOUT_MESSAGE.to_owned()),
        IngestEvent::AnalysisStarted => {
            if meta.is_analyzed || meta.is_analyzing {
                return false;
            }
            meta.is_analyzing = true;
            meta.analysis_error = None;
            true
        }
        IngestEvent::AnalysisCompleted { analysis } => {
            if meta.is_analyzed {
                return false;
            }
            meta.is_analyzing = false;
            meta.is_analyzed = true;
            meta.analysis_error = None;
            meta.analysis = Some(analysis);
            true
        }
        IngestEvent::AnalysisCancelled => {
            if !meta.is_analyzing {
                return false;
            }
            meta.is_analyzing = false;
            true
        }
        IngestEvent::AnalysisFailed { error } => {
            if meta.is_analyzed {
                return false;
            }
            meta.is_analyzing = false;
            meta.analysis_error = Some(error);
            meta.analysis_retry_count += 1;
            true
        }
    }
}

fn record_scrape_error(meta: &mut crate::doc::ContentMetadata, error: String) -> bool {
    let duplicate = !meta.is_scraping && meta.scraping_error.as_deref() == Some(error.as_str());
    if meta.is_scraped || duplicate {
        return false;
    }
    meta.is_scraping = false;
    meta.scraping_error = Some(error);
    true
}

/// Whether a card can be sent for analysis right now.
#[must_use]
pub fn ready_for_analysis(el: &CanvasElement) -> bool {
    el.as_content().is_some_and(|c| {
        let m = &c.metadata;
        m.is_scraped && m.scrape_id.is_some() && !m.is_analyzed && !m.is_analyzing
    })
}
