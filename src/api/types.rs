//! Content API types: wire shapes and errors.
//!
//! The scraping/analysis collaborator speaks camelCase JSON for its request
//! and status envelopes; creator search results come back snake_case.

use canvas::content::ScrapedContent;
use canvas::doc::{Analysis, Platform};
use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// How a remote failure should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFailure {
    PrivateAccount,
    RateLimited,
    Generic,
}

/// Errors produced by content API calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("API request failed: {0}")]
    Request(String),

    /// The collaborator returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    Status { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// The collaborator answered 2xx but reported failure in the body.
    #[error("API rejected request: {0}")]
    Rejected(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    #[must_use]
    pub fn failure(&self) -> RemoteFailure {
        match self {
            Self::Status { status: 403, .. } => RemoteFailure::PrivateAccount,
            Self::Status { status: 429, .. } => RemoteFailure::RateLimited,
            _ => RemoteFailure::Generic,
        }
    }

    /// Transport failures, rate limits, and 5xx are worth another attempt.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }

    /// Short message suitable for an element's error state.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.failure() {
            RemoteFailure::PrivateAccount => "This account is private".to_owned(),
            RemoteFailure::RateLimited => "Rate limited, try again shortly".to_owned(),
            RemoteFailure::Generic => match self {
                Self::Rejected(reason) => reason.clone(),
                _ => "Request failed".to_owned(),
            },
        }
    }
}

// =============================================================================
// SCRAPE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest<'a> {
    pub url: &'a str,
    pub project_id: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub scrape_id: Option<String>,
    pub status: ScrapeStatus,
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub existing: bool,
    #[serde(default)]
    pub processed_data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeStatusResponse {
    pub status: ScrapeStatus,
    #[serde(default)]
    pub processed_data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Pull the card fields out of a scrape's processed data.
///
/// The collaborator normalizes most platforms to camelCase but passes some
/// raw scraper keys through, so each field accepts a few spellings.
#[must_use]
pub fn scraped_content(processed: Option<&serde_json::Value>) -> ScrapedContent {
    let Some(data) = processed else {
        return ScrapedContent::default();
    };
    let text = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| data.get(*k).and_then(serde_json::Value::as_str))
            .map(str::to_owned)
    };
    let count = |keys: &[&str]| keys.iter().find_map(|k| data.get(*k).and_then(serde_json::Value::as_u64));

    ScrapedContent {
        title: text(&["title"]),
        thumbnail_url: text(&["thumbnailUrl", "thumbnail_url", "displayUrl"]),
        caption: text(&["caption", "description"]),
        likes: count(&["likes", "likesCount", "likeCount"]),
        comments: count(&["comments", "commentsCount", "commentCount"]),
        views: count(&["views", "viewCount", "videoViewCount", "playCount"]),
        raw: Some(data.clone()),
    }
}

// =============================================================================
// ANALYZE
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub add_to_library: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyzeResponse {
    pub analysis: Analysis,
}

// =============================================================================
// CREATOR SEARCH
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub platform: Platform,
    pub search_query: String,
    pub filter: String,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub search_id: Option<String>,
    pub status: ScrapeStatus,
    #[serde(default)]
    pub content: Vec<SearchItem>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One piece of a creator's content.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchItem {
    pub id: String,
    pub content_url: String,
    pub thumbnail_url: Option<String>,
    pub likes: u64,
    pub comments: u64,
    pub views: u64,
    pub caption: Option<String>,
    pub posted_at: Option<String>,
    pub media_type: Option<String>,
    pub hashtags: Vec<String>,
}

// =============================================================================
// CLEANUP
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupRequest<'a> {
    pub scrape_id: &'a str,
    pub project_id: &'a str,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
