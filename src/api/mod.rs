//! Content API — HTTP client for the scraping/analysis collaborator.
//!
//! DESIGN
//! ======
//! Services talk to the collaborator through the [`ContentApi`] trait so
//! tests can script responses. [`HttpContentApi`] is a thin reqwest wrapper;
//! status classification and body parsing are pure functions.

pub mod types;

use std::time::Duration;

use canvas::doc::Analysis;
use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ServiceConfig;
use types::{
    AnalyzeRequest, AnalyzeResponse, ApiError, CleanupRequest, ScrapeRequest, ScrapeResponse, ScrapeStatusResponse,
    SearchRequest, SearchResponse,
};

// =============================================================================
// TRAIT
// =============================================================================

/// Boundary to the content collaborator. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ContentApi: Send + Sync {
    /// `POST /scrape` — start (or reuse) ingestion of `url`.
    async fn scrape(&self, url: &str, project_id: &str) -> Result<ScrapeResponse, ApiError>;

    /// `GET /scrape/{id}/status` — one polling step.
    async fn scrape_status(&self, scrape_id: &str) -> Result<ScrapeStatusResponse, ApiError>;

    /// `POST /analyze/{scrapeId}`.
    async fn analyze(&self, scrape_id: &str, add_to_library: bool) -> Result<Analysis, ApiError>;

    /// `POST /creators/search`.
    async fn search_creators(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError>;

    /// `POST /content/cleanup` — release remote artifacts for a deleted card.
    async fn cleanup(&self, scrape_id: &str, project_id: &str) -> Result<(), ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpContentApi {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpContentApi {
    /// Build a client against `config.api_base_url` with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if reqwest cannot build the client
    /// or the base URL cannot carry path segments.
    pub fn new(config: &ServiceConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| ApiError::HttpClientBuild(format!("invalid base URL {}: {e}", config.api_base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::HttpClientBuild(format!("base URL cannot carry a path: {base_url}")));
        }
        Ok(Self { http, base_url })
    }

    /// Base URL plus `segments`, each percent-encoded as one path segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn post_json<B, R>(&self, path: &[&str], body: &B) -> Result<R, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.http.post(self.url(path)).json(body);
        let text = send(request).await?;
        parse_body(&text)
    }

    async fn get_json<R>(&self, path: &[&str]) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        let text = send(self.http.get(self.url(path))).await?;
        parse_body(&text)
    }
}

#[async_trait::async_trait]
impl ContentApi for HttpContentApi {
    async fn scrape(&self, url: &str, project_id: &str) -> Result<ScrapeResponse, ApiError> {
        self.post_json(&["scrape"], &ScrapeRequest { url, project_id }).await
    }

    async fn scrape_status(&self, scrape_id: &str) -> Result<ScrapeStatusResponse, ApiError> {
        self.get_json(&["scrape", scrape_id, "status"]).await
    }

    async fn analyze(&self, scrape_id: &str, add_to_library: bool) -> Result<Analysis, ApiError> {
        let response: AnalyzeResponse = self
            .post_json(&["analyze", scrape_id], &AnalyzeRequest { add_to_library })
            .await?;
        Ok(response.analysis)
    }

    async fn search_creators(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        self.post_json(&["creators", "search"], request).await
    }

    async fn cleanup(&self, scrape_id: &str, project_id: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.url(&["content", "cleanup"]))
            .json(&CleanupRequest { scrape_id, project_id });
        send(request).await.map(|_| ())
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<String, ApiError> {
    let response = request.send().await.map_err(|e| ApiError::Request(e.to_string()))?;
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))?;
    check_status(status, text)
}

// =============================================================================
// PARSING
// =============================================================================

fn check_status(status: u16, body: String) -> Result<String, ApiError> {
    if (200..300).contains(&status) {
        Ok(body)
    } else {
        tracing::debug!(status, "content API returned error status");
        Err(ApiError::Status { status, body })
    }
}

fn parse_body<R: DeserializeOwned>(text: &str) -> Result<R, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
