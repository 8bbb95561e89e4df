// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP clients for the GNews and NewsAPI search endpoints.
//!
//! Both clients share one request loop: build the query URL, send it under
//! the client timeout, retry once on a transient status, then decode the body.

use std::time::Duration;

use newsbot_core::NewsbotError;
use newsbot_core::types::Article;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::{GNewsErrorResponse, GNewsResponse, NewsApiErrorResponse, NewsApiResponse};

/// GNews search endpoint.
const GNEWS_BASE_URL: &str = "https://gnews.io/api/v4/search";

/// NewsAPI "everything" endpoint.
const NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2/everything";

/// Builds the shared reqwest client with a whole-request timeout.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, NewsbotError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("newsbot/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| NewsbotError::Source {
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Request loop shared by both providers.
#[derive(Debug, Clone)]
struct Endpoint {
    client: reqwest::Client,
    base_url: String,
    provider: &'static str,
    max_retries: u32,
    retry_delay: Duration,
}

impl Endpoint {
    async fn get<T: DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
        describe_error: fn(&str) -> Option<String>,
    ) -> Result<T, NewsbotError> {
        let url = reqwest::Url::parse_with_params(&self.base_url, params).map_err(|e| {
            NewsbotError::Source {
                message: format!("{}: invalid request URL: {e}", self.provider),
                source: Some(Box::new(e)),
            }
        })?;

        let mut attempt = 0;
        loop {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| NewsbotError::Source {
                    message: format!("{}: HTTP request failed: {e}", self.provider),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(provider = self.provider, status = %status, attempt, "search response received");

            let body = response.text().await.map_err(|e| NewsbotError::Source {
                message: format!("{}: failed to read response body: {e}", self.provider),
                source: Some(Box::new(e)),
            })?;

            if status.is_success() {
                return serde_json::from_str(&body).map_err(|e| NewsbotError::Source {
                    message: format!("{}: failed to decode response: {e}", self.provider),
                    source: Some(Box::new(e)),
                });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(provider = self.provider, status = %status, "transient error, will retry");
                attempt += 1;
                tokio::time::sleep(self.retry_delay).await;
                continue;
            }

            let detail = describe_error(&body).unwrap_or(body);
            return Err(NewsbotError::source_msg(format!(
                "{} returned {status}: {detail}",
                self.provider
            )));
        }
    }
}

/// Returns true for HTTP status codes worth one more attempt.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

/// Client for `https://gnews.io/api/v4/search`.
#[derive(Debug, Clone)]
pub struct GNewsClient {
    endpoint: Endpoint,
    api_key: String,
    language: String,
    country: String,
    max_results: u32,
}

impl GNewsClient {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        language: String,
        country: String,
        max_results: u32,
    ) -> Self {
        Self {
            endpoint: Endpoint {
                client,
                base_url: GNEWS_BASE_URL.to_string(),
                provider: "GNews",
                max_retries: 1,
                retry_delay: Duration::from_secs(1),
            },
            api_key,
            language,
            country,
            max_results,
        }
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.endpoint.base_url = url;
        self.endpoint.retry_delay = Duration::ZERO;
        self
    }

    /// Newest-first articles matching `query`.
    pub async fn search(&self, query: &str) -> Result<Vec<Article>, NewsbotError> {
        let max = self.max_results.to_string();
        let response: GNewsResponse = self
            .endpoint
            .get(
                &[
                    ("q", query),
                    ("country", self.country.as_str()),
                    ("lang", self.language.as_str()),
                    ("sortby", "publishedAt"),
                    ("max", max.as_str()),
                    ("token", self.api_key.as_str()),
                ],
                |body| {
                    serde_json::from_str::<GNewsErrorResponse>(body)
                        .ok()
                        .filter(|e| !e.errors.is_empty())
                        .map(|e| e.errors.join("; "))
                },
            )
            .await?;
        debug!(query, count = response.articles.len(), "GNews search complete");
        Ok(response.articles.into_iter().map(Article::from).collect())
    }
}

/// Client for `https://newsapi.org/v2/everything`.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    endpoint: Endpoint,
    api_key: String,
    language: String,
    page_size: u32,
}

impl NewsApiClient {
    pub fn new(client: reqwest::Client, api_key: String, language: String, page_size: u32) -> Self {
        Self {
            endpoint: Endpoint {
                client,
                base_url: NEWSAPI_BASE_URL.to_string(),
                provider: "NewsAPI",
                max_retries: 1,
                retry_delay: Duration::from_secs(1),
            },
            api_key,
            language,
            page_size,
        }
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.endpoint.base_url = url;
        self.endpoint.retry_delay = Duration::ZERO;
        self
    }

    /// Newest-first articles matching `query`.
    pub async fn search(&self, query: &str) -> Result<Vec<Article>, NewsbotError> {
        let page_size = self.page_size.to_string();
        let response: NewsApiResponse = self
            .endpoint
            .get(
                &[
                    ("q", query),
                    ("language", self.language.as_str()),
                    ("sortBy", "publishedAt"),
                    ("pageSize", page_size.as_str()),
                    ("apiKey", self.api_key.as_str()),
                ],
                |body| {
                    serde_json::from_str::<NewsApiErrorResponse>(body)
                        .ok()
                        .and_then(|e| match (e.code, e.message) {
                            (Some(code), Some(message)) => Some(format!("{code}: {message}")),
                            (None, Some(message)) => Some(message),
                            (code, None) => code,
                        })
                },
            )
            .await?;
        debug!(
            query,
            count = response.articles.len(),
            total = response.total_results.unwrap_or_default(),
            "NewsAPI search complete"
        );
        Ok(response.articles.into_iter().map(Article::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn http() -> reqwest::Client {
        build_http_client(Duration::from_secs(5)).unwrap()
    }

    fn gnews(server: &MockServer) -> GNewsClient {
        GNewsClient::new(http(), "g-key".into(), "ru".into(), "ru".into(), 20)
            .with_base_url(format!("{}/api/v4/search", server.uri()))
    }

    fn newsapi(server: &MockServer) -> NewsApiClient {
        NewsApiClient::new(http(), "n-key".into(), "ru".into(), 10)
            .with_base_url(format!("{}/v2/everything", server.uri()))
    }

    #[tokio::test]
    async fn gnews_sends_expected_query() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "totalArticles": 1,
            "articles": [{
                "title": "Rust 2.0",
                "description": "news",
                "content": "body",
                "url": "https://a.example/rust",
                "image": null,
                "publishedAt": "2026-03-01T10:00:00Z",
                "source": {"name": "Example", "url": "https://a.example"}
            }]
        });

        Mock::given(method("GET"))
            .and(path("/api/v4/search"))
            .and(query_param("q", "искусственный интеллект"))
            .and(query_param("country", "ru"))
            .and(query_param("lang", "ru"))
            .and(query_param("sortby", "publishedAt"))
            .and(query_param("max", "20"))
            .and(query_param("token", "g-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let articles = gnews(&server).search("искусственный интеллект").await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].url, "https://a.example/rust");
        assert_eq!(articles[0].source.name, "Example");
    }

    #[tokio::test]
    async fn newsapi_sends_expected_query() {
        let server = MockServer::start().await;
        let body = serde_json::json!({"status": "ok", "totalResults": 0, "articles": []});

        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("q", "rust"))
            .and(query_param("language", "ru"))
            .and(query_param("sortBy", "publishedAt"))
            .and(query_param("pageSize", "10"))
            .and(query_param("apiKey", "n-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        assert!(newsapi(&server).search("rust").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn gnews_error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(serde_json::json!({"errors": ["Daily quota exceeded"]})),
            )
            .mount(&server)
            .await;

        let err = gnews(&server).search("rust").await.unwrap_err().to_string();
        assert!(err.contains("403"), "got: {err}");
        assert!(err.contains("Daily quota exceeded"), "got: {err}");
    }

    #[tokio::test]
    async fn newsapi_error_code_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "status": "error",
                "code": "apiKeyInvalid",
                "message": "Your API key is invalid"
            })))
            .mount(&server)
            .await;

        let err = newsapi(&server).search("rust").await.unwrap_err().to_string();
        assert!(err.contains("apiKeyInvalid"), "got: {err}");
    }

    #[tokio::test]
    async fn transient_status_is_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"articles": []})),
            )
            .mount(&server)
            .await;

        assert!(gnews(&server).search("rust").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn retries_are_exhausted_on_persistent_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        assert!(gnews(&server).search("rust").await.is_err());
    }

    #[tokio::test]
    async fn undecodable_body_is_a_source_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = gnews(&server).search("rust").await.unwrap_err();
        assert!(matches!(err, NewsbotError::Source { .. }));
    }
}
