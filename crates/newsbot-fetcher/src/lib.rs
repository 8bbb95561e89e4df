// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Article source backed by the GNews and NewsAPI search APIs.
//!
//! [`NewsFetcher`] implements [`ArticleSource`]: GNews is asked first and
//! NewsAPI is the fallback when GNews fails or finds nothing.

pub mod client;
pub mod types;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use newsbot_config::model::NewsConfig;
use newsbot_core::types::{AdapterType, Article, HealthStatus, normalize_topic};
use newsbot_core::{ArticleSource, NewsbotError, PluginAdapter};
use tracing::{debug, info, warn};

use crate::client::{GNewsClient, NewsApiClient, build_http_client};

/// The provider that produced the most recent successful answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Provider {
    #[strum(serialize = "GNews")]
    GNews,
    #[strum(serialize = "NewsAPI")]
    NewsApi,
}

impl Provider {
    fn code(self) -> u8 {
        match self {
            Provider::GNews => 1,
            Provider::NewsApi => 2,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Provider::GNews),
            2 => Some(Provider::NewsApi),
            _ => None,
        }
    }
}

/// GNews-first article source with NewsAPI failover.
pub struct NewsFetcher {
    gnews: Option<GNewsClient>,
    newsapi: Option<NewsApiClient>,
    query_aliases: BTreeMap<String, String>,
    last_provider: AtomicU8,
}

impl NewsFetcher {
    /// Builds the fetcher from `[news]` config. Providers without a key are skipped.
    pub fn from_config(config: &NewsConfig) -> Result<Self, NewsbotError> {
        let http = build_http_client(Duration::from_secs(config.request_timeout_secs))?;
        let key = |k: &Option<String>| k.as_ref().filter(|v| !v.trim().is_empty()).cloned();

        let gnews = key(&config.gnews_api_key).map(|api_key| {
            GNewsClient::new(
                http.clone(),
                api_key,
                config.language.clone(),
                config.country.clone(),
                config.gnews_max_results,
            )
        });
        let newsapi = key(&config.newsapi_api_key).map(|api_key| {
            NewsApiClient::new(
                http.clone(),
                api_key,
                config.language.clone(),
                config.newsapi_page_size,
            )
        });

        info!(
            gnews = gnews.is_some(),
            newsapi = newsapi.is_some(),
            aliases = config.query_aliases.len(),
            "news fetcher initialized"
        );

        Ok(Self::with_clients(gnews, newsapi, config.query_aliases.clone()))
    }

    pub fn with_clients(
        gnews: Option<GNewsClient>,
        newsapi: Option<NewsApiClient>,
        query_aliases: BTreeMap<String, String>,
    ) -> Self {
        let query_aliases = query_aliases
            .into_iter()
            .map(|(topic, query)| (normalize_topic(&topic), query))
            .collect();
        Self {
            gnews,
            newsapi,
            query_aliases,
            last_provider: AtomicU8::new(0),
        }
    }

    /// The provider that answered the most recent successful fetch.
    pub fn last_provider(&self) -> Option<Provider> {
        Provider::from_code(self.last_provider.load(Ordering::Relaxed))
    }

    fn record(&self, provider: Provider) {
        self.last_provider.store(provider.code(), Ordering::Relaxed);
    }

    /// The provider query for `topic`, after alias substitution.
    fn query_for(&self, topic: &str) -> String {
        self.query_aliases
            .get(&normalize_topic(topic))
            .cloned()
            .unwrap_or_else(|| topic.to_string())
    }
}

#[async_trait]
impl ArticleSource for NewsFetcher {
    async fn fetch_articles(&self, topic: &str) -> Result<Vec<Article>, NewsbotError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(NewsbotError::source_msg("topic must not be empty"));
        }
        let query = self.query_for(topic);
        debug!(topic, query = %query, "fetching articles");

        let primary = match &self.gnews {
            Some(gnews) => gnews.search(&query).await,
            None => Err(NewsbotError::source_msg("GNews API key not configured")),
        };
        let primary = match primary {
            Ok(articles) if !articles.is_empty() => {
                self.record(Provider::GNews);
                return Ok(articles);
            }
            other => other,
        };

        let Some(newsapi) = &self.newsapi else {
            if primary.is_ok() {
                self.record(Provider::GNews);
            }
            return primary;
        };

        if let Err(e) = &primary {
            warn!(topic, error = %e, "GNews failed, trying NewsAPI");
        } else {
            debug!(topic, "GNews returned nothing, trying NewsAPI");
        }

        match newsapi.search(&query).await {
            Ok(articles) => {
                self.record(Provider::NewsApi);
                Ok(articles)
            }
            Err(fallback_err) => {
                warn!(topic, error = %fallback_err, "NewsAPI failed");
                match primary {
                    // GNews answered (with nothing); that answer stands.
                    Ok(articles) => {
                        self.record(Provider::GNews);
                        Ok(articles)
                    }
                    Err(_) if self.gnews.is_none() => Err(fallback_err),
                    Err(primary_err) => Err(primary_err),
                }
            }
        }
    }
}

#[async_trait]
impl PluginAdapter for NewsFetcher {
    fn name(&self) -> &str {
        "news-fetcher"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Source
    }

    async fn health_check(&self) -> Result<HealthStatus, NewsbotError> {
        Ok(match (&self.gnews, &self.newsapi) {
            (Some(_), Some(_)) => HealthStatus::Healthy,
            (None, None) => HealthStatus::Unhealthy("no news API key configured".into()),
            (Some(_), None) => HealthStatus::Degraded("NewsAPI fallback not configured".into()),
            (None, Some(_)) => HealthStatus::Degraded("GNews not configured".into()),
        })
    }

    async fn shutdown(&self) -> Result<(), NewsbotError> {
        Ok(())
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
        GNewsClient::new(http(), "g".into(), "ru".into(), "ru".into(), 20)
            .with_base_url(format!("{}/gnews", server.uri()))
    }

    fn newsapi(server: &MockServer) -> NewsApiClient {
        NewsApiClient::new(http(), "n".into(), "ru".into(), 10)
            .with_base_url(format!("{}/newsapi", server.uri()))
    }

    fn gnews_body(urls: &[&str]) -> serde_json::Value {
        let articles: Vec<_> = urls
            .iter()
            .map(|u| {
                serde_json::json!({
                    "title": "t", "description": "d", "content": "c", "url": u,
                    "publishedAt": "2026-03-01T10:00:00Z",
                    "source": {"name": "G", "url": "https://g.example"}
                })
            })
            .collect();
        serde_json::json!({ "totalArticles": urls.len(), "articles": articles })
    }

    fn newsapi_body(urls: &[&str]) -> serde_json::Value {
        let articles: Vec<_> = urls
            .iter()
            .map(|u| {
                serde_json::json!({
                    "source": {"id": null, "name": "N"}, "title": "t", "url": u,
                    "publishedAt": "2026-03-01T10:00:00Z"
                })
            })
            .collect();
        serde_json::json!({ "status": "ok", "totalResults": urls.len(), "articles": articles })
    }

    async fn mount(server: &MockServer, route: &str, status: u16, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn empty_topic_is_rejected() {
        let fetcher = NewsFetcher::with_clients(None, None, BTreeMap::new());
        let err = fetcher.fetch_articles("   ").await.unwrap_err();
        assert!(matches!(err, NewsbotError::Source { .. }));
    }

    #[tokio::test]
    async fn gnews_results_win_when_present() {
        let server = MockServer::start().await;
        mount(&server, "/gnews", 200, gnews_body(&["https://g.example/1"])).await;
        Mock::given(method("GET"))
            .and(path("/newsapi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(newsapi_body(&[])))
            .expect(0)
            .mount(&server)
            .await;

        let fetcher =
            NewsFetcher::with_clients(Some(gnews(&server)), Some(newsapi(&server)), BTreeMap::new());
        let articles = fetcher.fetch_articles("rust").await.unwrap();
        assert_eq!(articles[0].url, "https://g.example/1");
        assert_eq!(fetcher.last_provider(), Some(Provider::GNews));
    }

    #[tokio::test]
    async fn empty_gnews_falls_back_to_newsapi() {
        let server = MockServer::start().await;
        mount(&server, "/gnews", 200, gnews_body(&[])).await;
        mount(&server, "/newsapi", 200, newsapi_body(&["https://n.example/1"])).await;

        let fetcher =
            NewsFetcher::with_clients(Some(gnews(&server)), Some(newsapi(&server)), BTreeMap::new());
        let articles = fetcher.fetch_articles("rust").await.unwrap();
        assert_eq!(articles[0].url, "https://n.example/1");
        assert_eq!(fetcher.last_provider(), Some(Provider::NewsApi));
    }

    #[tokio::test]
    async fn failing_gnews_falls_back_to_newsapi() {
        let server = MockServer::start().await;
        mount(&server, "/gnews", 403, serde_json::json!({"errors": ["quota"]})).await;
        mount(&server, "/newsapi", 200, newsapi_body(&["https://n.example/1"])).await;

        let fetcher =
            NewsFetcher::with_clients(Some(gnews(&server)), Some(newsapi(&server)), BTreeMap::new());
        assert_eq!(fetcher.fetch_articles("rust").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn both_failing_reports_gnews_error() {
        let server = MockServer::start().await;
        mount(&server, "/gnews", 403, serde_json::json!({"errors": ["quota"]})).await;
        mount(
            &server,
            "/newsapi",
            401,
            serde_json::json!({"status": "error", "code": "apiKeyInvalid", "message": "bad"}),
        )
        .await;

        let fetcher =
            NewsFetcher::with_clients(Some(gnews(&server)), Some(newsapi(&server)), BTreeMap::new());
        let err = fetcher.fetch_articles("rust").await.unwrap_err().to_string();
        assert!(err.contains("GNews"), "got: {err}");
        assert!(fetcher.last_provider().is_none());
    }

    #[tokio::test]
    async fn empty_gnews_answer_stands_when_fallback_fails() {
        let server = MockServer::start().await;
        mount(&server, "/gnews", 200, gnews_body(&[])).await;
        mount(&server, "/newsapi", 401, serde_json::json!({"message": "bad"})).await;

        let fetcher =
            NewsFetcher::with_clients(Some(gnews(&server)), Some(newsapi(&server)), BTreeMap::new());
        assert!(fetcher.fetch_articles("rust").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn newsapi_only_configuration_reports_its_own_error() {
        let server = MockServer::start().await;
        mount(&server, "/newsapi", 401, serde_json::json!({"message": "bad key"})).await;

        let fetcher = NewsFetcher::with_clients(None, Some(newsapi(&server)), BTreeMap::new());
        let err = fetcher.fetch_articles("rust").await.unwrap_err().to_string();
        assert!(err.contains("NewsAPI"), "got: {err}");
    }

    #[tokio::test]
    async fn aliases_rewrite_the_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gnews"))
            .and(query_param("q", "москва новости"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(gnews_body(&["https://g.example/msk"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let aliases = BTreeMap::from([("Новости Москвы".to_string(), "москва новости".to_string())]);
        let fetcher = NewsFetcher::with_clients(Some(gnews(&server)), None, aliases);
        let articles = fetcher.fetch_articles("новости москвы").await.unwrap();
        assert_eq!(articles.len(), 1);
    }

    #[tokio::test]
    async fn health_reflects_configured_providers() {
        let none = NewsFetcher::with_clients(None, None, BTreeMap::new());
        assert!(matches!(
            none.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));

        let config = NewsConfig {
            gnews_api_key: Some("g".into()),
            newsapi_api_key: Some("n".into()),
            ..NewsConfig::default()
        };
        let both = NewsFetcher::from_config(&config).unwrap();
        assert_eq!(both.health_check().await.unwrap(), HealthStatus::Healthy);
        assert_eq!(both.adapter_type(), AdapterType::Source);
    }
}
