// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the GNews and NewsAPI search endpoints.
//!
//! Optional fields are common in both APIs; everything that may be `null` or
//! absent is an `Option` and defaulted during conversion.

use chrono::{DateTime, Utc};
use newsbot_core::types::{Article, Publisher};
use serde::Deserialize;

// --- GNews ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GNewsResponse {
    #[serde(default)]
    pub total_articles: Option<u64>,
    #[serde(default)]
    pub articles: Vec<GNewsArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GNewsArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub url: String,
    #[serde(default)]
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub source: Option<GNewsSource>,
}

#[derive(Debug, Deserialize)]
pub struct GNewsSource {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Error body returned by GNews, e.g. `{"errors": ["You did not provide an API key."]}`.
#[derive(Debug, Deserialize)]
pub struct GNewsErrorResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}

impl From<GNewsArticle> for Article {
    fn from(a: GNewsArticle) -> Self {
        let source = a.source.map_or_else(Publisher::default, |s| Publisher {
            name: s.name.unwrap_or_default(),
            url: s.url.filter(|u| !u.is_empty()),
        });
        Article {
            title: a.title.unwrap_or_default(),
            description: a.description.unwrap_or_default(),
            content: a.content.unwrap_or_default(),
            url: a.url,
            image: a.image.filter(|u| !u.is_empty()),
            published_at: a.published_at,
            source,
        }
    }
}

// --- NewsAPI ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiArticle {
    #[serde(default)]
    pub source: Option<NewsApiSource>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub url_to_image: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewsApiSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Error body returned by NewsAPI, e.g. `{"status":"error","code":"apiKeyInvalid","message":"..."}`.
#[derive(Debug, Deserialize)]
pub struct NewsApiErrorResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<NewsApiArticle> for Article {
    fn from(a: NewsApiArticle) -> Self {
        Article {
            title: a.title.unwrap_or_default(),
            description: a.description.unwrap_or_default(),
            content: a.content.unwrap_or_default(),
            url: a.url,
            image: a.url_to_image.filter(|u| !u.is_empty()),
            published_at: a.published_at,
            // NewsAPI does not report a publisher homepage.
            source: Publisher {
                name: a.source.and_then(|s| s.name).unwrap_or_default(),
                url: None,
            },
        }
    }
}
