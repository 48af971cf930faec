use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{DigestError, Result};
use crate::models::{Article, NewsApiResponse};

pub const TOPIC_QUERY: &str = "(\"payment fraud\" OR \"financial crime\" OR \"identity theft\" OR \"kyc\" OR \"aml\" OR \"messaging spam\" OR \"dating scam\" OR \"policy abuse\") AND (update OR news OR trend)";
pub const WINDOW_DAYS: i64 = 7;
pub const PAGE_SIZE: u32 = 5;

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Most popular matching articles from the trailing window ending at `now`,
    /// in the provider's order.
    async fn fetch_articles(&self, now: DateTime<Utc>) -> Result<Vec<Article>>;
}

/// Query parameters for one search request.
pub fn search_params(api_key: &str, now: DateTime<Utc>) -> Vec<(&'static str, String)> {
    let since = (now - Duration::days(WINDOW_DAYS)).format("%Y-%m-%d");
    vec![
        ("q", TOPIC_QUERY.to_string()),
        ("from", since.to_string()),
        ("sortBy", "popularity".to_string()),
        ("language", "en".to_string()),
        ("pageSize", PAGE_SIZE.to_string()),
        ("apiKey", api_key.to_string()),
    ]
}

pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("fraud-news-agent/0.1")
            .build()
            .map_err(DigestError::HttpClient)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn search_url(&self, now: DateTime<Utc>) -> Result<Url> {
        let endpoint = format!("{}/v2/everything", self.base_url.trim_end_matches('/'));
        Url::parse_with_params(&endpoint, search_params(&self.api_key, now)).map_err(|source| {
            DigestError::InvalidEndpoint {
                url: endpoint.clone(),
                source,
            }
        })
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn fetch_articles(&self, now: DateTime<Utc>) -> Result<Vec<Article>> {
        let url = self.search_url(now)?;
        debug!(endpoint = %url.path(), "Querying news API");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(DigestError::NewsRequest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(DigestError::NewsStatus {
                status: status.as_u16(),
                body,
            });
        }

        let payload = response
            .json::<NewsApiResponse>()
            .await
            .map_err(DigestError::NewsParse)?;

        let received = payload.articles.len();
        let articles: Vec<Article> = payload
            .articles
            .into_iter()
            .filter_map(Article::from_raw)
            .collect();

        if articles.len() < received {
            warn!(
                skipped = received - articles.len(),
                "Dropped incomplete or removed articles"
            );
        }
        info!(count = articles.len(), "Fetched fraud news");

        Ok(articles)
    }
}
