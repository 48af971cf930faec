use serde::{Deserialize, Serialize};
use url::Url;

/// NewsAPI's tombstone for articles withdrawn by the publisher.
const REMOVED_MARKER: &str = "[Removed]";
const REMOVED_HOST: &str = "removed.com";

/// One news story as it flows through the digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub source: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub ai_summary: Option<String>,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            source: source.into(),
            description: None,
            content: None,
            ai_summary: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Description, falling back to content, falling back to empty.
    pub fn summary_input(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or(self.content.as_deref())
            .unwrap_or("")
    }

    /// Returns `None` for records without a title or URL, and for removed
    /// articles.
    pub(crate) fn from_raw(raw: RawArticle) -> Option<Self> {
        let title = raw.title.filter(|t| !t.trim().is_empty())?;
        let url = raw.url.filter(|u| !u.trim().is_empty())?;
        if title == REMOVED_MARKER || is_removed_url(&url) {
            return None;
        }

        Some(Self {
            title,
            url,
            source: raw
                .source
                .and_then(|s| s.name)
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            description: raw.description,
            content: raw.content,
            ai_summary: None,
        })
    }
}

fn is_removed_url(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.eq_ignore_ascii_case(REMOVED_HOST)))
        .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewsApiResponse {
    #[serde(default)]
    pub articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawArticle {
    pub title: Option<String>,
    pub url: Option<String>,
    pub source: Option<RawSource>,
    pub description: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSource {
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<Article> {
        let response: NewsApiResponse = serde_json::from_str(json).unwrap();
        response
            .articles
            .into_iter()
            .filter_map(Article::from_raw)
            .collect()
    }

    #[test]
    fn test_from_raw_keeps_order_and_fields() {
        let articles = parse(
            r#"{"status":"ok","totalResults":2,"articles":[
                {"source":{"id":null,"name":"Reuters"},"title":"A","url":"https://a.example/1",
                 "description":"desc a","content":"body a"},
                {"source":{"id":null,"name":"BBC"},"title":"B","url":"https://b.example/2",
                 "description":null,"content":null}
            ]}"#,
        );

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "A");
        assert_eq!(articles[0].source, "Reuters");
        assert_eq!(articles[0].description.as_deref(), Some("desc a"));
        assert_eq!(articles[1].title, "B");
        assert!(articles[1].content.is_none());
    }

    #[test]
    fn test_from_raw_skips_incomplete_and_removed() {
        let articles = parse(
            r#"{"articles":[
                {"source":{"name":"X"},"title":null,"url":"https://x.example"},
                {"source":{"name":"[Removed]"},"title":"[Removed]","url":"https://removed.com"},
                {"title":"Kept","url":"https://kept.example"}
            ]}"#,
        );

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Kept");
        assert_eq!(articles[0].source, "Unknown");
    }

    #[test]
    fn test_from_raw_keeps_look_alike_hosts() {
        let articles = parse(
            r#"{"articles":[
                {"source":{"name":"Wired"},"title":"How scams get removed","url":"https://notremoved.com/story"},
                {"source":{"name":"Blog"},"title":"Takedowns","url":"https://xyzremoved.com/a?ref=removed.com"},
                {"source":{"name":"[Removed]"},"title":"Withdrawn","url":"https://removed.com"}
            ]}"#,
        );

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].url, "https://notremoved.com/story");
        assert_eq!(articles[1].title, "Takedowns");
    }

    #[test]
    fn test_missing_articles_field_is_empty() {
        assert!(parse(r#"{"status":"ok","totalResults":0}"#).is_empty());
    }

    #[test]
    fn test_summary_input_fallbacks() {
        let mut article = Article::new("T", "https://t.example", "S");
        assert_eq!(article.summary_input(), "");

        article.content = Some("content text".to_string());
        assert_eq!(article.summary_input(), "content text");

        article.description = Some("description text".to_string());
        assert_eq!(article.summary_input(), "description text");
    }
}
