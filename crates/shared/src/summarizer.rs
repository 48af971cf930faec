use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DigestError, Result};
use crate::models::Article;

pub const SUMMARY_FAILED_PLACEHOLDER: &str = "(AI summary failed to generate)";

const MODEL: &str = "claude-3-5-haiku-20241022";
const MAX_TOKENS: u32 = 100;
const TEMPERATURE: f32 = 0.2;
const MAX_INPUT_BYTES: usize = 10_000;
const SYSTEM_PROMPT: &str = "You are an analyst covering fraud, financial crime and security news. \
Summarize the article text you are given in exactly one concise sentence. \
Use only facts from the text. Reply with the sentence and nothing else.";

#[async_trait]
pub trait TextSummarizer: Send + Sync {
    /// One-sentence summary of `text`.
    async fn summarize(&self, text: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    text: String,
}

pub struct ClaudeSummarizer {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ClaudeSummarizer {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| DigestError::ServiceSetup {
                service: "Claude",
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn build_request(text: &str) -> ClaudeRequest {
        ClaudeRequest {
            model: MODEL.to_string(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: format!("Article:\n{}", truncate_content(text, MAX_INPUT_BYTES)),
            }],
        }
    }

    fn extract_sentence(response: ClaudeResponse) -> Result<String> {
        response
            .content
            .into_iter()
            .map(|c| c.text.trim().to_string())
            .find(|t| !t.is_empty())
            .ok_or_else(|| DigestError::Summarization("empty completion".to_string()))
    }
}

#[async_trait]
impl TextSummarizer for ClaudeSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        let request = Self::build_request(text);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url.trim_end_matches('/')))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| DigestError::Summarization(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(DigestError::Summarization(format!(
                "Claude API error {}: {}",
                status, error_text
            )));
        }

        let claude_response = response
            .json::<ClaudeResponse>()
            .await
            .map_err(|e| DigestError::Summarization(format!("invalid response: {}", e)))?;

        Self::extract_sentence(claude_response)
    }
}

/// Truncate to at most `max_bytes`, respecting UTF-8 boundaries.
pub fn truncate_content(content: &str, max_bytes: usize) -> &str {
    if content.len() <= max_bytes {
        return content;
    }
    let mut end = max_bytes;
    while end > 0 && !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SummaryStats {
    pub succeeded: usize,
    pub failed: usize,
}

/// Summarize each article in order. A failure degrades that article's summary
/// to [`SUMMARY_FAILED_PLACEHOLDER`] and moves on to the next one.
pub async fn summarize_articles(
    summarizer: &dyn TextSummarizer,
    articles: &mut [Article],
) -> SummaryStats {
    let mut stats = SummaryStats::default();

    for article in articles.iter_mut() {
        match summarizer.summarize(article.summary_input()).await {
            Ok(summary) => {
                debug!(url = %article.url, "Summarized article");
                article.ai_summary = Some(summary);
                stats.succeeded += 1;
            }
            Err(e) => {
                warn!(url = %article.url, error = %e, "Summary failed, using placeholder");
                article.ai_summary = Some(SUMMARY_FAILED_PLACEHOLDER.to_string());
                stats.failed += 1;
            }
        }
    }

    info!(
        succeeded = stats.succeeded,
        failed = stats.failed,
        "Summarization finished"
    );
    stats
}
