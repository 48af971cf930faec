use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::error::{DigestError, Result};

#[async_trait]
pub trait SocialPoster: Send + Sync {
    async fn post(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UgcPost {
    author: String,
    lifecycle_state: &'static str,
    specific_content: SpecificContent,
    visibility: Visibility,
}

#[derive(Debug, Serialize)]
struct SpecificContent {
    #[serde(rename = "com.linkedin.ugc.ShareContent")]
    share_content: ShareContent,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareContent {
    share_commentary: ShareCommentary,
    share_media_category: &'static str,
}

#[derive(Debug, Serialize)]
struct ShareCommentary {
    text: String,
}

#[derive(Debug, Serialize)]
struct Visibility {
    #[serde(rename = "com.linkedin.ugc.MemberNetworkVisibility")]
    member_network_visibility: &'static str,
}

impl UgcPost {
    /// A published, public, text-only share.
    pub fn new(author_urn: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author_urn.into(),
            lifecycle_state: "PUBLISHED",
            specific_content: SpecificContent {
                share_content: ShareContent {
                    share_commentary: ShareCommentary { text: text.into() },
                    share_media_category: "NONE",
                },
            },
            visibility: Visibility {
                member_network_visibility: "PUBLIC",
            },
        }
    }
}

pub struct LinkedInClient {
    client: Client,
    base_url: String,
    access_token: String,
    author_urn: String,
}

impl LinkedInClient {
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        author_urn: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| DigestError::ServiceSetup {
                service: "LinkedIn",
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            access_token: access_token.into(),
            author_urn: author_urn.into(),
        })
    }
}

#[async_trait]
impl SocialPoster for LinkedInClient {
    async fn post(&self, text: &str) -> Result<()> {
        let payload = UgcPost::new(self.author_urn.clone(), text);

        let response = self
            .client
            .post(format!("{}/v2/ugcPosts", self.base_url.trim_end_matches('/')))
            .bearer_auth(&self.access_token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&payload)
            .send()
            .await
            .map_err(DigestError::SocialRequest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(DigestError::SocialStatus {
                status: status.as_u16(),
                body,
            });
        }

        info!("Posted to LinkedIn successfully");
        Ok(())
    }
}
