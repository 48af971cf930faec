//! One invocation of the digest job: load credentials, fetch, summarize,
//! render, deliver.
//!
//! Every stage result goes through [`DigestAgent::settle`], which propagates
//! fatal errors and logs contained ones so the run can continue.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::digest::Digest;
use crate::email::{EmailMessage, Mailer, SmtpMailer};
use crate::error::{DigestError, Result};
use crate::linkedin::{LinkedInClient, SocialPoster};
use crate::models::Article;
use crate::news::{NewsApiClient, NewsSource};
use crate::secrets::{load_credentials, CredentialBundle, SecretStore};
use crate::summarizer::{
    summarize_articles, ClaudeSummarizer, SummaryStats, TextSummarizer, SUMMARY_FAILED_PLACEHOLDER,
};

pub const COMPLETED_MESSAGE: &str = "Process completed!";

/// Builds each external collaborator when its stage starts, so a setup
/// failure carries the severity of the stage it belongs to.
pub trait ServiceFactory: Send + Sync {
    fn news(
        &self,
        config: &Config,
        credentials: &CredentialBundle,
    ) -> Result<Box<dyn NewsSource>>;

    /// Only called when summarization is enabled.
    fn summarizer(
        &self,
        config: &Config,
        credentials: &CredentialBundle,
    ) -> Result<Box<dyn TextSummarizer>>;

    fn mailer(&self, config: &Config, credentials: &CredentialBundle) -> Result<Box<dyn Mailer>>;

    /// Only called when there is a post to publish.
    fn social(
        &self,
        config: &Config,
        credentials: &CredentialBundle,
    ) -> Result<Box<dyn SocialPoster>>;
}

/// NewsAPI, Claude, SMTP and LinkedIn.
pub struct HttpServiceFactory;

impl ServiceFactory for HttpServiceFactory {
    fn news(
        &self,
        config: &Config,
        credentials: &CredentialBundle,
    ) -> Result<Box<dyn NewsSource>> {
        let news = NewsApiClient::new(&config.news_api_url, &credentials.news_api_key)?;
        Ok(Box::new(news))
    }

    fn summarizer(
        &self,
        config: &Config,
        credentials: &CredentialBundle,
    ) -> Result<Box<dyn TextSummarizer>> {
        let key = credentials
            .anthropic_api_key
            .as_ref()
            .ok_or_else(|| DigestError::ServiceSetup {
                service: "Claude",
                reason: "no API key".to_string(),
            })?;
        let summarizer = ClaudeSummarizer::new(&config.anthropic_api_url, key)?;
        Ok(Box::new(summarizer))
    }

    fn mailer(&self, config: &Config, credentials: &CredentialBundle) -> Result<Box<dyn Mailer>> {
        let mut mailer = SmtpMailer::new(&config.smtp_host, config.smtp_port);
        if let (Some(user), Some(pass)) = (&credentials.smtp_username, &credentials.smtp_password)
        {
            mailer = mailer.with_credentials(user.clone(), pass.clone());
        }
        Ok(Box::new(mailer))
    }

    fn social(
        &self,
        config: &Config,
        credentials: &CredentialBundle,
    ) -> Result<Box<dyn SocialPoster>> {
        let social = LinkedInClient::new(
            &config.linkedin_api_url,
            &credentials.linkedin_access_token,
            &credentials.linkedin_author_urn,
        )?;
        Ok(Box::new(social))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Skipped,
    Failed(String),
}

/// What happened during a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub articles_fetched: usize,
    pub summaries_succeeded: usize,
    pub summaries_failed: usize,
    pub email: DeliveryStatus,
    pub social: DeliveryStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationOutcome {
    pub status_code: u16,
    pub body: String,
    #[serde(skip)]
    pub digest: Digest,
    #[serde(skip)]
    pub report: RunReport,
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Email,
    Social,
}

pub struct DigestAgent<'a> {
    config: &'a Config,
    secrets: &'a dyn SecretStore,
    factory: &'a dyn ServiceFactory,
}

impl<'a> DigestAgent<'a> {
    pub fn new(
        config: &'a Config,
        secrets: &'a dyn SecretStore,
        factory: &'a dyn ServiceFactory,
    ) -> Self {
        Self {
            config,
            secrets,
            factory,
        }
    }

    /// Run the whole pipeline once. `event` is the opaque trigger payload.
    pub async fn run(&self, event: &Value, now: DateTime<Utc>) -> Result<InvocationOutcome> {
        info!("Agent starting");
        debug!(%event, "Trigger event");

        let outcome = self.run_stages(now).await;
        match &outcome {
            Ok(o) => info!(
                articles = o.report.articles_fetched,
                email = ?o.report.email,
                social = ?o.report.social,
                "Agent finished"
            ),
            Err(e) => error!(error = %e, "Agent aborted"),
        }
        outcome
    }

    async fn run_stages(&self, now: DateTime<Utc>) -> Result<InvocationOutcome> {
        let credentials = load_credentials(
            self.secrets,
            &self.config.secret_id,
            &self.config.region,
            self.config.summarize,
        )
        .await?;
        let news = self.factory.news(self.config, &credentials)?;
        let mut articles = news.fetch_articles(now).await?;

        let stats = self.summarize(&credentials, &mut articles).await?;

        let digest = Digest::render(&articles, now.date_naive());

        let (email, social) = if self.config.dry_run {
            info!("Dry run: skipping email and LinkedIn delivery");
            (DeliveryStatus::Skipped, DeliveryStatus::Skipped)
        } else {
            let email = self.send_email(&credentials, &digest).await?;
            let social = self.post_social(&credentials, &digest).await?;
            (email, social)
        };

        Ok(InvocationOutcome {
            status_code: 200,
            body: COMPLETED_MESSAGE.to_string(),
            digest,
            report: RunReport {
                articles_fetched: articles.len(),
                summaries_succeeded: stats.succeeded,
                summaries_failed: stats.failed,
                email,
                social,
            },
        })
    }

    /// A summarizer that cannot be set up counts as a failure for every
    /// article.
    async fn summarize(
        &self,
        credentials: &CredentialBundle,
        articles: &mut [Article],
    ) -> Result<SummaryStats> {
        if !self.config.summarize {
            debug!("Summarization disabled");
            return Ok(SummaryStats::default());
        }

        match self.factory.summarizer(self.config, credentials) {
            Ok(summarizer) => Ok(summarize_articles(summarizer.as_ref(), articles).await),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(error = %e, "Summarizer unavailable, using placeholders");
                for article in articles.iter_mut() {
                    article.ai_summary = Some(SUMMARY_FAILED_PLACEHOLDER.to_string());
                }
                Ok(SummaryStats {
                    succeeded: 0,
                    failed: articles.len(),
                })
            }
        }
    }

    async fn send_email(
        &self,
        credentials: &CredentialBundle,
        digest: &Digest,
    ) -> Result<DeliveryStatus> {
        let message = EmailMessage {
            from: credentials.sender_email.clone(),
            to: credentials.recipients(),
            subject: digest.subject.clone(),
            html_body: digest.html_body.clone(),
            text_body: digest.text_body.clone(),
        };

        let result = match self.factory.mailer(self.config, credentials) {
            Ok(mailer) => mailer.send(&message).await,
            Err(e) => Err(e),
        };
        Self::settle(Stage::Email, result)
    }

    async fn post_social(
        &self,
        credentials: &CredentialBundle,
        digest: &Digest,
    ) -> Result<DeliveryStatus> {
        let Some(text) = digest.social_post.as_deref() else {
            info!("No content to post to LinkedIn");
            return Ok(DeliveryStatus::Skipped);
        };

        let result = match self.factory.social(self.config, credentials) {
            Ok(poster) => poster.post(text).await,
            Err(e) => Err(e),
        };
        Self::settle(Stage::Social, result)
    }

    /// Fatal errors propagate; contained ones are logged and reported as
    /// `Failed`.
    fn settle(stage: Stage, result: Result<()>) -> Result<DeliveryStatus> {
        match result {
            Ok(()) => Ok(DeliveryStatus::Sent),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(stage = ?stage, error = %e, "Contained failure, continuing");
                Ok(DeliveryStatus::Failed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_contains_delivery_errors() {
        let result: Result<()> = Err(DigestError::Email("smtp down".to_string()));
        assert_eq!(
            DigestAgent::settle(Stage::Email, result).unwrap(),
            DeliveryStatus::Failed("Email delivery failed: smtp down".to_string())
        );
    }

    #[test]
    fn test_settle_propagates_fatal_errors() {
        let result: Result<()> = Err(DigestError::MissingCredentials(vec!["NEWS_API_KEY"]));
        assert!(DigestAgent::settle(Stage::Social, result).is_err());
    }

    #[test]
    fn test_outcome_serializes_like_handler_response() {
        let outcome = InvocationOutcome {
            status_code: 200,
            body: COMPLETED_MESSAGE.to_string(),
            digest: Digest::render(&[], chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            report: RunReport {
                articles_fetched: 0,
                summaries_succeeded: 0,
                summaries_failed: 0,
                email: DeliveryStatus::Sent,
                social: DeliveryStatus::Skipped,
            },
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"statusCode": 200, "body": "Process completed!"})
        );
    }

    #[test]
    fn test_http_factory_summarizer_without_key_is_contained() {
        let config = Config {
            secret_id: "test/ApiKeys".to_string(),
            region: "eu-north-1".to_string(),
            secrets_backend: crate::config::SecretsBackend::Env,
            secrets_dir: ".".into(),
            summarize: false,
            dry_run: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            news_api_url: "http://news.invalid".to_string(),
            anthropic_api_url: "http://claude.invalid".to_string(),
            linkedin_api_url: "http://linkedin.invalid".to_string(),
        };
        let values = serde_json::json!({
            "NEWS_API_KEY": "news-key",
            "SENDER_EMAIL": "digest@example.com",
            "RECIPIENT_EMAIL": "alice@example.com",
            "LINKEDIN_ACCESS_TOKEN": "token",
            "LINKEDIN_AUTHOR_URN": "urn:li:person:1"
        });
        let credentials =
            CredentialBundle::from_map(values.as_object().unwrap(), false).unwrap();

        let err = match HttpServiceFactory.summarizer(&config, &credentials) {
            Err(e) => e,
            Ok(_) => panic!("summarizer built without an API key"),
        };
        assert!(matches!(err, DigestError::ServiceSetup { service: "Claude", .. }));
        assert!(!err.is_fatal());
        assert!(HttpServiceFactory.social(&config, &credentials).is_ok());
    }
}
