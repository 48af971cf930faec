use thiserror::Error;

pub type Result<T> = std::result::Result<T, DigestError>;

/// Whether a failure aborts the run or is isolated to one sub-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Contained,
}

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("Unable to retrieve secret {secret_id} in {region}: {reason}")]
    SecretRetrieval {
        secret_id: String,
        region: String,
        reason: String,
    },

    #[error("Secret {secret_id} is not a JSON object: {source}")]
    SecretFormat {
        secret_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Invalid endpoint URL {url}: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to fetch news: {0}")]
    NewsRequest(#[source] reqwest::Error),

    #[error("News API returned error: {status} - {body}")]
    NewsStatus { status: u16, body: String },

    #[error("Failed to parse News API response: {0}")]
    NewsParse(#[source] reqwest::Error),

    #[error("Failed to set up {service} client: {reason}")]
    ServiceSetup {
        service: &'static str,
        reason: String,
    },

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Email delivery failed: {0}")]
    Email(String),

    #[error("Failed to post to LinkedIn: {0}")]
    SocialRequest(#[source] reqwest::Error),

    #[error("LinkedIn API returned error: {status} - {body}")]
    SocialStatus { status: u16, body: String },
}

impl DigestError {
    pub fn severity(&self) -> Severity {
        match self {
            DigestError::SecretRetrieval { .. }
            | DigestError::SecretFormat { .. }
            | DigestError::MissingCredentials(_)
            | DigestError::HttpClient(_)
            | DigestError::InvalidEndpoint { .. }
            | DigestError::NewsRequest(_)
            | DigestError::NewsStatus { .. }
            | DigestError::NewsParse(_) => Severity::Fatal,
            DigestError::ServiceSetup { .. }
            | DigestError::Summarization(_)
            | DigestError::Email(_)
            | DigestError::SocialRequest(_)
            | DigestError::SocialStatus { .. } => Severity::Contained,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_and_fetcher_errors_are_fatal() {
        let missing = DigestError::MissingCredentials(vec!["SENDER_EMAIL"]);
        assert!(missing.is_fatal());

        let status = DigestError::NewsStatus {
            status: 401,
            body: "apiKeyInvalid".to_string(),
        };
        assert!(status.is_fatal());
    }

    #[test]
    fn test_delivery_and_summary_errors_are_contained() {
        assert_eq!(
            DigestError::Summarization("timeout".to_string()).severity(),
            Severity::Contained
        );
        assert_eq!(
            DigestError::Email("connection refused".to_string()).severity(),
            Severity::Contained
        );
        let setup = DigestError::ServiceSetup {
            service: "LinkedIn",
            reason: "no TLS backend".to_string(),
        };
        assert!(!setup.is_fatal());

        let social = DigestError::SocialStatus {
            status: 403,
            body: "forbidden".to_string(),
        };
        assert!(!social.is_fatal());
    }

    #[test]
    fn test_missing_credentials_lists_every_key() {
        let err = DigestError::MissingCredentials(vec!["SENDER_EMAIL", "RECIPIENT_EMAIL"]);
        assert_eq!(
            err.to_string(),
            "Missing required credentials: SENDER_EMAIL, RECIPIENT_EMAIL"
        );
    }
}
