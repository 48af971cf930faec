use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

use crate::error::{DigestError, Result};

pub const NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const SENDER_EMAIL: &str = "SENDER_EMAIL";
pub const RECIPIENT_EMAIL: &str = "RECIPIENT_EMAIL";
pub const LINKEDIN_ACCESS_TOKEN: &str = "LINKEDIN_ACCESS_TOKEN";
pub const LINKEDIN_AUTHOR_URN: &str = "LINKEDIN_AUTHOR_URN";
pub const SMTP_USERNAME: &str = "SMTP_USERNAME";
pub const SMTP_PASSWORD: &str = "SMTP_PASSWORD";

const KNOWN_KEYS: [&str; 8] = [
    NEWS_API_KEY,
    ANTHROPIC_API_KEY,
    SENDER_EMAIL,
    RECIPIENT_EMAIL,
    LINKEDIN_ACCESS_TOKEN,
    LINKEDIN_AUTHOR_URN,
    SMTP_USERNAME,
    SMTP_PASSWORD,
];

/// Source of the JSON-encoded credential mapping.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret_string(&self, secret_id: &str, region: &str) -> Result<String>;
}

/// Reads `<root>/<region>/<secret_id>.json`.
pub struct FileSecretStore {
    root: PathBuf,
}

impl FileSecretStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn secret_path(&self, secret_id: &str, region: &str) -> PathBuf {
        self.root.join(region).join(format!("{}.json", secret_id))
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_secret_string(&self, secret_id: &str, region: &str) -> Result<String> {
        let path = self.secret_path(secret_id, region);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| DigestError::SecretRetrieval {
                secret_id: secret_id.to_string(),
                region: region.to_string(),
                reason: format!("{}: {}", path.display(), e),
            })
    }
}

/// Builds the mapping from process environment variables named after the
/// credential keys. Secret id and region are ignored.
#[derive(Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    fn collect(vars: impl Iterator<Item = (String, String)>) -> Map<String, Value> {
        vars.filter(|(key, _)| KNOWN_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key, Value::String(value)))
            .collect()
    }
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn get_secret_string(&self, _secret_id: &str, _region: &str) -> Result<String> {
        Ok(Value::Object(Self::collect(std::env::vars())).to_string())
    }
}

/// Typed view of the secret mapping, validated once at load time.
#[derive(Clone)]
pub struct CredentialBundle {
    pub news_api_key: String,
    pub anthropic_api_key: Option<String>,
    pub sender_email: String,
    /// Comma-separated, as stored.
    pub recipient_email: String,
    pub linkedin_access_token: String,
    pub linkedin_author_urn: String,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
}

impl CredentialBundle {
    /// Validates every required key in one pass. `ANTHROPIC_API_KEY` is only
    /// required when the summarizer stage is enabled. Keys this job does not
    /// use may hold any JSON value; a known key with a non-string value counts
    /// as missing.
    pub fn from_map(values: &Map<String, Value>, require_summarizer: bool) -> Result<Self> {
        let get = |key: &str| {
            values
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let mut required = vec![
            SENDER_EMAIL,
            RECIPIENT_EMAIL,
            NEWS_API_KEY,
            LINKEDIN_ACCESS_TOKEN,
            LINKEDIN_AUTHOR_URN,
        ];
        if require_summarizer {
            required.push(ANTHROPIC_API_KEY);
        }
        let missing: Vec<&'static str> = required
            .into_iter()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(DigestError::MissingCredentials(missing));
        }

        let require = |key: &str| get(key).unwrap_or_default();

        Ok(Self {
            news_api_key: require(NEWS_API_KEY),
            anthropic_api_key: get(ANTHROPIC_API_KEY),
            sender_email: require(SENDER_EMAIL),
            recipient_email: require(RECIPIENT_EMAIL),
            linkedin_access_token: require(LINKEDIN_ACCESS_TOKEN),
            linkedin_author_urn: require(LINKEDIN_AUTHOR_URN),
            smtp_username: get(SMTP_USERNAME),
            smtp_password: get(SMTP_PASSWORD),
        })
    }

    /// Recipient list split on commas, whitespace trimmed, empties dropped.
    pub fn recipients(&self) -> Vec<String> {
        self.recipient_email
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const REDACTED: &str = "<redacted>";
        f.debug_struct("CredentialBundle")
            .field("news_api_key", &REDACTED)
            .field("anthropic_api_key", &self.anthropic_api_key.as_ref().map(|_| REDACTED))
            .field("sender_email", &REDACTED)
            .field("recipient_email", &REDACTED)
            .field("linkedin_access_token", &REDACTED)
            .field("linkedin_author_urn", &REDACTED)
            .field("smtp_username", &self.smtp_username.as_ref().map(|_| REDACTED))
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| REDACTED))
            .finish()
    }
}

/// Fetch the secret and turn it into a validated bundle. Every error here is
/// fatal.
pub async fn load_credentials(
    store: &dyn SecretStore,
    secret_id: &str,
    region: &str,
    require_summarizer: bool,
) -> Result<CredentialBundle> {
    let raw = store.get_secret_string(secret_id, region).await?;

    let values: Map<String, Value> =
        serde_json::from_str(&raw).map_err(|source| DigestError::SecretFormat {
            secret_id: secret_id.to_string(),
            source,
        })?;

    CredentialBundle::from_map(&values, require_summarizer)
}
