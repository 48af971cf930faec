use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_SECRET_NAME: &str = "rod/FraudNewsAgent/ApiKeys";
pub const DEFAULT_REGION: &str = "eu-north-1";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org";
pub const DEFAULT_ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_LINKEDIN_API_URL: &str = "https://api.linkedin.com";

const APP_DIR: &str = "fraud-news-agent";

/// Where the credential bundle is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretsBackend {
    /// `<secrets_dir>/<region>/<secret_id>.json`
    File,
    /// Process environment, one variable per credential key.
    Env,
}

impl SecretsBackend {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "file" => Some(SecretsBackend::File),
            "env" => Some(SecretsBackend::Env),
            _ => None,
        }
    }
}

/// Everything the pipeline needs besides the credentials themselves.
///
/// The library never reads the environment on its own; callers build this
/// explicitly (tests) or through [`Config::from_env`] (the binary).
#[derive(Debug, Clone)]
pub struct Config {
    pub secret_id: String,
    pub region: String,
    pub secrets_backend: SecretsBackend,
    pub secrets_dir: PathBuf,
    pub summarize: bool,
    pub dry_run: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub news_api_url: String,
    pub anthropic_api_url: String,
    pub linkedin_api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let secrets_backend = match env::var("SECRETS_BACKEND") {
            Ok(name) => SecretsBackend::from_name(&name).with_context(|| {
                format!("SECRETS_BACKEND must be 'file' or 'env', got '{}'", name)
            })?,
            Err(_) => SecretsBackend::File,
        };

        let secrets_dir = match env::var("SECRETS_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::config_dir()
                .context("Could not determine config directory; set SECRETS_DIR")?
                .join(APP_DIR)
                .join("secrets"),
        };

        let smtp_port = match env::var("SMTP_PORT") {
            Ok(port) => port
                .parse()
                .with_context(|| format!("SMTP_PORT is not a valid port: {}", port))?,
            Err(_) => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            secret_id: env_or("SECRET_NAME", DEFAULT_SECRET_NAME),
            region: env_or("REGION_NAME", DEFAULT_REGION),
            secrets_backend,
            secrets_dir,
            summarize: env_flag("DIGEST_SUMMARIZE", true),
            dry_run: false,
            smtp_host: env_or("SMTP_HOST", DEFAULT_SMTP_HOST),
            smtp_port,
            news_api_url: env_or("NEWS_API_URL", DEFAULT_NEWS_API_URL),
            anthropic_api_url: env_or("ANTHROPIC_API_URL", DEFAULT_ANTHROPIC_API_URL),
            linkedin_api_url: env_or("LINKEDIN_API_URL", DEFAULT_LINKEDIN_API_URL),
        })
    }

    fn try_load_dotenv() {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/fraud-news-agent/.env
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join(APP_DIR).join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }

        // If none found, that's okay - the scheduler may set variables directly
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
