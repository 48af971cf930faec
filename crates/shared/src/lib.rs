// Public modules
pub mod config;
pub mod digest;
pub mod email;
pub mod error;
pub mod io;
pub mod linkedin;
pub mod models;
pub mod news;
pub mod pipeline;
pub mod secrets;
pub mod summarizer;

// Re-export commonly used types
pub use config::{Config, SecretsBackend};
pub use digest::{Digest, DigestFormatter};
pub use email::{EmailMessage, Mailer, SmtpMailer};
pub use error::{DigestError, Severity};
pub use io::{get_default_preview_dir, save_preview};
pub use linkedin::{LinkedInClient, SocialPoster};
pub use models::Article;
pub use news::{NewsApiClient, NewsSource};
pub use pipeline::{
    DeliveryStatus, DigestAgent, HttpServiceFactory, InvocationOutcome, RunReport,
    ServiceFactory,
};
pub use secrets::{CredentialBundle, EnvSecretStore, FileSecretStore, SecretStore};
pub use summarizer::{ClaudeSummarizer, TextSummarizer, SUMMARY_FAILED_PLACEHOLDER};
