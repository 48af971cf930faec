//! Digest delivery over SMTP.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::error::{DigestError, Result};

/// One outgoing digest email.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

pub struct SmtpMailer {
    host: String,
    port: u16,
    credentials: Option<Credentials>,
}

impl SmtpMailer {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, username: String, password: String) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Build the MIME message with both HTML and plain-text parts.
    pub fn build_message(message: &EmailMessage) -> Result<Message> {
        if message.to.is_empty() {
            return Err(DigestError::Email("no recipients".to_string()));
        }

        let from: Mailbox = message
            .from
            .parse()
            .map_err(|e| DigestError::Email(format!("invalid sender address: {}", e)))?;

        let mut builder = Message::builder().from(from).subject(message.subject.clone());
        for recipient in &message.to {
            let to: Mailbox = recipient.parse().map_err(|e| {
                DigestError::Email(format!("invalid recipient address {}: {}", recipient, e))
            })?;
            builder = builder.to(to);
        }

        builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(message.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(message.html_body.clone()),
                    ),
            )
            .map_err(|e| DigestError::Email(format!("failed to build message: {}", e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let email = Self::build_message(message)?;

        let mut transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| DigestError::Email(format!("failed to create SMTP transport: {}", e)))?
            .port(self.port);
        if let Some(creds) = &self.credentials {
            transport = transport.credentials(creds.clone());
        }
        let mailer: AsyncSmtpTransport<Tokio1Executor> = transport.build();

        mailer
            .send(email)
            .await
            .map_err(|e| DigestError::Email(format!("SMTP send failed: {}", e)))?;

        info!(
            recipients = message.to.len(),
            subject = %message.subject,
            "Email sent successfully"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &[&str]) -> EmailMessage {
        EmailMessage {
            from: "digest@example.com".to_string(),
            to: to.iter().map(|s| s.to_string()).collect(),
            subject: "Your Weekly Fraud News Digest - 2026-10-19".to_string(),
            html_body: "<p>hi</p>".to_string(),
            text_body: "hi".to_string(),
        }
    }

    #[test]
    fn test_build_message_addresses_every_recipient() {
        let built = SmtpMailer::build_message(&message(&["a@example.com", "b@example.com"]))
            .unwrap();
        let envelope = built.envelope();

        assert_eq!(envelope.to().len(), 2);
        assert_eq!(
            envelope.from().map(|a| a.to_string()).as_deref(),
            Some("digest@example.com")
        );
    }

    #[test]
    fn test_build_message_rejects_empty_recipients() {
        let err = SmtpMailer::build_message(&message(&[])).unwrap_err();
        assert!(matches!(err, DigestError::Email(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let err = SmtpMailer::build_message(&message(&["not-an-address"])).unwrap_err();
        assert!(err.to_string().contains("not-an-address"));
    }
}
