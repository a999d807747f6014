//! Outbound email for confirmation codes.

use lettre::{
    transport::smtp::authentication::Credentials, AsyncSmtpTransport, AsyncTransport, Message,
    Tokio1Executor,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, UserError};

/// SMTP configuration for the confirmation-code mailer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    /// SMTP server host
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP username (empty = unauthenticated, for development)
    pub smtp_username: String,
    /// SMTP password
    pub smtp_password: String,
    /// From email address
    pub from_email: String,
    /// From name
    pub from_name: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025, // MailHog default port for development
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@marquee.local".to_string(),
            from_name: "Marquee".to_string(),
        }
    }
}

/// Confirmation-code mailer.
#[derive(Clone)]
pub struct Mailer {
    config: MailerConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl Mailer {
    pub fn new(config: MailerConfig) -> Result<Self> {
        let transport = if config.smtp_username.is_empty() {
            // No authentication (for development with MailHog)
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            );
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                .map_err(|e| UserError::Configuration(format!("Invalid SMTP host: {}", e)))?
                .port(config.smtp_port)
                .credentials(creds)
                .build()
        };

        Ok(Self { config, transport })
    }

    /// Send a confirmation code to `to_email`.
    pub async fn send_confirmation_code(&self, to_email: &str, code: &str) -> Result<()> {
        let email = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_email)
                    .parse()
                    .map_err(|e| UserError::Configuration(format!("Invalid from email: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| UserError::Configuration(format!("Invalid to email: {}", e)))?)
            .subject("Activate your Marquee account")
            .body(format!("Confirmation code: {}", code))
            .map_err(|e| UserError::Configuration(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| UserError::Mail(e.to_string()))?;

        debug!("Confirmation code email sent to: {}", to_email);
        Ok(())
    }
}
