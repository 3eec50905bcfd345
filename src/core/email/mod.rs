//! Outbound email
//!
//! The auth flows only need two messages: a verification link and a password
//! reset code. Delivery sits behind the [`Mailer`] trait so the service layer
//! never knows whether mail goes out over SMTP, an HTTP API, or (in local
//! dev and tests) a log line. The default [`LogMailer`] logs the message and
//! returns `Ok`, which keeps the flows exercisable without mail credentials.

use std::sync::Arc;

/// SMTP/transport configuration, read from the environment
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
}

/// Email errors
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid SMTP port: {0}")]
    InvalidPort(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

impl MailConfig {
    /// Load the transport configuration from environment variables.
    ///
    /// Requires `SMTP_SERVER`, `SENDER_EMAIL`, and `SENDER_PASSWORD`;
    /// `SMTP_PORT` defaults to 587.
    pub fn from_env() -> Result<Self, EmailError> {
        let smtp_server = std::env::var("SMTP_SERVER")
            .map_err(|_| EmailError::MissingEnvVar("SMTP_SERVER".to_string()))?;
        let sender_email = std::env::var("SENDER_EMAIL")
            .map_err(|_| EmailError::MissingEnvVar("SENDER_EMAIL".to_string()))?;
        let sender_password = std::env::var("SENDER_PASSWORD")
            .map_err(|_| EmailError::MissingEnvVar("SENDER_PASSWORD".to_string()))?;

        // SMTP_PORT preferred; PORT kept for compatibility with older deployments
        let smtp_port = match std::env::var("SMTP_PORT").or_else(|_| std::env::var("PORT")) {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| EmailError::InvalidPort(raw))?,
            Err(_) => 587,
        };

        Ok(Self {
            smtp_server,
            smtp_port,
            sender_email,
            sender_password,
        })
    }
}

/// A rendered message ready for delivery
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    /// Email-verification message carrying the activation link
    pub fn verification(to: &str, verification_link: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Verify your CosmoVerse account".to_string(),
            body: format!(
                "Welcome to CosmoVerse!\n\n\
                 Please verify your email address by opening the link below. \
                 The link is valid for 24 hours.\n\n\
                 {verification_link}\n\n\
                 If you did not create an account, you can ignore this message.\n"
            ),
        }
    }

    /// Password-reset message carrying the 6-character code
    pub fn password_reset(to: &str, code: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Your CosmoVerse password reset code".to_string(),
            body: format!(
                "Use the code below to reset your password. \
                 It expires in 10 minutes.\n\n\
                 {code}\n\n\
                 If you did not request a reset, you can ignore this message.\n"
            ),
        }
    }
}

/// Email delivery abstraction used by the auth service
pub trait Mailer: Send + Sync {
    /// Deliver a message or return an error so the caller can surface it
    fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Shared handle to a mailer
pub type SharedMailer = Arc<dyn Mailer>;

/// Local dev mailer that logs the message instead of delivering it
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "email send stub"
        );
        Ok(())
    }
}
