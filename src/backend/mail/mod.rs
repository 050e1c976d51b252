//! Mail Module
//!
//! Outgoing email behind the `Mailer` trait:
//!
//! - **`SmtpMailer`** - `lettre` SMTP transport (STARTTLS relay)
//! - **`LogMailer`** - writes the message to the log; used when SMTP is not
//!   configured
//!
//! The only mail the service sends today is the password reset link.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::backend::server::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("could not build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// A plain-text message
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(e.to_string()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let to = mail
            .to
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(e.to_string()))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body)
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport.send(message).await.map_err(|e| {
            tracing::error!("SMTP send to {} failed: {:?}", mail.to, e);
            MailError::Transport(e.to_string())
        })?;
        tracing::info!("Sent email to {}", mail.to);
        Ok(())
    }
}

/// Logs instead of sending
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            "SMTP not configured, email not sent:\n{}",
            mail.body
        );
        Ok(())
    }
}

/// Password reset message with a link back to the frontend
pub fn password_reset_mail(to: &str, app_base_url: &str, token: &str) -> OutgoingMail {
    let link = format!("{}/reset-password?token={}", app_base_url, token);
    OutgoingMail {
        to: to.to_string(),
        subject: "Redefinição de senha".to_string(),
        body: format!(
            "Recebemos um pedido para redefinir sua senha.\n\n\
             Abra o link abaixo em até 1 hora:\n{}\n\n\
             Se você não pediu a redefinição, ignore este email.",
            link
        ),
    }
}
