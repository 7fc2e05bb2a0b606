//! SMTP transport.
//!
//! Only the connection probe is exposed: open a session with the given
//! server and credentials, then close it without sending anything.

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    transport::smtp::{authentication::Credentials, AsyncSmtpTransportBuilder},
    AsyncSmtpTransport, Tokio1Executor,
};
use thiserror::Error;

use crate::config::{SMTP_IMPLICIT_TLS_PORT, SMTP_STARTTLS_PORT, SMTP_TIMEOUT_SECONDS};
use crate::domain::SmtpSettings;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error(transparent)]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("server did not accept the connection")]
    Rejected,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SmtpProbe: Send + Sync {
    /// Connect, authenticate when credentials are present, and disconnect.
    async fn verify(&self, settings: &SmtpSettings) -> Result<(), MailerError>;
}

/// `lettre`-backed SMTP client
#[derive(Debug, Default, Clone, Copy)]
pub struct LettreMailer;

impl LettreMailer {
    /// Implicit TLS on 465, mandatory STARTTLS on 587, plaintext elsewhere.
    fn transport_builder(settings: &SmtpSettings) -> Result<AsyncSmtpTransportBuilder, MailerError> {
        let builder = match settings.port {
            SMTP_IMPLICIT_TLS_PORT => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?,
            SMTP_STARTTLS_PORT => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            }
            _ => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host),
        };

        let mut builder = builder
            .port(settings.port)
            .timeout(Some(Duration::from_secs(SMTP_TIMEOUT_SECONDS)));

        if !settings.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ));
        }

        Ok(builder)
    }

    fn transport(settings: &SmtpSettings) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailerError> {
        Ok(Self::transport_builder(settings)?.build::<Tokio1Executor>())
    }
}

#[async_trait]
impl SmtpProbe for LettreMailer {
    async fn verify(&self, settings: &SmtpSettings) -> Result<(), MailerError> {
        let transport = Self::transport(settings)?;

        tracing::debug!(host = %settings.host, port = settings.port, "Probing SMTP server");
        if transport.test_connection().await? {
            Ok(())
        } else {
            Err(MailerError::Rejected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(host: &str, port: u16) -> SmtpSettings {
        SmtpSettings {
            enabled: true,
            host: host.into(),
            port,
            username: "mailer".into(),
            password: "pw".into(),
            sender_email: None,
            sender_name: None,
        }
    }

    #[tokio::test]
    async fn test_transport_builds_for_every_port_mode() {
        for port in [SMTP_IMPLICIT_TLS_PORT, SMTP_STARTTLS_PORT, 2525] {
            assert!(LettreMailer::transport(&settings("smtp.example.com", port)).is_ok());
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let err = LettreMailer
            .verify(&settings("127.0.0.1", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, MailerError::Transport(_)));
    }
}
