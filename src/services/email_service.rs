//! Outgoing mail checks.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::SmtpSettings;
use crate::errors::{AppError, AppResult};
use crate::infra::SmtpProbe;

#[async_trait]
pub trait EmailService: Send + Sync {
    /// Open and close an SMTP session with the given settings.
    ///
    /// # Errors
    /// `BadRequest` carrying the transport's message when the server cannot
    /// be reached or rejects the credentials.
    async fn test_smtp(&self, settings: SmtpSettings) -> AppResult<()>;
}

pub struct EmailManager {
    probe: Arc<dyn SmtpProbe>,
}

impl EmailManager {
    pub fn new(probe: Arc<dyn SmtpProbe>) -> Self {
        Self { probe }
    }
}

#[async_trait]
impl EmailService for EmailManager {
    async fn test_smtp(&self, settings: SmtpSettings) -> AppResult<()> {
        match self.probe.verify(&settings).await {
            Ok(()) => {
                tracing::info!(host = %settings.host, port = settings.port, "SMTP connection verified");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(host = %settings.host, port = settings.port, error = %e, "SMTP connection failed");
                Err(AppError::bad_request(format!("SMTP connection failed: {}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{MailerError, MockSmtpProbe};

    fn settings() -> SmtpSettings {
        SmtpSettings {
            enabled: true,
            host: "smtp.example.com".into(),
            port: 587,
            username: "mailer".into(),
            password: "pw".into(),
            sender_email: None,
            sender_name: None,
        }
    }

    #[tokio::test]
    async fn test_successful_probe() {
        let mut probe = MockSmtpProbe::new();
        probe
            .expect_verify()
            .withf(|s| s.host == "smtp.example.com" && s.port == 587)
            .returning(|_| Ok(()));

        assert!(EmailManager::new(Arc::new(probe)).test_smtp(settings()).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_probe_is_bad_request_with_reason() {
        let mut probe = MockSmtpProbe::new();
        probe.expect_verify().returning(|_| Err(MailerError::Rejected));

        let err = EmailManager::new(Arc::new(probe))
            .test_smtp(settings())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(
            err.to_string(),
            "SMTP connection failed: server did not accept the connection"
        );
    }
}
