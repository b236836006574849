use crate::config::EmailConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SendEmailRequest<'a> {
    pub from: &'a str,
    pub to: Vec<&'a str>,
    pub subject: &'a str,
    pub text: &'a str,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// Transactional email over a JSON HTTP API with bearer auth.
#[derive(Clone)]
pub struct EmailService {
    client: Client,
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl EmailSender for EmailService {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        if self.config.api_key.is_empty() {
            return Err(AppError::ConfigError("Email API key is not set".to_string()));
        }

        let request = SendEmailRequest {
            from: &self.config.from_address,
            to: vec![to],
            subject,
            text: body,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            log::info!("Email sent to {to}: {subject}");
            Ok(())
        } else {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::ExternalApiError(format!(
                "Email sending failed ({status}): {error_text}"
            )))
        }
    }
}
