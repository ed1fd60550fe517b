use async_trait::async_trait;
use serde_json::json;

use crate::domain::ports::{EmailMessage, Notifier, NotifyError};

/// Notifier backed by a transactional-mail HTTP API. The provider accepts
/// a JSON document with sender, recipient, subject and plaintext body and
/// authenticates with a bearer token.
pub struct HttpMailer {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HttpMailer {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": message.from,
                "to": message.to,
                "subject": message.subject,
                "text": message.body,
            }))
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(NotifyError::Provider(format!("{status}: {body}")))
        }
    }
}

/// Notifier for environments without mail credentials: logs the message
/// instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Notifier for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        log::info!(
            "mail (not sent, no provider configured) to={} subject={:?}\n{}",
            message.to,
            message.subject,
            message.body
        );
        Ok(())
    }
}
