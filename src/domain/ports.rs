use async_trait::async_trait;
use thiserror::Error;

/// Dedupe store for idempotency keys.
///
/// `contains` and `record` are split on purpose: a key is only recorded once
/// the order passed validation, so a rejected submission can be retried with
/// the same key.
pub trait IdempotencyStore: Send + Sync + 'static {
    fn contains(&self, key: &str) -> bool;
    fn record(&self, key: &str);
}

/// A single transactional email to hand to the mail provider.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mail provider rejected the message: {0}")]
    Provider(String),

    #[error("mail transport error: {0}")]
    Transport(String),
}

/// Best-effort notification channel. Callers log failures and move on; a
/// failed send must never fail the operation that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable key-value storage for client-side state, one JSON document per
/// namespace. The cart and the checkout form persist under independent
/// namespaces.
pub trait StateStorage {
    fn load(&self, namespace: &str) -> Option<String>;
    fn save(&self, namespace: &str, payload: &str) -> Result<(), StorageError>;
}
