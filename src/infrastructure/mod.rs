pub mod idempotency;
pub mod mailer;
pub mod storage;
