use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Per-field presence verdict reported back on a rejected submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    Ok,
    Required,
}

/// Presence map for the fields the server checks before accepting a request.
pub type FieldChecks = BTreeMap<&'static str, FieldStatus>;

#[derive(Debug, Error)]
pub enum DomainError {
    /// The idempotency key was already seen in this process lifetime.
    #[error("duplicate submission")]
    Duplicate { order_id: String },

    #[error("missing required fields")]
    MissingFields(FieldChecks),

    #[error("internal error: {0}")]
    Internal(String),
}
