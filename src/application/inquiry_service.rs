use std::sync::Arc;

use crate::application::order_service::status_of;
use crate::domain::errors::{DomainError, FieldChecks, FieldStatus};
use crate::domain::order::{new_inquiry_id, DistributorInquiry};
use crate::domain::ports::{EmailMessage, Notifier};
use crate::domain::summary;

#[derive(Debug, Clone)]
pub struct ReceivedInquiry {
    pub inquiry_id: String,
}

/// B2B contact flow: two required fields, one identifier, one best-effort
/// notification. No cart, no idempotency, no totals.
pub struct InquiryService {
    notifier: Arc<dyn Notifier>,
    from: String,
    inbox: String,
}

impl InquiryService {
    pub fn new(notifier: Arc<dyn Notifier>, from: String, inbox: String) -> Self {
        Self {
            notifier,
            from,
            inbox,
        }
    }

    pub async fn submit(
        &self,
        inquiry: DistributorInquiry,
    ) -> Result<ReceivedInquiry, DomainError> {
        let mut checks = FieldChecks::new();
        checks.insert("company", status_of(!inquiry.company.trim().is_empty()));
        checks.insert("phone", status_of(!inquiry.phone.trim().is_empty()));
        if checks.values().any(|s| *s == FieldStatus::Required) {
            return Err(DomainError::MissingFields(checks));
        }

        let inquiry_id = new_inquiry_id();
        log::info!("received distributor inquiry {inquiry_id} from {}", inquiry.company);

        let message = EmailMessage {
            from: self.from.clone(),
            to: self.inbox.clone(),
            subject: format!("Ново запитване за дистрибуция {inquiry_id}"),
            body: summary::render_inquiry_text(&inquiry_id, &inquiry),
        };
        if let Err(e) = self.notifier.send(&message).await {
            log::warn!("inquiry {inquiry_id}: notification failed: {e}");
        }

        Ok(ReceivedInquiry { inquiry_id })
    }
}
