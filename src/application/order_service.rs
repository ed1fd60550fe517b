use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::domain::errors::{DomainError, FieldChecks, FieldStatus};
use crate::domain::order::{new_order_id, pseudo_order_id, OrderRequest};
use crate::domain::ports::{EmailMessage, IdempotencyStore, Notifier};
use crate::domain::summary;

/// Where order notifications go: one message to the operator inbox and one
/// to the secondary inbox, both rendered from the same summary.
#[derive(Debug, Clone)]
pub struct MailRouting {
    pub from: String,
    pub inbox: String,
    pub secondary_inbox: Option<String>,
}

/// Bounds of the simulated processing pause. The default emulates backend
/// work with a uniform 800–1200 ms suspension; tests run with `none()`.
#[derive(Debug, Clone, Copy)]
pub struct ProcessingDelay {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for ProcessingDelay {
    fn default() -> Self {
        Self {
            min_ms: 800,
            max_ms: 1200,
        }
    }
}

impl ProcessingDelay {
    pub const fn none() -> Self {
        Self {
            min_ms: 0,
            max_ms: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: String,
}

/// The order endpoint's business logic: dedupe, validate, assign an
/// identifier, notify the operators.
pub struct OrderService {
    idempotency: Arc<dyn IdempotencyStore>,
    notifier: Arc<dyn Notifier>,
    routing: MailRouting,
    delay: ProcessingDelay,
}

impl OrderService {
    pub fn new(
        idempotency: Arc<dyn IdempotencyStore>,
        notifier: Arc<dyn Notifier>,
        routing: MailRouting,
        delay: ProcessingDelay,
    ) -> Self {
        Self {
            idempotency,
            notifier,
            routing,
            delay,
        }
    }

    pub async fn place_order(&self, order: OrderRequest) -> Result<PlacedOrder, DomainError> {
        if let Some(key) = idempotency_key_of(&order) {
            if self.idempotency.contains(key) {
                return Err(DomainError::Duplicate {
                    order_id: pseudo_order_id(key),
                });
            }
        }

        self.simulate_processing().await;

        let mut checks = FieldChecks::new();
        checks.insert("name", status_of(!order.customer.name.trim().is_empty()));
        checks.insert("phone", status_of(!order.customer.phone.trim().is_empty()));
        checks.insert("items", status_of(!order.items.is_empty()));
        if checks.values().any(|s| *s == FieldStatus::Required) {
            return Err(DomainError::MissingFields(checks));
        }

        let order_id = new_order_id();

        // Recorded only after validation, so a rejected submission may be
        // retried with the same key.
        if let Some(key) = idempotency_key_of(&order) {
            self.idempotency.record(key);
        }

        log::info!(
            "accepted order {order_id}: {} item(s), total {} {}",
            order.items.len(),
            order.total,
            order.currency
        );

        self.notify(&order_id, &order).await;

        Ok(PlacedOrder { order_id })
    }

    async fn simulate_processing(&self) {
        if self.delay.max_ms == 0 {
            return;
        }
        let ms = if self.delay.min_ms >= self.delay.max_ms {
            self.delay.min_ms
        } else {
            rand::thread_rng().gen_range(self.delay.min_ms..=self.delay.max_ms)
        };
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Dispatch both notification legs concurrently with all-settled
    /// semantics: neither send cancels the other, and neither outcome
    /// affects the order.
    async fn notify(&self, order_id: &str, order: &OrderRequest) {
        let body = summary::render_order_text(order_id, order);
        let subject = format!("Нова поръчка {order_id}");

        let primary = EmailMessage {
            from: self.routing.from.clone(),
            to: self.routing.inbox.clone(),
            subject: subject.clone(),
            body: body.clone(),
        };
        let secondary = self.routing.secondary_inbox.clone().map(|to| EmailMessage {
            from: self.routing.from.clone(),
            to,
            subject,
            body,
        });

        let secondary_send = async {
            match &secondary {
                Some(message) => Some(self.notifier.send(message).await),
                None => None,
            }
        };
        let (first, second) = futures::future::join(self.notifier.send(&primary), secondary_send).await;

        if let Err(e) = first {
            log::warn!("order {order_id}: primary notification failed: {e}");
        }
        if let Some(Err(e)) = second {
            log::warn!("order {order_id}: secondary notification failed: {e}");
        }
    }
}

fn idempotency_key_of(order: &OrderRequest) -> Option<&str> {
    order
        .idempotency_key
        .as_deref()
        .filter(|key| !key.is_empty())
}

pub(crate) fn status_of(present: bool) -> FieldStatus {
    if present {
        FieldStatus::Ok
    } else {
        FieldStatus::Required
    }
}
