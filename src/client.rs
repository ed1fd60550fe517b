//! Storefront side of the order protocol: assembles the wire payload from
//! the cart and the validated form, submits it, and turns the response
//! into either a confirmation (with the forwarding links) or a
//! field-preserving failure.

use bigdecimal::BigDecimal;
use chrono::Utc;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::cart::{CartItem, CartStore};
use crate::domain::checkout::{calculate_totals, CheckoutForm, CheckoutStore, ErrorCode};
use crate::domain::order::{
    new_idempotency_key, Customer, Delivery, DeliveryMethod, DistributorInquiry, OrderItem,
    OrderRequest, Payment, CURRENCY,
};
use crate::domain::ports::StateStorage;
use crate::domain::summary;

/// UI-layer quantity bounds for loose produce.
pub const QTY_MIN: &str = "0.2";
pub const QTY_MAX: &str = "25";
pub const QTY_STEP: &str = "0.5";

#[derive(Debug, Error)]
pub enum SubmitError {
    /// Field errors were recorded on the checkout store; nothing was sent.
    #[error("form validation failed")]
    InvalidForm,

    #[error("cart is empty")]
    EmptyCart,

    /// The server recognized the idempotency key.
    #[error("duplicate submission")]
    Duplicate { order_id: Option<String> },

    #[error("order rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Everything the confirmation screen needs after a successful order.
#[derive(Debug, Clone)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub message: String,
    /// Rebuilt human-readable summary, also the clipboard fallback text.
    pub summary: String,
    pub viber_link: String,
    pub whatsapp_link: String,
}

#[derive(Debug, Clone)]
pub struct InquiryConfirmation {
    pub inquiry_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderAcceptedBody {
    order_id: String,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DuplicateBody {
    order_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InquiryAcceptedBody {
    inquiry_id: String,
    message: String,
}

pub struct CheckoutClient {
    http: reqwest::Client,
    base_url: String,
    locale: String,
}

impl CheckoutClient {
    pub fn new(base_url: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            locale: locale.into(),
        }
    }

    /// Run the full submission protocol. On success the cart is cleared,
    /// the form resets, and the last order is remembered on the checkout
    /// store; on failure both stores keep their state.
    pub async fn place_order<C, F>(
        &self,
        cart: &mut CartStore<C>,
        checkout: &mut CheckoutStore<F>,
    ) -> Result<OrderConfirmation, SubmitError>
    where
        C: StateStorage,
        F: StateStorage,
    {
        if cart.is_empty() {
            return Err(SubmitError::EmptyCart);
        }
        if !checkout.validate_form() {
            return Err(SubmitError::InvalidForm);
        }

        let request = build_order_request(cart.items(), checkout.form(), &self.locale);

        checkout.set_submitting(true);
        let outcome = self.post_order(&request).await;
        checkout.set_submitting(false);

        match outcome {
            Ok(accepted) => {
                let summary = summary::render_order_text(&accepted.order_id, &request);
                cart.clear();
                checkout.remember_order(accepted.order_id.clone(), request);
                checkout.reset_form();
                Ok(OrderConfirmation {
                    viber_link: summary::viber_link(&summary),
                    whatsapp_link: summary::whatsapp_link(summary::FORWARD_PHONE, &summary),
                    order_id: accepted.order_id,
                    message: accepted.message,
                    summary,
                })
            }
            Err(err) => {
                if matches!(
                    err,
                    SubmitError::Rejected { .. } | SubmitError::Transport(_)
                ) {
                    checkout.set_error("submit", ErrorCode::Invalid);
                }
                Err(err)
            }
        }
    }

    async fn post_order(&self, request: &OrderRequest) -> Result<OrderAcceptedBody, SubmitError> {
        let response = self
            .http
            .post(format!("{}/api/orders", self.base_url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CREATED {
            Ok(response.json().await?)
        } else if status == StatusCode::CONFLICT {
            let body: DuplicateBody = response
                .json()
                .await
                .unwrap_or(DuplicateBody { order_id: None });
            Err(SubmitError::Duplicate {
                order_id: body.order_id,
            })
        } else {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| "order submission failed".to_string());
            Err(SubmitError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }

    pub async fn submit_inquiry(
        &self,
        inquiry: &DistributorInquiry,
    ) -> Result<InquiryConfirmation, SubmitError> {
        if inquiry.company.trim().is_empty() || inquiry.phone.trim().is_empty() {
            return Err(SubmitError::InvalidForm);
        }

        let response = self
            .http
            .post(format!("{}/api/distributors", self.base_url))
            .json(inquiry)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CREATED {
            let body: InquiryAcceptedBody = response.json().await?;
            Ok(InquiryConfirmation {
                inquiry_id: body.inquiry_id,
                message: body.message,
            })
        } else {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| "inquiry submission failed".to_string());
            Err(SubmitError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Assemble the wire payload from the cart lines and the validated form.
/// Line totals and order totals are computed here, on the client, and
/// trusted as-is by the server.
pub fn build_order_request(items: &[CartItem], form: &CheckoutForm, locale: &str) -> OrderRequest {
    let order_items: Vec<OrderItem> = items
        .iter()
        .map(|line| OrderItem {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            variety: line.variety.clone(),
            qty: line.qty.clone(),
            unit: line.unit,
            price_per_unit: line.price_per_unit.clone(),
            line_total: line.line_total(),
        })
        .collect();

    let subtotal = order_items
        .iter()
        .fold(BigDecimal::from(0), |acc, item| acc + &item.line_total);
    let totals = calculate_totals(&subtotal, form.promo_code.as_deref(), form.delivery_method);

    let address = (form.delivery_method != DeliveryMethod::Pickup).then(|| form.address.clone());
    let preferred = (form.preferred.date.is_some() || form.preferred.slot.is_some())
        .then(|| form.preferred.clone());

    OrderRequest {
        idempotency_key: Some(new_idempotency_key()),
        locale: locale.to_string(),
        currency: CURRENCY.to_string(),
        customer: Customer {
            name: form.full_name.trim().to_string(),
            phone: crate::domain::checkout::normalize_phone(form.phone.trim()),
            email: form
                .email
                .clone()
                .filter(|email| !email.trim().is_empty()),
        },
        delivery: Delivery {
            method: form.delivery_method,
            address,
            preferred,
            fee: totals.delivery_fee.clone(),
        },
        payment: Payment {
            method: form.payment_method,
        },
        items: order_items,
        subtotal,
        discount: (totals.discount != BigDecimal::from(0)).then(|| totals.discount.clone()),
        total: totals.total,
        notes: (!form.notes.trim().is_empty()).then(|| form.notes.clone()),
        created_at: Utc::now(),
    }
}

/// Quantity stepping bounds. The default covers loose produce; packaged
/// goods carry their own min/step (e.g. whole jars).
#[derive(Debug, Clone)]
pub struct QtyBounds {
    pub min: BigDecimal,
    pub step: BigDecimal,
    pub max: BigDecimal,
}

impl Default for QtyBounds {
    fn default() -> Self {
        Self {
            min: QTY_MIN.parse().expect("valid decimal literal"),
            step: QTY_STEP.parse().expect("valid decimal literal"),
            max: QTY_MAX.parse().expect("valid decimal literal"),
        }
    }
}

/// Step a line's quantity by whole steps of the default bounds, clamping
/// at the maximum and removing the line once it would drop below the
/// minimum.
pub fn step_qty<S: StateStorage>(
    cart: &mut CartStore<S>,
    product_id: &str,
    variety: Option<&str>,
    notes: Option<&str>,
    steps: i64,
) {
    step_qty_within(cart, product_id, variety, notes, steps, &QtyBounds::default());
}

/// [`step_qty`] with explicit bounds for products that do not step like
/// loose produce.
pub fn step_qty_within<S: StateStorage>(
    cart: &mut CartStore<S>,
    product_id: &str,
    variety: Option<&str>,
    notes: Option<&str>,
    steps: i64,
    bounds: &QtyBounds,
) {
    let Some(line) = cart
        .items()
        .iter()
        .find(|line| line.matches(product_id, variety, notes))
    else {
        return;
    };

    let next = &line.qty + &bounds.step * BigDecimal::from(steps);
    if next < bounds.min {
        cart.remove(product_id, variety, notes);
    } else if next > bounds.max {
        cart.update_qty(product_id, bounds.max.clone(), variety, notes);
    } else {
        cart.update_qty(product_id, next, variety, notes);
    }
}
