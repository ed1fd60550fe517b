use std::time::{SystemTime, UNIX_EPOCH};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Currency all prices are quoted in.
pub const CURRENCY: &str = "BGN";

/// Pseudo order id length derived from a duplicate idempotency key.
const PSEUDO_ID_LEN: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryMethod {
    /// Courier delivery, paid on receipt.
    CourierCod,
    OwnTransport,
    Pickup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    CashOnDelivery,
    Card,
}

/// Sale unit of a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Bunch,
    Piece,
    Jar,
    Litre,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

/// Preferred delivery date and time slot, both free-form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Preferred {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub method: DeliveryMethod,
    /// Absent when the method is pickup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred: Option<Preferred>,
    #[schema(value_type = String)]
    pub fee: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variety: Option<String>,
    #[schema(value_type = String)]
    pub qty: BigDecimal,
    pub unit: Unit,
    #[schema(value_type = String)]
    pub price_per_unit: BigDecimal,
    /// Computed client-side, trusted as-is by the server.
    #[schema(value_type = String)]
    pub line_total: BigDecimal,
}

/// The wire payload of a checkout attempt, shared verbatim between the
/// submission client and the order endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    pub locale: String,
    pub currency: String,
    pub customer: Customer,
    pub delivery: Delivery,
    pub payment: Payment,
    pub items: Vec<OrderItem>,
    #[schema(value_type = String)]
    pub subtotal: BigDecimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub discount: Option<BigDecimal>,
    #[schema(value_type = String)]
    pub total: BigDecimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// B2B contact request. No cart, no idempotency, no totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributorInquiry {
    pub company: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Fresh client-side idempotency key, one per submission attempt.
pub fn new_idempotency_key() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("order_{}_{}", unix_millis(), suffix)
}

pub fn new_order_id() -> String {
    format!(
        "OR-2025-{}{}",
        unix_seconds(),
        rand::thread_rng().gen_range(100..1000)
    )
}

pub fn new_inquiry_id() -> String {
    format!(
        "DIST-2025-{}{}",
        unix_seconds(),
        rand::thread_rng().gen_range(100..1000)
    )
}

/// Identifier reported on a duplicate submission, derived from the key the
/// client already holds rather than a newly generated one.
pub fn pseudo_order_id(idempotency_key: &str) -> String {
    idempotency_key.chars().take(PSEUDO_ID_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_has_expected_shape() {
        let id = new_order_id();
        let digits = id.strip_prefix("OR-2025-").expect("prefix");
        assert!(digits.len() >= 13, "timestamp plus 3-digit suffix: {id}");
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn inquiry_id_has_expected_shape() {
        let id = new_inquiry_id();
        let digits = id.strip_prefix("DIST-2025-").expect("prefix");
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn idempotency_keys_differ_between_attempts() {
        assert_ne!(new_idempotency_key(), new_idempotency_key());
    }

    #[test]
    fn pseudo_id_truncates_long_keys() {
        let key = "order_1755000000000_ab12cd_overflow";
        assert_eq!(pseudo_order_id(key).len(), 24);
        assert!(key.starts_with(&pseudo_order_id(key)));
    }

    #[test]
    fn delivery_method_wire_names() {
        let json = serde_json::to_string(&DeliveryMethod::CourierCod).expect("serialize");
        assert_eq!(json, "\"courier-cod\"");
        let json = serde_json::to_string(&DeliveryMethod::OwnTransport).expect("serialize");
        assert_eq!(json, "\"own-transport\"");
    }
}
