use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::order::{Address, DeliveryMethod, OrderRequest, PaymentMethod, Preferred};
use super::ports::StateStorage;

/// Storage namespace the form fields persist under. Errors and the
/// submission flag are never persisted.
pub const CHECKOUT_NAMESPACE: &str = "checkout.v1";

/// The only promo code in existence: 5% off the subtotal.
pub const PROMO_WELCOME: &str = "WELCOME5";

/// Flat delivery fee for any non-pickup method. The totals engine is the
/// single source of truth for fees; per-method pricing shown elsewhere in
/// the old storefront was inconsistent with it and was dropped.
pub const STANDARD_DELIVERY_FEE: &str = "4.90";

const NOTES_MAX_CHARS: usize = 500;

/// Symbolic, field-scoped validation codes, resolved to localized copy by
/// the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    Required,
    Invalid,
    MinWords,
}

/// The in-progress order draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    pub full_name: String,
    /// Raw input; normalized only when validated or submitted.
    pub phone: String,
    pub email: Option<String>,
    pub delivery_method: DeliveryMethod,
    pub address: Address,
    pub preferred: Preferred,
    pub payment_method: PaymentMethod,
    pub notes: String,
    pub consent: bool,
    pub promo_code: Option<String>,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            phone: String::new(),
            email: None,
            delivery_method: DeliveryMethod::CourierCod,
            address: Address::default(),
            preferred: Preferred::default(),
            payment_method: PaymentMethod::CashOnDelivery,
            notes: String::new(),
            consent: false,
            promo_code: None,
        }
    }
}

/// Shallow-merge patch for the top-level form fields.
#[derive(Debug, Default, Clone)]
pub struct FormPatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub delivery_method: Option<DeliveryMethod>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub consent: Option<bool>,
    pub promo_code: Option<Option<String>>,
}

#[derive(Debug, Default, Clone)]
pub struct AddressPatch {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub extra: Option<Option<String>>,
}

/// Result of the totals engine for a given subtotal.
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub discount: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
}

/// Snapshot of the last accepted order, kept in memory so the confirmation
/// summary can be rebuilt after the form resets.
#[derive(Debug, Clone)]
pub struct LastOrder {
    pub order_id: String,
    pub request: OrderRequest,
}

/// Holds the draft form, its field errors, the submission flag, and the
/// last successful order. Form fields persist across sessions; everything
/// else is per-session state.
pub struct CheckoutStore<S: StateStorage> {
    form: CheckoutForm,
    errors: BTreeMap<String, ErrorCode>,
    is_submitting: bool,
    last_order: Option<LastOrder>,
    storage: S,
}

impl<S: StateStorage> CheckoutStore<S> {
    pub fn load(storage: S) -> Self {
        let form = storage
            .load(CHECKOUT_NAMESPACE)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(form) => Some(form),
                Err(e) => {
                    log::warn!("discarding unreadable persisted checkout form: {e}");
                    None
                }
            })
            .unwrap_or_default();
        Self {
            form,
            errors: BTreeMap::new(),
            is_submitting: false,
            last_order: None,
            storage,
        }
    }

    pub fn form(&self) -> &CheckoutForm {
        &self.form
    }

    pub fn errors(&self) -> &BTreeMap<String, ErrorCode> {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.is_submitting = submitting;
    }

    pub fn last_order(&self) -> Option<&LastOrder> {
        self.last_order.as_ref()
    }

    pub fn remember_order(&mut self, order_id: String, request: OrderRequest) {
        self.last_order = Some(LastOrder { order_id, request });
    }

    /// Merge the patch into the form. No eager validation.
    pub fn update_form(&mut self, patch: FormPatch) {
        if let Some(full_name) = patch.full_name {
            self.form.full_name = full_name;
        }
        if let Some(phone) = patch.phone {
            self.form.phone = phone;
        }
        if let Some(email) = patch.email {
            self.form.email = email;
        }
        if let Some(method) = patch.delivery_method {
            self.form.delivery_method = method;
        }
        if let Some(method) = patch.payment_method {
            self.form.payment_method = method;
        }
        if let Some(notes) = patch.notes {
            self.form.notes = notes.chars().take(NOTES_MAX_CHARS).collect();
        }
        if let Some(consent) = patch.consent {
            self.form.consent = consent;
        }
        if let Some(promo_code) = patch.promo_code {
            self.form.promo_code = promo_code;
        }
        self.persist();
    }

    pub fn update_address(&mut self, patch: AddressPatch) {
        if let Some(street) = patch.street {
            self.form.address.street = street;
        }
        if let Some(city) = patch.city {
            self.form.address.city = city;
        }
        if let Some(postcode) = patch.postcode {
            self.form.address.postcode = postcode;
        }
        if let Some(extra) = patch.extra {
            self.form.address.extra = extra;
        }
        self.persist();
    }

    pub fn update_preferred(&mut self, preferred: Preferred) {
        self.form.preferred = preferred;
        self.persist();
    }

    pub fn set_error(&mut self, field: &str, code: ErrorCode) {
        self.errors.insert(field.to_string(), code);
    }

    pub fn clear_error(&mut self, field: &str) {
        self.errors.remove(field);
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Full synchronous validation pass. Clears prior errors, records a
    /// symbolic code per failing field, returns true only when no field
    /// failed. Never touches the network.
    pub fn validate_form(&mut self) -> bool {
        self.errors.clear();

        let name = self.form.full_name.trim();
        if name.is_empty() {
            self.set_error("fullName", ErrorCode::Required);
        } else if name.split_whitespace().count() < 2 {
            self.set_error("fullName", ErrorCode::MinWords);
        }

        let phone = self.form.phone.trim();
        if phone.is_empty() {
            self.set_error("phone", ErrorCode::Required);
        } else if !is_valid_bg_phone(&normalize_phone(phone)) {
            self.set_error("phone", ErrorCode::Invalid);
        }

        if let Some(email) = self.form.email.as_deref() {
            if !email.trim().is_empty() && !is_valid_email(email.trim()) {
                self.set_error("email", ErrorCode::Invalid);
            }
        }

        if self.form.delivery_method != DeliveryMethod::Pickup {
            if self.form.address.street.trim().is_empty() {
                self.set_error("street", ErrorCode::Required);
            }
            if self.form.address.city.trim().is_empty() {
                self.set_error("city", ErrorCode::Required);
            }
            let postcode = self.form.address.postcode.trim();
            if postcode.is_empty() {
                self.set_error("postcode", ErrorCode::Required);
            } else if !is_valid_postcode(postcode) {
                self.set_error("postcode", ErrorCode::Invalid);
            }
        }

        if !self.form.consent {
            self.set_error("consent", ErrorCode::Required);
        }

        self.errors.is_empty()
    }

    /// Totals for the current form state.
    pub fn totals(&self, subtotal: &BigDecimal) -> Totals {
        calculate_totals(
            subtotal,
            self.form.promo_code.as_deref(),
            self.form.delivery_method,
        )
    }

    /// Restore defaults and clear errors, keeping the last-order snapshot.
    pub fn reset_form(&mut self) {
        self.form = CheckoutForm::default();
        self.errors.clear();
        self.persist();
    }

    fn persist(&self) {
        let payload = match serde_json::to_string(&self.form) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("checkout form serialization failed: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.save(CHECKOUT_NAMESPACE, &payload) {
            log::warn!("checkout form persistence failed: {e}");
        }
    }
}

/// Normalize a Bulgarian phone number towards `+359` international form.
///
/// Strips everything but digits and `+`, then maps a leading national `0`
/// or a bare `359` prefix onto `+359`. Input matching none of the known
/// patterns is returned untouched; callers must treat a result without the
/// `+359` prefix as invalid.
pub fn normalize_phone(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if stripped.starts_with("+359") {
        stripped
    } else if stripped.starts_with("359") {
        format!("+{stripped}")
    } else if let Some(rest) = stripped.strip_prefix('0') {
        format!("+359{rest}")
    } else {
        raw.to_string()
    }
}

fn is_valid_bg_phone(normalized: &str) -> bool {
    match normalized.strip_prefix("+359") {
        Some(rest) => rest.len() == 9 && rest.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Basic `local@domain.tld` shape check, nothing more.
fn is_valid_email(s: &str) -> bool {
    if s.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

fn is_valid_postcode(s: &str) -> bool {
    s.len() == 4 && s.chars().all(|c| c.is_ascii_digit())
}

/// Discount and delivery-fee rules applied to a subtotal: 5% off with the
/// welcome promo, a flat fee unless the order is picked up. The caller
/// keeps `discount <= subtotal`; the total is not clamped here.
pub fn calculate_totals(
    subtotal: &BigDecimal,
    promo_code: Option<&str>,
    method: DeliveryMethod,
) -> Totals {
    let discount = if promo_code == Some(PROMO_WELCOME) {
        (subtotal * dec("0.05")).with_scale_round(2, bigdecimal::RoundingMode::HalfUp)
    } else {
        BigDecimal::from(0)
    };

    let delivery_fee = match method {
        DeliveryMethod::Pickup => BigDecimal::from(0),
        DeliveryMethod::CourierCod | DeliveryMethod::OwnTransport => dec(STANDARD_DELIVERY_FEE),
    };

    let total = subtotal - &discount + &delivery_fee;
    Totals {
        discount,
        delivery_fee,
        total,
    }
}

fn dec(s: &str) -> BigDecimal {
    s.parse().expect("valid decimal literal")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStorage;

    fn store() -> CheckoutStore<MemoryStorage> {
        CheckoutStore::load(MemoryStorage::default())
    }

    fn valid_pickup_form(store: &mut CheckoutStore<MemoryStorage>) {
        store.update_form(FormPatch {
            full_name: Some("Иван Петров".into()),
            phone: Some("0888123456".into()),
            delivery_method: Some(DeliveryMethod::Pickup),
            consent: Some(true),
            ..FormPatch::default()
        });
    }

    #[test]
    fn normalize_phone_known_patterns() {
        assert_eq!(normalize_phone("0888123456"), "+359888123456");
        assert_eq!(normalize_phone("359888123456"), "+359888123456");
        assert_eq!(normalize_phone("+359888123456"), "+359888123456");
        assert_eq!(normalize_phone("0888 123 456"), "+359888123456");
        assert_eq!(normalize_phone("abc"), "abc");
        assert_eq!(normalize_phone("+44123456789"), "+44123456789");
    }

    #[test]
    fn empty_name_is_required() {
        let mut store = store();
        valid_pickup_form(&mut store);
        store.update_form(FormPatch {
            full_name: Some(String::new()),
            ..FormPatch::default()
        });

        assert!(!store.validate_form());
        assert_eq!(store.errors().get("fullName"), Some(&ErrorCode::Required));
    }

    #[test]
    fn single_token_name_needs_more_words() {
        let mut store = store();
        valid_pickup_form(&mut store);
        store.update_form(FormPatch {
            full_name: Some("Иван".into()),
            ..FormPatch::default()
        });

        assert!(!store.validate_form());
        assert_eq!(store.errors().get("fullName"), Some(&ErrorCode::MinWords));
    }

    #[test]
    fn pickup_form_with_valid_fields_passes() {
        let mut store = store();
        valid_pickup_form(&mut store);

        assert!(store.validate_form());
        assert!(store.errors().is_empty());
    }

    #[test]
    fn courier_delivery_requires_address() {
        let mut store = store();
        valid_pickup_form(&mut store);
        store.update_form(FormPatch {
            delivery_method: Some(DeliveryMethod::CourierCod),
            ..FormPatch::default()
        });

        assert!(!store.validate_form());
        assert_eq!(store.errors().get("street"), Some(&ErrorCode::Required));
        assert_eq!(store.errors().get("city"), Some(&ErrorCode::Required));
        assert_eq!(store.errors().get("postcode"), Some(&ErrorCode::Required));

        store.update_address(AddressPatch {
            street: Some("ул. Шипка 3".into()),
            city: Some("София".into()),
            postcode: Some("1000".into()),
            ..AddressPatch::default()
        });
        assert!(store.validate_form());
    }

    #[test]
    fn postcode_must_be_four_digits() {
        let mut store = store();
        valid_pickup_form(&mut store);
        store.update_form(FormPatch {
            delivery_method: Some(DeliveryMethod::OwnTransport),
            ..FormPatch::default()
        });
        store.update_address(AddressPatch {
            street: Some("ул. Шипка 3".into()),
            city: Some("София".into()),
            postcode: Some("10A0".into()),
            ..AddressPatch::default()
        });

        assert!(!store.validate_form());
        assert_eq!(store.errors().get("postcode"), Some(&ErrorCode::Invalid));
    }

    #[test]
    fn invalid_phone_and_email_are_flagged() {
        let mut store = store();
        valid_pickup_form(&mut store);
        store.update_form(FormPatch {
            phone: Some("12345".into()),
            email: Some(Some("not-an-email".into())),
            ..FormPatch::default()
        });

        assert!(!store.validate_form());
        assert_eq!(store.errors().get("phone"), Some(&ErrorCode::Invalid));
        assert_eq!(store.errors().get("email"), Some(&ErrorCode::Invalid));
    }

    #[test]
    fn missing_consent_blocks_submission() {
        let mut store = store();
        valid_pickup_form(&mut store);
        store.update_form(FormPatch {
            consent: Some(false),
            ..FormPatch::default()
        });

        assert!(!store.validate_form());
        assert_eq!(store.errors().get("consent"), Some(&ErrorCode::Required));
    }

    #[test]
    fn welcome_promo_discounts_five_percent() {
        let totals = calculate_totals(
            &BigDecimal::from(100),
            Some(PROMO_WELCOME),
            DeliveryMethod::CourierCod,
        );

        assert_eq!(totals.discount, dec("5.00"));
        assert_eq!(totals.delivery_fee, dec("4.90"));
        assert_eq!(totals.total, dec("99.90"));
    }

    #[test]
    fn unknown_promo_gives_no_discount() {
        let totals = calculate_totals(
            &BigDecimal::from(100),
            Some("WELCOME50"),
            DeliveryMethod::OwnTransport,
        );

        assert_eq!(totals.discount, BigDecimal::from(0));
        assert_eq!(totals.total, dec("104.90"));
    }

    #[test]
    fn pickup_waives_the_delivery_fee() {
        let totals = calculate_totals(&dec("5.60"), None, DeliveryMethod::Pickup);

        assert_eq!(totals.delivery_fee, BigDecimal::from(0));
        assert_eq!(totals.total, dec("5.60"));
    }

    #[test]
    fn reset_restores_defaults_and_clears_errors() {
        let mut store = store();
        store.update_form(FormPatch {
            full_name: Some("Иван".into()),
            ..FormPatch::default()
        });
        store.validate_form();
        assert!(!store.errors().is_empty());

        store.reset_form();
        assert_eq!(store.form(), &CheckoutForm::default());
        assert!(store.errors().is_empty());
    }

    #[test]
    fn form_fields_persist_but_errors_do_not() {
        let storage = MemoryStorage::default();
        {
            let mut store = CheckoutStore::load(storage.clone());
            store.update_form(FormPatch {
                full_name: Some("Иван".into()),
                ..FormPatch::default()
            });
            store.validate_form();
            store.set_submitting(true);
        }

        let store = CheckoutStore::load(storage);
        assert_eq!(store.form().full_name, "Иван");
        assert!(store.errors().is_empty());
        assert!(!store.is_submitting());
    }
}
