use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::order::Unit;
use super::ports::StateStorage;

/// Storage namespace the serialized line items persist under.
pub const CART_NAMESPACE: &str = "cart.v1";

/// Free-text note limit per line.
const NOTES_MAX_CHARS: usize = 200;

/// One product line in the cart. Two lines are the same line iff
/// `(product_id, variety, notes)` all match; the line total is always
/// computed, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variety: Option<String>,
    pub unit: Unit,
    pub price_per_unit: BigDecimal,
    pub qty: BigDecimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartItem {
    pub fn line_total(&self) -> BigDecimal {
        &self.qty * &self.price_per_unit
    }

    pub(crate) fn matches(
        &self,
        product_id: &str,
        variety: Option<&str>,
        notes: Option<&str>,
    ) -> bool {
        self.product_id == product_id
            && self.variety.as_deref() == variety
            && self.notes.as_deref() == notes
    }
}

/// The shopping cart: an owned collection of line items persisted in full
/// after every mutation.
pub struct CartStore<S: StateStorage> {
    items: Vec<CartItem>,
    storage: S,
}

impl<S: StateStorage> CartStore<S> {
    /// Restore the cart from storage, starting empty when nothing (or
    /// nothing readable) was persisted.
    pub fn load(storage: S) -> Self {
        let items = storage
            .load(CART_NAMESPACE)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(items) => Some(items),
                Err(e) => {
                    log::warn!("discarding unreadable persisted cart: {e}");
                    None
                }
            })
            .unwrap_or_default();
        Self { items, storage }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Add a line. Quantities merge when an existing line matches on
    /// `(product_id, variety, notes)`; otherwise the line is appended.
    pub fn add(&mut self, mut item: CartItem) {
        if let Some(notes) = item.notes.take() {
            item.notes = Some(notes.chars().take(NOTES_MAX_CHARS).collect());
        }
        match self.items.iter_mut().find(|line| {
            line.matches(&item.product_id, item.variety.as_deref(), item.notes.as_deref())
        }) {
            Some(line) => line.qty += item.qty,
            None => self.items.push(item),
        }
        self.persist();
    }

    /// Replace the quantity on the matching line. The value is taken as
    /// given; range checks belong to the caller.
    pub fn update_qty(
        &mut self,
        product_id: &str,
        qty: BigDecimal,
        variety: Option<&str>,
        notes: Option<&str>,
    ) {
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.matches(product_id, variety, notes))
        {
            line.qty = qty;
            self.persist();
        }
    }

    /// Delete the matching line; no-op when absent.
    pub fn remove(&mut self, product_id: &str, variety: Option<&str>, notes: Option<&str>) {
        let before = self.items.len();
        self.items
            .retain(|line| !line.matches(product_id, variety, notes));
        if self.items.len() != before {
            self.persist();
        }
    }

    /// Empty the cart, e.g. after a successful order.
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Sum of `qty * price_per_unit` over all lines, recomputed on demand.
    pub fn subtotal(&self) -> BigDecimal {
        self.items
            .iter()
            .fold(BigDecimal::from(0), |acc, line| acc + line.line_total())
    }

    fn persist(&self) {
        let payload = match serde_json::to_string(&self.items) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("cart serialization failed: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.save(CART_NAMESPACE, &payload) {
            log::warn!("cart persistence failed: {e}");
        }
    }
}
