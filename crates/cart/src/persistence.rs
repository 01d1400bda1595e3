//! Cart persistence adapter.
//!
//! The cart is stored as one JSON object under one slot key:
//! `{ "<product id>": { ...product snapshot fields, "qty": n }, ... }`.
//! There is no schema version; reading tolerates absent optional fields and
//! ignores unknown ones.
//!
//! Everything here is best-effort. A failed write is logged and forgotten; a
//! missing, unreadable or malformed slot loads as an empty cart; a malformed
//! line is dropped on its own without discarding the rest.

use serde_json::Value;
use storefront_core::ProductId;
use storefront_storage::StateSlot;

use crate::cart::Cart;
use crate::line::CartLine;

/// Slot key the cart is stored under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "cart";

#[derive(Debug)]
pub struct CartPersistence<S> {
    slot: S,
    key: String,
}

impl<S> CartPersistence<S>
where
    S: StateSlot,
{
    pub fn new(slot: S) -> Self {
        Self::with_key(slot, DEFAULT_CART_KEY)
    }

    pub fn with_key(slot: S, key: impl Into<String>) -> Self {
        Self {
            slot,
            key: key.into(),
        }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Write the cart to the slot. Failures are logged, never returned.
    pub fn save(&self, cart: &Cart) {
        let payload = match serde_json::to_string(cart.as_map()) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to serialize cart; not persisted");
                return;
            }
        };

        if let Err(err) = self.slot.write(&self.key, &payload) {
            tracing::warn!(key = %self.key, error = %err, "failed to persist cart");
        }
    }

    /// Read the cart back. Never fails: anything unusable yields an empty cart.
    pub fn load(&self) -> Cart {
        match self.slot.read(&self.key) {
            Ok(Some(raw)) => decode_cart(&self.key, &raw),
            Ok(None) => {
                tracing::debug!(key = %self.key, "no persisted cart; starting empty");
                Cart::new()
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to read persisted cart; starting empty");
                Cart::new()
            }
        }
    }

    /// Delete the persisted cart.
    pub fn forget(&self) {
        if let Err(err) = self.slot.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %err, "failed to delete persisted cart");
        }
    }
}

fn decode_cart(key: &str, raw: &str) -> Cart {
    let root: Value = match serde_json::from_str(raw) {
        Ok(root) => root,
        Err(err) => {
            tracing::warn!(key, error = %err, "persisted cart is not valid JSON; starting empty");
            return Cart::new();
        }
    };

    let Value::Object(entries) = root else {
        tracing::warn!(key, "persisted cart is not a JSON object; starting empty");
        return Cart::new();
    };

    let total = entries.len();
    let lines: Vec<CartLine> = entries
        .into_iter()
        .filter_map(|(entry_key, value)| match decode_line(&entry_key, value) {
            Ok(line) => Some(line),
            Err(reason) => {
                tracing::warn!(key, entry = %entry_key, %reason, "dropping malformed cart line");
                None
            }
        })
        .collect();

    tracing::info!(key, restored = lines.len(), dropped = total - lines.len(), "cart hydrated");
    Cart::from_lines(lines)
}

fn decode_line(entry_key: &str, value: Value) -> Result<CartLine, String> {
    let expected = ProductId::new(entry_key).map_err(|e| e.to_string())?;
    let line: CartLine = serde_json::from_value(value).map_err(|e| e.to_string())?;

    if line.product.id != expected {
        return Err(format!(
            "embedded product id {} does not match its key",
            line.product.id
        ));
    }
    if line.qty == 0 {
        return Err("quantity must be positive".to_string());
    }

    Ok(line)
}
