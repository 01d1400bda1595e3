//! Cart store: the single owner of cart state.
//!
//! Every mutation goes handle → apply → persist → notify. Commands that turn
//! out to be no-ops (removing an absent line, clearing an empty cart, ...)
//! emit no events, so they neither persist, bump the version nor notify.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use storefront_catalog::Product;
use storefront_core::{Aggregate, OrderId, ProductId};
use storefront_events::{EventBus, InMemoryEventBus, Subscription};
use storefront_storage::StateSlot;

use crate::cart::{AddToCart, Cart, CartCommand, CartEvent, ClearCart, RemoveItem, UpdateQuantity};
use crate::line::CartLine;
use crate::persistence::CartPersistence;

/// Notification published after each effective cart mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct CartChanged {
    /// Cart version after the change.
    pub version: u64,
    pub events: Vec<CartEvent>,
}

/// Result of a (mock) checkout. No payment is taken.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub placed_at: DateTime<Utc>,
    pub lines: Vec<CartLine>,
    pub total_items: u64,
    pub total_price: f64,
}

#[derive(Debug)]
pub struct CartStore<S> {
    cart: Cart,
    persistence: CartPersistence<S>,
    bus: Arc<InMemoryEventBus<CartChanged>>,
}

impl<S> CartStore<S>
where
    S: StateSlot,
{
    /// Build the store from whatever the slot holds (empty if nothing usable).
    pub fn hydrate(persistence: CartPersistence<S>) -> Self {
        let cart = persistence.load();
        Self {
            cart,
            persistence,
            bus: Arc::new(InMemoryEventBus::new()),
        }
    }

    /// Add `qty` of `product`. Increments an existing line (keeping its
    /// original snapshot); `qty <= 0` does nothing.
    pub fn add_to_cart(&mut self, product: &Product, qty: i64) {
        self.execute(CartCommand::AddToCart(AddToCart {
            product: product.clone(),
            qty,
            occurred_at: Utc::now(),
        }));
    }

    /// The usual "add to cart" button: one unit.
    pub fn add_one(&mut self, product: &Product) {
        self.add_to_cart(product, 1);
    }

    /// Set the quantity of an existing line; `qty <= 0` removes it. Absent
    /// ids are ignored.
    pub fn update_quantity(&mut self, id: &ProductId, qty: i64) {
        self.execute(CartCommand::UpdateQuantity(UpdateQuantity {
            product_id: id.clone(),
            qty,
            occurred_at: Utc::now(),
        }));
    }

    pub fn remove_item(&mut self, id: &ProductId) {
        self.execute(CartCommand::RemoveItem(RemoveItem {
            product_id: id.clone(),
            occurred_at: Utc::now(),
        }));
    }

    pub fn clear(&mut self) {
        self.execute(CartCommand::ClearCart(ClearCart {
            occurred_at: Utc::now(),
        }));
    }

    /// Place a mock order for the current contents and empty the cart.
    ///
    /// Returns `None` for an empty cart.
    pub fn checkout(&mut self) -> Option<CheckoutReceipt> {
        if self.cart.is_empty() {
            return None;
        }

        let receipt = CheckoutReceipt {
            order_id: OrderId::new(),
            placed_at: Utc::now(),
            lines: self.cart.lines().cloned().collect(),
            total_items: self.cart.total_items(),
            total_price: self.cart.total_price(),
        };

        self.clear();
        tracing::info!(
            order_id = %receipt.order_id,
            total_items = receipt.total_items,
            total_price = receipt.total_price,
            "order placed (mock checkout)"
        );

        Some(receipt)
    }

    fn execute(&mut self, command: CartCommand) {
        let events = match self.cart.handle(&command) {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!(?err, "cart command rejected");
                return;
            }
        };

        if events.is_empty() {
            tracing::debug!(?command, "cart command was a no-op");
            return;
        }

        for event in &events {
            self.cart.apply(event);
        }

        self.persistence.save(&self.cart);

        let change = CartChanged {
            version: self.cart.version(),
            events,
        };
        if let Err(err) = self.bus.publish(change) {
            tracing::warn!(?err, "failed to notify cart subscribers");
        }
    }
}

impl<S> CartStore<S> {
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Current lines, ordered by product id.
    pub fn lines(&self) -> Vec<&CartLine> {
        self.cart.lines().collect()
    }

    pub fn line(&self, id: &ProductId) -> Option<&CartLine> {
        self.cart.line(id)
    }

    /// `price × qty` for one line.
    pub fn line_total(&self, id: &ProductId) -> Option<f64> {
        self.cart.line(id).map(CartLine::total)
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Badge count: sum of all quantities.
    pub fn total_items(&self) -> u64 {
        self.cart.total_items()
    }

    /// Sum of `price × qty`; round with `format_amount` for display.
    pub fn total_price(&self) -> f64 {
        self.cart.total_price()
    }

    /// Change counter; increases with every effective mutation.
    pub fn version(&self) -> u64 {
        self.cart.version()
    }

    /// Receive a [`CartChanged`] after every effective mutation.
    pub fn subscribe(&self) -> Subscription<CartChanged> {
        self.bus.subscribe()
    }

    pub fn persistence(&self) -> &CartPersistence<S> {
        &self.persistence
    }
}
