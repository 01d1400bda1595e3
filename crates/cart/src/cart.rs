use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::Product;
use storefront_core::{Aggregate, DomainError, ProductId};
use storefront_events::Event;

use crate::line::CartLine;

/// Aggregate: the shopper's cart.
///
/// Invariants:
/// - one line per product id, keyed by that id
/// - every line's embedded product id equals its key
/// - every quantity is at least 1 (a line that would drop to 0 is removed)
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: BTreeMap<ProductId, CartLine>,
    version: u64,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from already-validated lines (hydration).
    ///
    /// Lines with a zero quantity are skipped; a later line for the same
    /// product replaces an earlier one.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let lines = lines
            .into_iter()
            .filter(|line| line.qty > 0)
            .map(|line| (line.product.id.clone(), line))
            .collect();
        Self { lines, version: 0 }
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    pub fn as_map(&self) -> &BTreeMap<ProductId, CartLine> {
        &self.lines
    }

    pub fn line(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.get(id)
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.lines.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all quantities (badge count).
    pub fn total_items(&self) -> u64 {
        self.lines.values().map(|line| u64::from(line.qty)).sum()
    }

    /// Sum of `price × qty` over all lines, unrounded.
    pub fn total_price(&self) -> f64 {
        self.lines.values().map(CartLine::total).sum()
    }
}

/// Command: AddToCart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddToCart {
    pub product: Product,
    /// Quantity to add. Values `<= 0` add nothing.
    pub qty: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateQuantity (absolute set; `<= 0` removes the line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQuantity {
    pub product_id: ProductId,
    pub qty: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCart {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CartCommand {
    AddToCart(AddToCart),
    UpdateQuantity(UpdateQuantity),
    RemoveItem(RemoveItem),
    ClearCart(ClearCart),
}

/// Event: LineAdded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAdded {
    pub line: CartLine,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantitySet (absolute quantity of an existing line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantitySet {
    pub product_id: ProductId,
    pub qty: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRemoved {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CartCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCleared {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CartEvent {
    LineAdded(LineAdded),
    QuantitySet(QuantitySet),
    LineRemoved(LineRemoved),
    CartCleared(CartCleared),
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::LineAdded(_) => "cart.line.added",
            CartEvent::QuantitySet(_) => "cart.line.quantity_set",
            CartEvent::LineRemoved(_) => "cart.line.removed",
            CartEvent::CartCleared(_) => "cart.cleared",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::LineAdded(e) => e.occurred_at,
            CartEvent::QuantitySet(e) => e.occurred_at,
            CartEvent::LineRemoved(e) => e.occurred_at,
            CartEvent::CartCleared(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Cart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = DomainError;

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::LineAdded(e) => {
                self.lines.insert(e.line.product.id.clone(), e.line.clone());
            }
            CartEvent::QuantitySet(e) => {
                if let Some(line) = self.lines.get_mut(&e.product_id) {
                    line.qty = e.qty;
                }
            }
            CartEvent::LineRemoved(e) => {
                self.lines.remove(&e.product_id);
            }
            CartEvent::CartCleared(_) => {
                self.lines.clear();
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddToCart(cmd) => self.handle_add(cmd),
            CartCommand::UpdateQuantity(cmd) => self.handle_update(cmd),
            CartCommand::RemoveItem(cmd) => self.handle_remove(cmd),
            CartCommand::ClearCart(cmd) => self.handle_clear(cmd),
        }
    }
}

impl Cart {
    fn handle_add(&self, cmd: &AddToCart) -> Result<Vec<CartEvent>, DomainError> {
        if cmd.qty <= 0 {
            // Adding never decrements; use UpdateQuantity for that.
            tracing::warn!(
                product_id = %cmd.product.id,
                qty = cmd.qty,
                "ignoring add-to-cart with non-positive quantity"
            );
            return Ok(vec![]);
        }
        let qty = clamp_qty(cmd.qty);

        match self.lines.get(&cmd.product.id) {
            Some(existing) => {
                let next = existing.qty.saturating_add(qty);
                if next == existing.qty {
                    return Ok(vec![]);
                }
                Ok(vec![CartEvent::QuantitySet(QuantitySet {
                    product_id: cmd.product.id.clone(),
                    qty: next,
                    occurred_at: cmd.occurred_at,
                })])
            }
            None => {
                let line = CartLine::new(cmd.product.clone(), qty)?;
                Ok(vec![CartEvent::LineAdded(LineAdded {
                    line,
                    occurred_at: cmd.occurred_at,
                })])
            }
        }
    }

    fn handle_update(&self, cmd: &UpdateQuantity) -> Result<Vec<CartEvent>, DomainError> {
        let Some(existing) = self.lines.get(&cmd.product_id) else {
            return Ok(vec![]);
        };

        if cmd.qty <= 0 {
            return Ok(vec![CartEvent::LineRemoved(LineRemoved {
                product_id: cmd.product_id.clone(),
                occurred_at: cmd.occurred_at,
            })]);
        }

        let qty = clamp_qty(cmd.qty);
        if qty == existing.qty {
            return Ok(vec![]);
        }

        Ok(vec![CartEvent::QuantitySet(QuantitySet {
            product_id: cmd.product_id.clone(),
            qty,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveItem) -> Result<Vec<CartEvent>, DomainError> {
        if !self.lines.contains_key(&cmd.product_id) {
            return Ok(vec![]);
        }

        Ok(vec![CartEvent::LineRemoved(LineRemoved {
            product_id: cmd.product_id.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_clear(&self, cmd: &ClearCart) -> Result<Vec<CartEvent>, DomainError> {
        if self.lines.is_empty() {
            return Ok(vec![]);
        }

        Ok(vec![CartEvent::CartCleared(CartCleared {
            occurred_at: cmd.occurred_at,
        })])
    }
}

/// Positive `i64` quantity → `u32`, saturating.
fn clamp_qty(qty: i64) -> u32 {
    u32::try_from(qty).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::Price;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn product(id: u64, price: f64) -> Product {
        Product::new(ProductId::from(id), format!("Product {id}"), Price::new(price).unwrap())
    }

    fn add(product: &Product, qty: i64) -> CartCommand {
        CartCommand::AddToCart(AddToCart {
            product: product.clone(),
            qty,
            occurred_at: test_time(),
        })
    }

    fn update(id: u64, qty: i64) -> CartCommand {
        CartCommand::UpdateQuantity(UpdateQuantity {
            product_id: ProductId::from(id),
            qty,
            occurred_at: test_time(),
        })
    }

    fn execute(cart: &mut Cart, command: CartCommand) -> Vec<CartEvent> {
        let events = cart.handle(&command).unwrap();
        for event in &events {
            cart.apply(event);
        }
        events
    }

    #[test]
    fn adding_new_product_emits_line_added() {
        let cart = Cart::new();
        let events = cart.handle(&add(&product(1, 10.0), 2)).unwrap();

        assert_eq!(events.len(), 1);
        match &events[0] {
            CartEvent::LineAdded(e) => {
                assert_eq!(e.line.product.id, ProductId::from(1));
                assert_eq!(e.line.qty, 2);
            }
            _ => panic!("Expected LineAdded event"),
        }
    }

    #[test]
    fn adding_existing_product_increments_and_keeps_snapshot() {
        let mut cart = Cart::new();
        execute(&mut cart, add(&product(1, 10.0), 1));

        let repriced = product(1, 99.0);
        let events = execute(&mut cart, add(&repriced, 3));

        assert!(matches!(&events[0], CartEvent::QuantitySet(e) if e.qty == 4));
        let line = cart.line(&ProductId::from(1)).unwrap();
        assert_eq!(line.qty, 4);
        assert_eq!(line.product.price.amount(), 10.0);
    }

    #[test]
    fn non_positive_add_is_a_no_op() {
        let mut cart = Cart::new();
        execute(&mut cart, add(&product(1, 10.0), 2));

        assert!(cart.handle(&add(&product(1, 10.0), 0)).unwrap().is_empty());
        assert!(cart.handle(&add(&product(1, 10.0), -5)).unwrap().is_empty());
        assert!(cart.handle(&add(&product(2, 10.0), -1)).unwrap().is_empty());
        assert_eq!(cart.line(&ProductId::from(1)).unwrap().qty, 2);
    }

    #[test]
    fn quantities_saturate_instead_of_overflowing() {
        let mut cart = Cart::new();
        execute(&mut cart, add(&product(1, 1.0), i64::MAX));
        assert_eq!(cart.line(&ProductId::from(1)).unwrap().qty, u32::MAX);

        assert!(cart.handle(&add(&product(1, 1.0), 1)).unwrap().is_empty());
    }

    #[test]
    fn update_sets_absolute_quantity() {
        let mut cart = Cart::new();
        execute(&mut cart, add(&product(1, 10.0), 5));

        execute(&mut cart, update(1, 2));

        assert_eq!(cart.line(&ProductId::from(1)).unwrap().qty, 2);
    }

    #[test]
    fn update_to_zero_or_below_removes_line() {
        for qty in [0, -1, -100] {
            let mut cart = Cart::new();
            execute(&mut cart, add(&product(1, 10.0), 5));

            let events = execute(&mut cart, update(1, qty));

            assert!(matches!(&events[0], CartEvent::LineRemoved(_)));
            assert!(!cart.contains(&ProductId::from(1)));
        }
    }

    #[test]
    fn update_of_absent_or_unchanged_line_emits_nothing() {
        let mut cart = Cart::new();
        assert!(cart.handle(&update(7, 3)).unwrap().is_empty());
        assert!(cart.handle(&update(7, 0)).unwrap().is_empty());

        execute(&mut cart, add(&product(1, 10.0), 3));
        assert!(cart.handle(&update(1, 3)).unwrap().is_empty());
    }

    #[test]
    fn remove_and_clear_are_no_ops_when_nothing_to_do() {
        let cart = Cart::new();
        let remove = CartCommand::RemoveItem(RemoveItem {
            product_id: ProductId::from(1),
            occurred_at: test_time(),
        });
        let clear = CartCommand::ClearCart(ClearCart {
            occurred_at: test_time(),
        });

        assert!(cart.handle(&remove).unwrap().is_empty());
        assert!(cart.handle(&clear).unwrap().is_empty());
    }

    #[test]
    fn totals_sum_quantities_and_prices() {
        let mut cart = Cart::new();
        execute(&mut cart, add(&product(1, 10.0), 2));
        execute(&mut cart, add(&product(2, 2.5), 4));

        assert_eq!(cart.total_items(), 6);
        assert_eq!(cart.total_price(), 30.0);
    }

    #[test]
    fn version_increments_per_applied_event() {
        let mut cart = Cart::new();
        assert_eq!(cart.version(), 0);

        execute(&mut cart, add(&product(1, 10.0), 1));
        assert_eq!(cart.version(), 1);

        execute(&mut cart, update(1, 0));
        assert_eq!(cart.version(), 2);

        execute(&mut cart, update(1, 0));
        assert_eq!(cart.version(), 2);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let mut cart = Cart::new();
        execute(&mut cart, add(&product(1, 10.0), 1));
        let command = add(&product(1, 10.0), 2);

        let events1 = cart.handle(&command).unwrap();
        let events2 = cart.handle(&command).unwrap();

        assert_eq!(events1, events2);
        assert_eq!(cart.version(), 1);
        assert_eq!(cart.line(&ProductId::from(1)).unwrap().qty, 1);
    }

    #[test]
    fn event_types_are_stable() {
        let event = CartEvent::CartCleared(CartCleared {
            occurred_at: test_time(),
        });
        assert_eq!(event.event_type(), "cart.cleared");
        assert_eq!(event.version(), 1);
    }

    #[test]
    fn from_lines_skips_zero_quantities() {
        let cart = Cart::from_lines(vec![
            CartLine {
                product: product(1, 1.0),
                qty: 0,
            },
            CartLine {
                product: product(2, 1.0),
                qty: 2,
            },
        ]);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.version(), 0);
    }
}
