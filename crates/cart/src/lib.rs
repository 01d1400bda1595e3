//! Shopping cart domain module.
//!
//! The cart is a command/event aggregate ([`Cart`]) wrapped by a store
//! ([`CartStore`]) that persists after every effective mutation and notifies
//! subscribers. Persistence is best-effort: storage trouble never blocks or
//! fails a cart operation.

pub mod cart;
pub mod line;
pub mod persistence;
pub mod store;

pub use cart::{
    AddToCart, Cart, CartCleared, CartCommand, CartEvent, ClearCart, LineAdded, LineRemoved,
    QuantitySet, RemoveItem, UpdateQuantity,
};
pub use line::CartLine;
pub use persistence::{CartPersistence, DEFAULT_CART_KEY};
pub use store::{CartChanged, CartStore, CheckoutReceipt};
