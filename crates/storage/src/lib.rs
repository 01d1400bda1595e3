//! `storefront-storage`
//!
//! **Responsibility:** durable, string-keyed state slots.
//!
//! A slot holds one serialized value under one key (the cart lives under
//! `"cart"`). Implementations:
//! - [`InMemorySlot`] for tests/dev
//! - [`SqliteSlot`] on native targets
//! - [`LocalStorageSlot`] in the browser (`window.localStorage`)

pub mod in_memory;
#[cfg(target_arch = "wasm32")]
pub mod local_storage;
pub mod slot;
#[cfg(not(target_arch = "wasm32"))]
pub mod sqlite;

pub use in_memory::InMemorySlot;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageSlot;
pub use slot::{SlotError, StateSlot};
#[cfg(not(target_arch = "wasm32"))]
pub use sqlite::{SqliteSlot, default_state_db_path};
