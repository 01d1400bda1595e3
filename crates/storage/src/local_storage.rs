//! Browser `localStorage` slots.

use web_sys::Storage;

use crate::slot::{SlotError, StateSlot};

/// Slot store over `window.localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStorageSlot {
    storage: Storage,
}

impl LocalStorageSlot {
    /// Bind to the current window's `localStorage`.
    ///
    /// Fails when there is no window (workers) or storage is disabled
    /// (privacy modes, sandboxed iframes).
    pub fn open() -> Result<Self, SlotError> {
        let window =
            web_sys::window().ok_or_else(|| SlotError::Unavailable("no window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| SlotError::Unavailable(format!("localStorage access denied: {e:?}")))?
            .ok_or_else(|| SlotError::Unavailable("localStorage is disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl StateSlot for LocalStorageSlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        self.storage
            .get_item(key)
            .map_err(|e| SlotError::Storage(format!("getItem({key}) failed: {e:?}")))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SlotError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| SlotError::Storage(format!("setItem({key}) failed: {e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), SlotError> {
        self.storage
            .remove_item(key)
            .map_err(|e| SlotError::Storage(format!("removeItem({key}) failed: {e:?}")))
    }
}
