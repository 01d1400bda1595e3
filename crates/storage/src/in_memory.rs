use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::slot::{SlotError, StateSlot};

/// In-memory slot store for tests/dev.
///
/// Failures can be injected to exercise best-effort persistence paths.
#[derive(Debug, Default)]
pub struct InMemorySlot {
    inner: RwLock<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent reads fail (simulates unavailable storage).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes and removes fail (simulates a full quota).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw view of a stored value, bypassing failure injection.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.read().ok()?.get(key).cloned()
    }
}

impl StateSlot for InMemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SlotError::Unavailable("reads disabled".to_string()));
        }
        let map = self.inner.read().map_err(|_| SlotError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SlotError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SlotError::Storage("quota exceeded".to_string()));
        }
        let mut map = self.inner.write().map_err(|_| SlotError::Poisoned)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SlotError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SlotError::Storage("quota exceeded".to_string()));
        }
        let mut map = self.inner.write().map_err(|_| SlotError::Poisoned)?;
        map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_returns_latest_value() {
        let slot = InMemorySlot::new();
        assert_eq!(slot.read("cart").unwrap(), None);

        slot.write("cart", "{}").unwrap();
        slot.write("cart", r#"{"1":{}}"#).unwrap();

        assert_eq!(slot.read("cart").unwrap().as_deref(), Some(r#"{"1":{}}"#));
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let slot = InMemorySlot::new();
        assert!(slot.remove("nothing").is_ok());
    }

    #[test]
    fn injected_failures_surface_as_errors() {
        let slot = InMemorySlot::new();
        slot.write("cart", "{}").unwrap();

        slot.fail_writes(true);
        assert!(matches!(slot.write("cart", "[]"), Err(SlotError::Storage(_))));
        assert_eq!(slot.peek("cart").as_deref(), Some("{}"));

        slot.fail_reads(true);
        assert!(matches!(slot.read("cart"), Err(SlotError::Unavailable(_))));
    }
}
