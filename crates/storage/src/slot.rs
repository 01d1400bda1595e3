use std::sync::Arc;

/// Durable slot failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    /// The backing store cannot be reached at all (no browser storage,
    /// database not openable, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The store was reachable but the operation failed (quota, IO, ...).
    #[error("storage error: {0}")]
    Storage(String),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// String-keyed durable key/value slot.
///
/// Values are opaque strings; callers own the serialization format.
pub trait StateSlot {
    /// Read the value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>, SlotError>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<(), SlotError>;

    /// Delete the value under `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), SlotError>;
}

impl<S> StateSlot for Arc<S>
where
    S: StateSlot + ?Sized,
{
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SlotError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), SlotError> {
        (**self).remove(key)
    }
}
