use crate::error::Result;

/// Raw key-value slot I/O.
///
/// This trait handles the "how" of local persistence (filesystem vs memory),
/// while `LocalStore` handles the "what" (validation, seeding, repair).
/// Each slot holds one UTF-8 string; writes replace the whole value.
pub trait SlotBackend: Send + Sync {
    /// Read the raw value stored under `key`.
    /// Returns Ok(None) if the slot has never been written (or was removed).
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    /// MUST be atomic: a reader sees either the old or the new value, never a mix.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the slot. Removing an absent slot is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: SlotBackend + ?Sized> SlotBackend for std::sync::Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
