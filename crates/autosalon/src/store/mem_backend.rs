use super::backend::SlotBackend;
use crate::error::{AutosalonError, Result, StorageError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-memory slot backend for testing.
///
/// Can emulate a storage quota (the browser `localStorage` limit) and
/// arbitrary write failures.
#[derive(Default)]
pub struct MemSlots {
    slots: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
    simulate_write_error: AtomicBool,
}

impl MemSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes whose value is larger than `bytes`.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Pre-populate a slot, bypassing quota and error simulation.
    pub fn with_slot(self, key: &str, value: &str) -> Self {
        self.put_raw(key, value);
        self
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Test helper to overwrite a slot with arbitrary content.
    pub fn put_raw(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    /// Test helper to inspect a slot without going through the trait.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a half-written String behind.
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SlotBackend for MemSlots {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(AutosalonError::Storage(StorageError::Backend(
                "Simulated write error".to_string(),
            )));
        }
        if let Some(limit) = self.quota {
            if value.len() > limit {
                return Err(AutosalonError::Storage(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    size: value.len(),
                    limit,
                }));
            }
        }
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}
