//! # Local Fallback Store
//!
//! When no remote provider is configured, the whole inventory lives in a single
//! key-value slot (`"cars"`) as a JSON array. This mirrors the browser `localStorage`
//! slot the website used; here the slot is a file ([`fs_backend::FsSlots`]) or a map
//! ([`mem_backend::MemSlots`]).
//!
//! ## Write Model
//!
//! Every mutation re-serializes the **entire** collection and replaces the slot. There
//! are no incremental patches. Concurrent processes writing the same slot are not
//! coordinated: last writer wins.
//!
//! ## Validation and Auto-Repair
//!
//! A stored value is valid when it is a JSON array whose every element is an object
//! with a boolean `featured` and a string `imageUrl`, and which decodes into cars with
//! unique ids. Anything else is a validation failure, handled by the
//! [`CorruptDataPolicy`]:
//!
//! - [`CorruptDataPolicy::ResetToSeed`] (default): the slot is overwritten with the
//!   seed and the seed is returned. Corrupt data is **discarded**; availability wins
//!   over durability.
//! - [`CorruptDataPolicy::Fail`]: the validation error is returned and the slot is
//!   left untouched.
//!
//! ## Storage Layout
//!
//! ```text
//! <storage_dir>/
//! ├── cars.json               # Car inventory (JSON array)
//! └── contact_messages.json   # Inbox, when no provider is configured
//! ```

use serde_json::Value;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::error::{AutosalonError, Result};
use crate::model::Car;
use crate::seed::seed_cars;

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;

use backend::SlotBackend;

/// Slot holding the car inventory.
pub const CARS_KEY: &str = "cars";

/// What to do when the stored inventory fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptDataPolicy {
    /// Overwrite the slot with the seed dataset.
    #[default]
    ResetToSeed,
    /// Surface the validation error and keep the stored bytes.
    Fail,
}

/// How [`LocalStore::load`] obtained its collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The stored collection was valid.
    Stored,
    /// The slot was empty; the seed was written.
    Seeded,
    /// The stored value was invalid and has been replaced by the seed.
    Repaired { reason: String },
}

#[derive(Debug, Clone)]
pub struct LocalLoad {
    pub cars: Vec<Car>,
    pub outcome: LoadOutcome,
}

pub struct LocalStore<B: SlotBackend> {
    backend: B,
    policy: CorruptDataPolicy,
}

impl<B: SlotBackend> LocalStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            policy: CorruptDataPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CorruptDataPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Reads the inventory, seeding an empty slot and repairing an invalid one.
    pub fn load(&self) -> Result<LocalLoad> {
        let Some(raw) = self.backend.read(CARS_KEY)? else {
            let cars = seed_cars();
            self.save(&cars)?;
            info!(count = cars.len(), "Seeded empty local store with demo cars");
            return Ok(LocalLoad {
                cars,
                outcome: LoadOutcome::Seeded,
            });
        };

        match parse_collection(&raw) {
            Ok(cars) => Ok(LocalLoad {
                cars,
                outcome: LoadOutcome::Stored,
            }),
            Err(err) => match self.policy {
                CorruptDataPolicy::Fail => Err(err),
                CorruptDataPolicy::ResetToSeed => {
                    let reason = err.to_string();
                    warn!(%reason, "Local car store is corrupt, resetting to demo data");
                    let cars = seed_cars();
                    self.save(&cars)?;
                    Ok(LocalLoad {
                        cars,
                        outcome: LoadOutcome::Repaired { reason },
                    })
                }
            },
        }
    }

    /// Read-only load: the stored collection if it is valid, the seed otherwise.
    ///
    /// Never writes. Used when a configured provider could not be reached.
    pub fn peek(&self) -> Vec<Car> {
        match self.backend.read(CARS_KEY) {
            Ok(Some(raw)) => parse_collection(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring invalid local car store");
                seed_cars()
            }),
            Ok(None) => seed_cars(),
            Err(e) => {
                warn!(error = %e, "Could not read local car store");
                seed_cars()
            }
        }
    }

    /// Replaces the stored inventory with `cars`.
    pub fn save(&self, cars: &[Car]) -> Result<()> {
        let content = serde_json::to_string(cars)
            .map_err(|e| AutosalonError::Storage(e.into()))?;
        self.backend.write(CARS_KEY, &content)
    }

    /// Overwrites the slot with the demo inventory.
    pub fn reset(&self) -> Result<Vec<Car>> {
        let cars = seed_cars();
        self.save(&cars)?;
        info!(count = cars.len(), "Local store reset to demo cars");
        Ok(cars)
    }

    /// Removes the inventory slot. The next `load` seeds it again.
    pub fn clear(&self) -> Result<()> {
        self.backend.remove(CARS_KEY)?;
        info!("Local car store cleared");
        Ok(())
    }
}

/// Validates and decodes a stored inventory.
pub fn parse_collection(raw: &str) -> Result<Vec<Car>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| AutosalonError::Validation(format!("invalid JSON: {}", e)))?;

    let items = value
        .as_array()
        .ok_or_else(|| AutosalonError::Validation("stored value is not an array".into()))?;

    for (i, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            return Err(AutosalonError::Validation(format!(
                "element {} is not an object",
                i
            )));
        };
        if !obj.get("featured").is_some_and(Value::is_boolean) {
            return Err(AutosalonError::Validation(format!(
                "element {} has no boolean 'featured'",
                i
            )));
        }
        if !obj.get("imageUrl").is_some_and(Value::is_string) {
            return Err(AutosalonError::Validation(format!(
                "element {} has no string 'imageUrl'",
                i
            )));
        }
    }

    let cars: Vec<Car> = serde_json::from_value(value)
        .map_err(|e| AutosalonError::Validation(format!("malformed car: {}", e)))?;

    let mut seen = HashSet::new();
    for car in &cars {
        if !seen.insert(car.id.as_str()) {
            return Err(AutosalonError::Validation(format!(
                "duplicate id '{}'",
                car.id
            )));
        }
    }

    Ok(cars)
}
