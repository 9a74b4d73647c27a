//! # Repository Facade
//!
//! [`CarRepository`] is the single entry point UI clients use for the inventory. It
//! keeps an in-memory copy of the collection plus a loading flag, and routes every
//! operation to the authoritative store picked by the [`Gate`] at construction:
//!
//! - **Remote**: a [`CarProvider`]. The local slot is only read, as a degraded
//!   fallback when the initial provider load fails.
//! - **Fallback**: the [`LocalStore`]. Every mutation rewrites the whole slot.
//!
//! ## Confirm, Then Apply
//!
//! Mutations wait for the store to accept the write before touching the in-memory
//! collection. A failed write leaves memory untouched, so there is nothing to roll
//! back. After any successful mutation the in-memory collection reflects exactly
//! what was written.
//!
//! When a fallback load fails the seed is served from memory and the slot becomes
//! read-only: local mutations fail with [`StorageError::ReadOnly`] until
//! [`CarRepository::reset_to_seed`] or [`CarRepository::clear_local`], so the bytes
//! on disk are never replaced by a seed-derived collection.
//!
//! ## Ordering
//!
//! The collection is newest first: `load` keeps the provider's order, `create`
//! prepends.
//!
//! ## Concurrency
//!
//! The in-memory state sits behind a mutex that is never held across an `.await`.
//! Fallback mutations write the slot while holding it, so they serialize within a
//! process. Remote mutations do not: two in-flight writes each apply their own
//! change when they resolve, in completion order.

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::config::{AutosalonConfig, Gate};
use crate::error::{AutosalonError, Result, StorageError};
use crate::model::{self, Car, CarPatch, NewCar};
use crate::provider::{build_provider, CarProvider};
use crate::seed::seed_cars;
use crate::store::backend::SlotBackend;
use crate::store::fs_backend::FsSlots;
use crate::store::{LoadOutcome, LocalStore};

/// Where the collection served by the last [`CarRepository::load`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    Remote { provider: &'static str },
    /// The provider failed; local contents (or the seed) are served read-only.
    Degraded { reason: String },
    Local(LoadOutcome),
    /// The local store failed; the seed is served without being persisted and
    /// local writes are refused until reset.
    SeedOnly { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub source: LoadSource,
    pub count: usize,
}

struct State {
    cars: Vec<Car>,
    loading: bool,
    /// Set when a fallback load failed; holds the reason.
    read_only: Option<String>,
}

impl State {
    fn ensure_writable(&self) -> Result<()> {
        match &self.read_only {
            Some(reason) => Err(AutosalonError::Storage(StorageError::ReadOnly(
                reason.clone(),
            ))),
            None => Ok(()),
        }
    }
}

pub struct CarRepository<B: SlotBackend> {
    provider: Option<Arc<dyn CarProvider>>,
    local: LocalStore<B>,
    state: Mutex<State>,
}

impl CarRepository<FsSlots> {
    /// Resolves the gate and opens the file-backed local store.
    ///
    /// Never fails: settings that cannot produce a provider fall back to local.
    pub fn from_config(config: &AutosalonConfig) -> Self {
        let provider = match Gate::resolve(config) {
            Gate::Remote(settings) => match build_provider(&settings) {
                Ok(provider) => Some(provider),
                Err(e) => {
                    warn!(error = %e, "Provider settings unusable, using local storage");
                    None
                }
            },
            Gate::Fallback => None,
        };
        let local = LocalStore::with_backend(FsSlots::new(config.storage_dir()));
        Self::new(provider, local)
    }
}

impl<B: SlotBackend> CarRepository<B> {
    pub fn new(provider: Option<Arc<dyn CarProvider>>, local: LocalStore<B>) -> Self {
        Self {
            provider,
            local,
            state: Mutex::new(State {
                cars: Vec::new(),
                loading: true,
                read_only: None,
            }),
        }
    }

    pub fn local(&self) -> &LocalStore<B> {
        &self.local
    }

    pub fn is_remote(&self) -> bool {
        self.provider.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Snapshot of the collection, newest first.
    pub fn cars(&self) -> Vec<Car> {
        self.lock().cars.clone()
    }

    pub fn get(&self, id: &str) -> Option<Car> {
        self.lock().cars.iter().find(|c| c.id == id).cloned()
    }

    pub fn featured(&self) -> Vec<Car> {
        model::featured(&self.lock().cars)
    }

    /// Fills the in-memory collection from the authoritative store.
    ///
    /// Never fails; problems degrade to local data or the seed and are reported in
    /// the returned [`LoadSource`].
    pub async fn load(&self) -> LoadReport {
        self.lock().loading = true;

        let mut read_only = None;
        let (cars, source) = match &self.provider {
            Some(provider) => match provider.list().await {
                Ok(cars) => (
                    cars,
                    LoadSource::Remote {
                        provider: provider.name(),
                    },
                ),
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Loading cars from provider failed, serving local data");
                    (
                        self.local.peek(),
                        LoadSource::Degraded {
                            reason: e.to_string(),
                        },
                    )
                }
            },
            None => match self.local.load() {
                Ok(loaded) => (loaded.cars, LoadSource::Local(loaded.outcome)),
                Err(e) => {
                    warn!(error = %e, "Local car store unusable, serving demo cars read-only");
                    read_only = Some(e.to_string());
                    (
                        seed_cars(),
                        LoadSource::SeedOnly {
                            reason: e.to_string(),
                        },
                    )
                }
            },
        };

        let count = cars.len();
        info!(count, source = ?source, "Cars loaded");
        let mut state = self.lock();
        state.cars = cars;
        state.loading = false;
        state.read_only = read_only;
        LoadReport { source, count }
    }

    /// Stores a new car and prepends it to the collection.
    ///
    /// With a provider and an owner the provider assigns the id. Otherwise the car
    /// goes to the local store under a timestamp-derived id.
    pub async fn create(&self, car: NewCar, owner_id: Option<&str>) -> Result<Car> {
        if let (Some(provider), Some(owner)) = (&self.provider, owner_id) {
            let id = provider.create(&car, owner).await?;
            let created = Car::from_new(id, car);
            self.lock().cars.insert(0, created.clone());
            info!(id = %created.id, "Car created");
            return Ok(created);
        }

        if self.provider.is_some() {
            warn!("No owner supplied, storing car locally instead of in the provider");
        }

        let mut state = self.lock();
        state.ensure_writable()?;
        let id = next_client_id(&state.cars);
        let created = Car::from_new(id, car);
        let mut next = Vec::with_capacity(state.cars.len() + 1);
        next.push(created.clone());
        next.extend(state.cars.iter().cloned());
        self.local.save(&next)?;
        state.cars = next;
        info!(id = %created.id, "Car created locally");
        Ok(created)
    }

    /// Applies `patch` to the car with `id`.
    pub async fn update(&self, id: &str, patch: &CarPatch) -> Result<()> {
        if let Some(provider) = &self.provider {
            provider.update(id, patch).await?;
            let mut state = self.lock();
            match state.cars.iter_mut().find(|c| c.id == id) {
                Some(car) => patch.apply_to(car),
                None => warn!(%id, "Updated car is not in the loaded collection"),
            }
            info!(%id, "Car updated");
            return Ok(());
        }

        let mut state = self.lock();
        state.ensure_writable()?;
        let index = position(&state.cars, id)?;
        let mut next = state.cars.clone();
        patch.apply_to(&mut next[index]);
        self.local.save(&next)?;
        state.cars = next;
        info!(%id, "Car updated locally");
        Ok(())
    }

    /// Removes the car with `id`. An unknown id is an error in both modes.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if let Some(provider) = &self.provider {
            provider.delete(id).await?;
            self.lock().cars.retain(|c| c.id != id);
            info!(%id, "Car deleted");
            return Ok(());
        }

        let mut state = self.lock();
        state.ensure_writable()?;
        let index = position(&state.cars, id)?;
        let mut next = state.cars.clone();
        next.remove(index);
        self.local.save(&next)?;
        state.cars = next;
        info!(%id, "Car deleted locally");
        Ok(())
    }

    /// Whether `user_id` created the car. Always true without a provider.
    pub async fn check_ownership(&self, id: &str, user_id: &str) -> bool {
        match &self.provider {
            Some(provider) => provider.check_ownership(id, user_id).await,
            None => true,
        }
    }

    /// Overwrites the local store with the demo cars and serves them.
    pub fn reset_to_seed(&self) -> Result<Vec<Car>> {
        self.require_local("reset to demo data")?;
        let mut state = self.lock();
        let cars = self.local.reset()?;
        state.cars = cars.clone();
        state.loading = false;
        state.read_only = None;
        Ok(cars)
    }

    /// Removes the local slot. The collection is empty until the next `load`,
    /// which seeds it again.
    pub fn clear_local(&self) -> Result<()> {
        self.require_local("clear local storage")?;
        let mut state = self.lock();
        self.local.clear()?;
        state.cars.clear();
        state.loading = true;
        state.read_only = None;
        Ok(())
    }

    fn require_local(&self, action: &str) -> Result<()> {
        if self.is_remote() {
            return Err(AutosalonError::Api(format!(
                "Cannot {} while a remote provider is configured",
                action
            )));
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn position(cars: &[Car], id: &str) -> Result<usize> {
    cars.iter()
        .position(|c| c.id == id)
        .ok_or_else(|| AutosalonError::Storage(StorageError::NotFound(id.to_string())))
}

/// Milliseconds since the epoch, bumped until it is unused in `cars`.
fn next_client_id(cars: &[Car]) -> String {
    let mut candidate = chrono::Utc::now().timestamp_millis();
    while cars.iter().any(|c| c.id == candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}
