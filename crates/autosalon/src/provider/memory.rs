use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::CarProvider;
use crate::error::{AutosalonError, ProviderError, Result};
use crate::model::{Car, CarPatch, NewCar};

#[derive(Debug, Clone)]
struct StoredCar {
    car: Car,
    owner: String,
    seq: u64,
}

/// In-process provider.
///
/// Behaves like a remote backend (server-assigned ids, newest-first listing, owner
/// tracking) without a network. Failures can be switched on to exercise the
/// facade's error paths.
#[derive(Default)]
pub struct MemProvider {
    cars: Mutex<Vec<StoredCar>>,
    next_seq: AtomicU64,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the backend. Later entries count as newer.
    pub fn with_cars(self, cars: Vec<Car>, owner: &str) -> Self {
        {
            let mut stored = self.lock();
            for car in cars {
                let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
                stored.push(StoredCar {
                    car,
                    owner: owner.to_string(),
                    seq,
                });
            }
        }
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Stored cars in insertion order, for assertions.
    pub fn snapshot(&self) -> Vec<Car> {
        self.lock().iter().map(|s| s.car.clone()).collect()
    }

    pub fn owner_of(&self, id: &str) -> Option<String> {
        self.lock()
            .iter()
            .find(|s| s.car.id == id)
            .map(|s| s.owner.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StoredCar>> {
        self.cars.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self, flag: &AtomicBool) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(AutosalonError::Provider(ProviderError::Transport(
                "Simulated provider failure".to_string(),
            )));
        }
        Ok(())
    }
}

fn not_found(id: &str) -> AutosalonError {
    AutosalonError::Provider(ProviderError::NotFound(id.to_string()))
}

#[async_trait]
impl CarProvider for MemProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, car: &NewCar, owner_id: &str) -> Result<String> {
        self.check(&self.fail_writes)?;
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let id = format!("mem-{}", seq);
        self.lock().push(StoredCar {
            car: Car::from_new(id.clone(), car.clone()),
            owner: owner_id.to_string(),
            seq,
        });
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Car>> {
        self.check(&self.fail_reads)?;
        let mut stored = self.lock().clone();
        stored.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(stored.into_iter().map(|s| s.car).collect())
    }

    async fn update(&self, id: &str, patch: &CarPatch) -> Result<()> {
        self.check(&self.fail_writes)?;
        let mut stored = self.lock();
        let entry = stored
            .iter_mut()
            .find(|s| s.car.id == id)
            .ok_or_else(|| not_found(id))?;
        patch.apply_to(&mut entry.car);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check(&self.fail_writes)?;
        let mut stored = self.lock();
        let index = stored
            .iter()
            .position(|s| s.car.id == id)
            .ok_or_else(|| not_found(id))?;
        stored.remove(index);
        Ok(())
    }

    async fn check_ownership(&self, id: &str, user_id: &str) -> bool {
        if self.fail_reads.load(Ordering::SeqCst) {
            return false;
        }
        self.owner_of(id).as_deref() == Some(user_id)
    }
}
