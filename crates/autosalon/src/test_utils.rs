use std::sync::Arc;

use crate::messages::local::LocalMessages;
use crate::messages::Inbox;
use crate::model::{FuelType, NewCar, Transmission};
use crate::provider::memory::MemProvider;
use crate::provider::CarProvider;
use crate::repository::CarRepository;
use crate::seed::seed_cars;
use crate::store::mem_backend::MemSlots;
use crate::store::LocalStore;

/// A facade wired to in-memory doubles, with handles to poke at them.
pub struct RepoFixture {
    pub slots: Arc<MemSlots>,
    pub mem_provider: Option<Arc<MemProvider>>,
    pub repo: CarRepository<Arc<MemSlots>>,
}

impl RepoFixture {
    /// No provider; an empty local slot.
    pub fn fallback() -> Self {
        let slots = Arc::new(MemSlots::new());
        let repo = CarRepository::new(None, LocalStore::with_backend(slots.clone()));
        Self {
            slots,
            mem_provider: None,
            repo,
        }
    }

    pub async fn loaded_fallback() -> Self {
        let fx = Self::fallback();
        fx.repo.load().await;
        fx
    }

    /// A `MemProvider` holding the demo cars, oldest first, owned by `"seed"`.
    pub fn remote() -> Self {
        let slots = Arc::new(MemSlots::new());
        let provider = Arc::new(MemProvider::new().with_cars(seed_cars(), "seed"));
        let dyn_provider: Arc<dyn CarProvider> = provider.clone();
        let repo = CarRepository::new(
            Some(dyn_provider),
            LocalStore::with_backend(slots.clone()),
        );
        Self {
            slots,
            mem_provider: Some(provider),
            repo,
        }
    }

    /// The provider double. Panics on a fallback fixture.
    pub fn provider(&self) -> &MemProvider {
        self.mem_provider
            .as_deref()
            .expect("fixture has no provider")
    }
}

/// An inbox over the seeded local message slot.
pub fn local_inbox() -> (Arc<MemSlots>, Inbox) {
    let slots = Arc::new(MemSlots::new());
    let inbox = Inbox::new(Arc::new(LocalMessages::new(slots.clone())));
    (slots, inbox)
}

pub fn octavia() -> NewCar {
    NewCar {
        name: "2022 Škoda Octavia".to_string(),
        brand: "Škoda".to_string(),
        year: 2022,
        price: 500000,
        price_formatted: Some("500 000 Kč".to_string()),
        mileage: 10000,
        fuel: FuelType::Diesel,
        transmission: Transmission::Manual,
        engine_volume: Some("2.0 TDI".to_string()),
        power: Some("110 kW".to_string()),
        description: "Spolehlivé rodinné kombi.".to_string(),
        image_url: "https://example.com/octavia.jpg".to_string(),
        image_urls: None,
        featured: false,
        pinned: false,
        features: Some(vec!["Navigace".to_string(), "Tempomat".to_string()]),
    }
}
