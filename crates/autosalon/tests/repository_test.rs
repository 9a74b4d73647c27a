use autosalon::config::{AutosalonConfig, ProviderKind};
use autosalon::messages::Inbox;
use autosalon::model::{CarPatch, FuelType, NewCar, Transmission};
use autosalon::repository::{CarRepository, LoadSource};
use autosalon::seed::seed_cars;
use autosalon::store::LoadOutcome;
use std::sync::Arc;
use tempfile::TempDir;

fn octavia() -> NewCar {
    NewCar {
        name: "2022 Škoda Octavia".to_string(),
        brand: "Škoda".to_string(),
        year: 2022,
        price: 500000,
        price_formatted: None,
        mileage: 10000,
        fuel: FuelType::Diesel,
        transmission: Transmission::Manual,
        engine_volume: None,
        power: None,
        description: String::new(),
        image_url: "https://example.com/octavia.jpg".to_string(),
        image_urls: None,
        featured: false,
        pinned: false,
        features: None,
    }
    .with_derived_price()
}

fn config_in(dir: &TempDir) -> AutosalonConfig {
    AutosalonConfig {
        storage_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_fallback_lifecycle_on_disk() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    let repo = CarRepository::from_config(&config);
    assert!(!repo.is_remote());
    assert_eq!(
        repo.load().await.source,
        LoadSource::Local(LoadOutcome::Seeded)
    );

    let created = repo.create(octavia(), None).await.unwrap();
    repo.update(
        "2",
        &CarPatch {
            price: Some(700000),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    repo.delete("3").await.unwrap();

    // A fresh facade over the same directory sees every change.
    let reopened = CarRepository::from_config(&config);
    let report = reopened.load().await;
    assert_eq!(report.source, LoadSource::Local(LoadOutcome::Stored));
    assert_eq!(report.count, 6);

    let cars = reopened.cars();
    assert_eq!(cars[0], created);
    assert_eq!(reopened.get("2").unwrap().price, 700000);
    assert!(reopened.get("3").is_none());
    assert_eq!(cars, repo.cars());
}

#[tokio::test]
async fn test_placeholder_credentials_stay_local() {
    let dir = TempDir::new().unwrap();
    let config = AutosalonConfig {
        provider_url: Some("your-supabase-url".into()),
        provider_key: Some("your-supabase-anon-key".into()),
        ..config_in(&dir)
    };
    let repo = CarRepository::from_config(&config);
    assert!(!repo.is_remote());
    repo.load().await;
    assert_eq!(repo.cars(), seed_cars());
}

#[tokio::test]
async fn test_unbuildable_provider_falls_back() {
    let dir = TempDir::new().unwrap();
    let config = AutosalonConfig {
        provider: ProviderKind::Firestore,
        provider_url: Some("https://example.com/not-a-database".into()),
        provider_key: Some("key".into()),
        ..config_in(&dir)
    };
    let repo = CarRepository::from_config(&config);
    assert!(!repo.is_remote());
}

#[tokio::test]
async fn test_fallback_writes_from_tasks_are_not_lost() {
    let dir = TempDir::new().unwrap();
    let repo = Arc::new(CarRepository::from_config(&config_in(&dir)));
    repo.load().await;

    let mut handles = Vec::new();
    for i in 0..4 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            let mut car = octavia();
            car.name = format!("Task car {}", i);
            repo.create(car, None).await.map(|c| c.id)
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(repo.cars().len(), 10);
    let reopened = CarRepository::from_config(&config_in(&dir));
    reopened.load().await;
    assert_eq!(reopened.cars(), repo.cars());
}

#[tokio::test]
async fn test_local_inbox_on_disk() {
    let dir = TempDir::new().unwrap();
    let inbox = Inbox::from_config(&config_in(&dir));
    assert_eq!(inbox.backend_name(), "local");
    inbox.load().await.unwrap();
    inbox.open("1").await.unwrap();

    let reopened = Inbox::from_config(&config_in(&dir));
    reopened.load().await.unwrap();
    assert_eq!(reopened.unread(), 0);
    assert!(dir.path().join("contact_messages.json").exists());
}
