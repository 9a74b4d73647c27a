use autosalon::error::{AutosalonError, StorageError};
use autosalon::seed::seed_cars;
use autosalon::store::backend::SlotBackend;
use autosalon::store::fs_backend::FsSlots;
use autosalon::store::{LoadOutcome, LocalStore, CARS_KEY};
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, FsSlots) {
    let dir = TempDir::new().unwrap();
    let slots = FsSlots::new(dir.path().join("data"));
    (dir, slots)
}

#[test]
fn test_fs_slots_basic_io() {
    let (_dir, slots) = setup();

    // Never written
    assert_eq!(slots.read("cars").unwrap(), None);

    slots.write("cars", "[]").unwrap();
    assert_eq!(slots.read("cars").unwrap(), Some("[]".to_string()));

    slots.write("cars", "[1]").unwrap();
    assert_eq!(slots.read("cars").unwrap(), Some("[1]".to_string()));

    slots.remove("cars").unwrap();
    assert_eq!(slots.read("cars").unwrap(), None);

    // Removing again is fine
    slots.remove("cars").unwrap();
}

#[test]
fn test_fs_slots_atomic_write_artifacts() {
    let (_dir, slots) = setup();
    slots.write("cars", "Atomic").unwrap();

    let expected = slots.root().join("cars.json");
    assert_eq!(fs::read_to_string(&expected).unwrap(), "Atomic");

    for entry in fs::read_dir(slots.root()).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[test]
fn test_fs_slots_rejects_path_like_keys() {
    let (_dir, slots) = setup();
    for key in ["", "../cars", "a/b", "cars.json"] {
        let err = slots.write(key, "x").unwrap_err();
        assert!(
            matches!(err, AutosalonError::Storage(StorageError::Backend(_))),
            "key {:?} was accepted",
            key
        );
    }
}

#[test]
fn test_local_store_on_disk_survives_reopen() {
    let (dir, slots) = setup();
    let store = LocalStore::with_backend(slots);
    assert_eq!(store.load().unwrap().outcome, LoadOutcome::Seeded);

    let mut cars = seed_cars();
    cars.remove(0);
    store.save(&cars).unwrap();

    let reopened = LocalStore::with_backend(FsSlots::new(dir.path().join("data")));
    let loaded = reopened.load().unwrap();
    assert_eq!(loaded.outcome, LoadOutcome::Stored);
    assert_eq!(loaded.cars, cars);
}

#[test]
fn test_local_store_repairs_hand_edited_file() {
    let (_dir, slots) = setup();
    fs::create_dir_all(slots.root()).unwrap();
    fs::write(slots.root().join("cars.json"), r#"[{"name":"broken"}]"#).unwrap();

    let store = LocalStore::with_backend(slots);
    let loaded = store.load().unwrap();
    assert!(matches!(loaded.outcome, LoadOutcome::Repaired { .. }));
    assert_eq!(loaded.cars, seed_cars());

    let on_disk = store.backend().read(CARS_KEY).unwrap().unwrap();
    assert_eq!(autosalon::store::parse_collection(&on_disk).unwrap(), seed_cars());
}
