#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn autosalon_cmd(temp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("autosalon"));
    cmd.current_dir(temp.path())
        .env("AUTOSALON_STORAGE_DIR", temp.path().join("data"))
        .env_remove("AUTOSALON_PROVIDER")
        .env_remove("AUTOSALON_PROVIDER_URL")
        .env_remove("AUTOSALON_PROVIDER_KEY")
        .env_remove("AUTOSALON_ACCESS_TOKEN")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_inventory_workflow() {
    let temp = TempDir::new().unwrap();

    // 1. First run seeds the demo cars
    autosalon_cmd(&temp)
        .assert()
        .success()
        .stdout(predicate::str::contains("2021 Porsche Macan"))
        .stderr(predicate::str::contains("demo cars added"));
    assert!(temp.path().join("data").join("cars.json").exists());

    // 2. Add a car
    autosalon_cmd(&temp)
        .args([
            "add",
            "--name",
            "2022 Škoda Octavia",
            "--brand",
            "Škoda",
            "--year",
            "2022",
            "--price",
            "500000",
            "--fuel",
            "diesel",
            "--transmission",
            "manual",
            "--image-url",
            "https://example.com/octavia.jpg",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 2022 Škoda Octavia"));

    // 3. Newest first
    let output = autosalon_cmd(&temp)
        .args(["list", "--newest"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let first = stdout.lines().next().unwrap();
    assert!(first.contains("Škoda Octavia"), "first line: {}", first);
    assert_eq!(stdout.lines().count(), 7);

    // 4. Update and show
    autosalon_cmd(&temp)
        .args(["update", "2", "--price", "700000"])
        .assert()
        .success();
    autosalon_cmd(&temp)
        .args(["show", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("700 000 Kč"))
        .stdout(predicate::str::contains("810 000 Kč").not());

    // 5. Delete, then delete again fails
    autosalon_cmd(&temp).args(["delete", "3"]).assert().success();
    autosalon_cmd(&temp)
        .args(["delete", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_add_without_image_is_rejected() {
    let temp = TempDir::new().unwrap();
    autosalon_cmd(&temp)
        .args([
            "add", "--name", "Bez fotky", "--brand", "X", "--year", "2020", "--price", "1",
            "--fuel", "hybrid", "--transmission", "automatic",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("image"));
}

#[test]
fn test_corrupt_storage_is_repaired() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("cars.json"), "{ definitely not an array").unwrap();

    autosalon_cmd(&temp)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2020 BMW 3 Series"))
        .stderr(predicate::str::contains("reset to demo cars"));
}

#[test]
fn test_featured_hides_unfeatured_cars() {
    let temp = TempDir::new().unwrap();
    autosalon_cmd(&temp)
        .args(["featured"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2019 Lexus ES 350").not());
}

#[test]
fn test_messages_inbox() {
    let temp = TempDir::new().unwrap();
    autosalon_cmd(&temp)
        .args(["messages", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 unread"))
        .stdout(predicate::str::contains("Jan Novák"));

    autosalon_cmd(&temp)
        .args(["messages", "open", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dotaz na opravu"));

    autosalon_cmd(&temp)
        .args(["messages", "count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 messages, 0 unread"));
}

#[test]
fn test_placeholder_config_file_stays_local() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("autosalon.toml"),
        "provider_url = \"your-supabase-url\"\nprovider_key = \"your-supabase-anon-key\"\n",
    )
    .unwrap();

    autosalon_cmd(&temp)
        .args(["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("local storage"));
}
