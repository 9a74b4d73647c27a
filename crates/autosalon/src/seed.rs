//! Demo inventory.
//!
//! Written into the local fallback slot on first run and by an explicit reset.
//! With a remote provider configured it is only served, read-only, when the
//! provider cannot be reached and the local slot holds nothing valid.

use once_cell::sync::Lazy;

use crate::model::{Car, FuelType, Transmission};

pub static SEED_CARS: Lazy<Vec<Car>> = Lazy::new(build_seed);

/// An owned copy of the demo inventory.
pub fn seed_cars() -> Vec<Car> {
    SEED_CARS.clone()
}

#[allow(clippy::too_many_arguments)]
fn seed_car(
    id: &str,
    name: &str,
    brand: &str,
    year: i32,
    price: u64,
    price_formatted: &str,
    mileage: u64,
    fuel: FuelType,
    description: &str,
    image_url: &str,
    featured: bool,
    pinned: bool,
    features: [&str; 3],
) -> Car {
    Car {
        id: id.to_string(),
        name: name.to_string(),
        brand: brand.to_string(),
        year,
        price,
        price_formatted: Some(price_formatted.to_string()),
        mileage,
        fuel,
        transmission: Transmission::Automatic,
        engine_volume: None,
        power: None,
        description: description.to_string(),
        image_url: image_url.to_string(),
        image_urls: None,
        featured,
        pinned,
        features: Some(features.iter().map(|s| s.to_string()).collect()),
    }
}

fn build_seed() -> Vec<Car> {
    vec![
        seed_car(
            "1",
            "2020 BMW 3 Series",
            "BMW",
            2020,
            720000,
            "720 000 Kč",
            72000,
            FuelType::Gasoline,
            "Krásné BMW 3 Series v perfektním stavu s kompletní servisní historií.",
            "https://images.unsplash.com/photo-1555215695-3004980ad54e?w=800&q=80",
            true,
            true,
            ["Automatická", "Kožený Interiér", "Navigace"],
        ),
        seed_car(
            "2",
            "2019 Mercedes C-Class",
            "Mercedes-Benz",
            2019,
            810000,
            "810 000 Kč",
            61000,
            FuelType::Diesel,
            "Luxusní Mercedes C-Class s premium vybavením a nízkou spotřebou.",
            "https://images.unsplash.com/photo-1618843479313-40f8afb4b4d8?w=800&q=80",
            true,
            false,
            ["Premium Zvuk", "Panorama", "Sportovní Paket"],
        ),
        seed_car(
            "3",
            "2021 Audi A4",
            "Audi",
            2021,
            895000,
            "895 000 Kč",
            40000,
            FuelType::Gasoline,
            "Téměř nové Audi A4 s Quattro pohonem a špičkovou technologií.",
            "https://images.unsplash.com/photo-1606664515524-ed2f786a0bd6?w=800&q=80",
            true,
            true,
            ["Quattro AWD", "LED Světla", "Tech Paket"],
        ),
        seed_car(
            "4",
            "2020 Tesla Model 3",
            "Tesla",
            2020,
            950000,
            "950 000 Kč",
            48000,
            FuelType::Electric,
            "Elektromobil budoucnosti s autopilot funkcí a dlouhým dojezdem.",
            "https://images.unsplash.com/photo-1560958089-b8a1929cea89?w=800&q=80",
            true,
            false,
            ["Autopilot", "Premium Interiér", "Long Range"],
        ),
        seed_car(
            "5",
            "2019 Lexus ES 350",
            "Lexus",
            2019,
            735000,
            "735 000 Kč",
            67000,
            FuelType::Gasoline,
            "Japonská kvalita a spolehlivost v luxusním balení.",
            "https://images.unsplash.com/photo-1623869675781-80aa31bcc9e9?w=800&q=80",
            false,
            false,
            ["Luxury Paket", "Vyhřívané Sedačky", "Couvací Kamera"],
        ),
        seed_car(
            "6",
            "2021 Porsche Macan",
            "Porsche",
            2021,
            1295000,
            "1 295 000 Kč",
            29000,
            FuelType::Gasoline,
            "Sportovní SUV s legendárním Porsche DNA a výjimečným výkonem.",
            "https://images.unsplash.com/photo-1611821064430-f1c3f4f7e6c7?w=800&q=80",
            true,
            true,
            ["Sport Chrono", "Premium Audio", "Panoramatická Střecha"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_has_six_unique_ids() {
        let cars = seed_cars();
        assert_eq!(cars.len(), 6);
        let ids: HashSet<&str> = cars.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_seed_cars_are_listable() {
        for car in seed_cars() {
            assert!(car.to_new().validate_for_listing().is_ok(), "{}", car.name);
        }
    }

    #[test]
    fn test_seed_formatted_prices_match_derived() {
        for car in seed_cars() {
            assert_eq!(
                car.price_formatted.as_deref(),
                Some(crate::model::format_price(car.price).as_str())
            );
        }
    }
}
