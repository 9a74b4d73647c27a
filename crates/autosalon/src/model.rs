//! # Domain Model: Cars
//!
//! [`Car`] is the only persisted entity of the inventory. A car that has not been
//! stored yet is a [`NewCar`]; a partial edit is a [`CarPatch`].
//!
//! ## Field Naming
//!
//! The serialized form uses camelCase (`priceFormatted`, `imageUrl`, ...). This is the
//! shape of the local fallback slot and of Firestore documents. Supabase rows use
//! snake_case and are translated in `provider::supabase`.
//!
//! ## Prices
//!
//! `price` is an integer amount in whole crowns. `price_formatted` is the display
//! string; when a client leaves it empty, [`format_price`] derives one
//! (`720000` → `"720 000 Kč"`).
//!
//! ## Images
//!
//! `image_url` is the primary image. `image_urls` optionally holds a gallery. Use
//! [`Car::images`] to get what a detail view should show.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AutosalonError, Result};

pub const CURRENCY_SUFFIX: &str = "Kč";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Gasoline,
    Diesel,
    Electric,
    Hybrid,
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FuelType::Gasoline => "Gasoline",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
        };
        f.write_str(s)
    }
}

impl FromStr for FuelType {
    type Err = AutosalonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gasoline" | "petrol" => Ok(FuelType::Gasoline),
            "diesel" => Ok(FuelType::Diesel),
            "electric" => Ok(FuelType::Electric),
            "hybrid" => Ok(FuelType::Hybrid),
            other => Err(AutosalonError::Validation(format!(
                "Unknown fuel type: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transmission {
    Automatic,
    Manual,
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transmission::Automatic => f.write_str("Automatic"),
            Transmission::Manual => f.write_str("Manual"),
        }
    }
}

impl FromStr for Transmission {
    type Err = AutosalonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "automatic" | "auto" => Ok(Transmission::Automatic),
            "manual" => Ok(Transmission::Manual),
            other => Err(AutosalonError::Validation(format!(
                "Unknown transmission: {}",
                other
            ))),
        }
    }
}

/// A car listed in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub year: i32,
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_formatted: Option<String>,
    pub mileage: u64,
    pub fuel: FuelType,
    pub transmission: Transmission,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    pub description: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
    pub featured: bool,
    // Older slots predate pinning.
    #[serde(default)]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

/// A car that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCar {
    pub name: String,
    pub brand: String,
    pub year: i32,
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_formatted: Option<String>,
    pub mileage: u64,
    pub fuel: FuelType,
    pub transmission: Transmission,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    pub description: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
    pub featured: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

impl NewCar {
    /// Checks what the admin form enforces before a car may be stored.
    ///
    /// The data layer itself accepts any `NewCar`; clients call this first.
    pub fn validate_for_listing(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AutosalonError::Validation("Name cannot be empty".into()));
        }
        let has_gallery = self
            .image_urls
            .as_ref()
            .is_some_and(|urls| urls.iter().any(|u| !u.trim().is_empty()));
        if self.image_url.trim().is_empty() && !has_gallery {
            return Err(AutosalonError::Validation(
                "At least one image URL is required".into(),
            ));
        }
        Ok(())
    }

    /// Fills `price_formatted` from `price` when the client left it blank.
    pub fn with_derived_price(mut self) -> Self {
        let blank = self
            .price_formatted
            .as_ref()
            .is_none_or(|s| s.trim().is_empty());
        if blank {
            self.price_formatted = Some(format_price(self.price));
        }
        self
    }
}

impl Car {
    pub fn from_new(id: impl Into<String>, car: NewCar) -> Self {
        Self {
            id: id.into(),
            name: car.name,
            brand: car.brand,
            year: car.year,
            price: car.price,
            price_formatted: car.price_formatted,
            mileage: car.mileage,
            fuel: car.fuel,
            transmission: car.transmission,
            engine_volume: car.engine_volume,
            power: car.power,
            description: car.description,
            image_url: car.image_url,
            image_urls: car.image_urls,
            featured: car.featured,
            pinned: car.pinned,
            features: car.features,
        }
    }

    /// Everything but the identifier.
    pub fn to_new(&self) -> NewCar {
        NewCar {
            name: self.name.clone(),
            brand: self.brand.clone(),
            year: self.year,
            price: self.price,
            price_formatted: self.price_formatted.clone(),
            mileage: self.mileage,
            fuel: self.fuel,
            transmission: self.transmission,
            engine_volume: self.engine_volume.clone(),
            power: self.power.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            image_urls: self.image_urls.clone(),
            featured: self.featured,
            pinned: self.pinned,
            features: self.features.clone(),
        }
    }

    pub fn display_price(&self) -> String {
        match &self.price_formatted {
            Some(s) if !s.trim().is_empty() => s.clone(),
            _ => format_price(self.price),
        }
    }

    /// Gallery images, or the primary image when there is no gallery.
    pub fn images(&self) -> Vec<&str> {
        match &self.image_urls {
            Some(urls) if !urls.is_empty() => urls.iter().map(String::as_str).collect(),
            _ => vec![self.image_url.as_str()],
        }
    }

    pub fn feature_tags(&self) -> &[String] {
        self.features.as_deref().unwrap_or(&[])
    }
}

/// A partial update. Only fields that are `Some` change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel: Option<FuelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<Transmission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

impl CarPatch {
    pub fn is_empty(&self) -> bool {
        *self == CarPatch::default()
    }

    /// Merges the supplied fields into `car`.
    pub fn apply_to(&self, car: &mut Car) {
        if let Some(v) = &self.name {
            car.name = v.clone();
        }
        if let Some(v) = &self.brand {
            car.brand = v.clone();
        }
        if let Some(v) = self.year {
            car.year = v;
        }
        if let Some(v) = self.price {
            car.price = v;
        }
        if let Some(v) = &self.price_formatted {
            car.price_formatted = Some(v.clone());
        }
        if let Some(v) = self.mileage {
            car.mileage = v;
        }
        if let Some(v) = self.fuel {
            car.fuel = v;
        }
        if let Some(v) = self.transmission {
            car.transmission = v;
        }
        if let Some(v) = &self.engine_volume {
            car.engine_volume = Some(v.clone());
        }
        if let Some(v) = &self.power {
            car.power = Some(v.clone());
        }
        if let Some(v) = &self.description {
            car.description = v.clone();
        }
        if let Some(v) = &self.image_url {
            car.image_url = v.clone();
        }
        if let Some(v) = &self.image_urls {
            car.image_urls = Some(v.clone());
        }
        if let Some(v) = self.featured {
            car.featured = v;
        }
        if let Some(v) = self.pinned {
            car.pinned = v;
        }
        if let Some(v) = &self.features {
            car.features = Some(v.clone());
        }
    }
}

/// Formats a price the way the dealership displays it: `1295000` → `"1 295 000 Kč"`.
pub fn format_price(price: u64) -> String {
    format!("{} {}", group_digits(price), CURRENCY_SUFFIX)
}

/// Thousands separated by spaces: `45000` → `"45 000"`.
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    grouped
}

/// Featured cars, in collection order.
pub fn featured(cars: &[Car]) -> Vec<Car> {
    cars.iter().filter(|c| c.featured).cloned().collect()
}

/// Pinned cars first; relative order is kept inside both groups.
pub fn pinned_first(cars: &[Car]) -> Vec<Car> {
    let (mut pinned, rest): (Vec<Car>, Vec<Car>) = cars.iter().cloned().partition(|c| c.pinned);
    pinned.extend(rest);
    pinned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_cars;

    #[test]
    fn test_format_price_groups_thousands() {
        assert_eq!(format_price(0), "0 Kč");
        assert_eq!(format_price(999), "999 Kč");
        assert_eq!(format_price(720000), "720 000 Kč");
        assert_eq!(format_price(1295000), "1 295 000 Kč");
        assert_eq!(format_price(12345), "12 345 Kč");
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(45000), "45 000");
        assert_eq!(group_digits(1295000), "1 295 000");
    }

    #[test]
    fn test_display_price_prefers_formatted() {
        let mut car = seed_cars()[0].clone();
        assert_eq!(car.display_price(), "720 000 Kč");

        car.price_formatted = Some("Na dotaz".to_string());
        assert_eq!(car.display_price(), "Na dotaz");

        car.price_formatted = Some("  ".to_string());
        assert_eq!(car.display_price(), "720 000 Kč");
    }

    #[test]
    fn test_images_fall_back_to_primary() {
        let mut car = seed_cars()[0].clone();
        assert_eq!(car.images(), vec![car.image_url.as_str()]);

        car.image_urls = Some(vec![]);
        assert_eq!(car.images().len(), 1);

        car.image_urls = Some(vec!["a.jpg".into(), "b.jpg".into()]);
        assert_eq!(car.images(), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_patch_only_touches_supplied_fields() {
        let original = seed_cars()[1].clone();
        let mut car = original.clone();
        let patch = CarPatch {
            price: Some(700000),
            ..Default::default()
        };
        patch.apply_to(&mut car);

        assert_eq!(car.price, 700000);
        let mut expected = original;
        expected.price = 700000;
        assert_eq!(car, expected);
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let patch = CarPatch::default();
        assert!(patch.is_empty());
        let mut car = seed_cars()[2].clone();
        let before = car.clone();
        patch.apply_to(&mut car);
        assert_eq!(car, before);
    }

    #[test]
    fn test_new_car_roundtrip_through_car() {
        let car = seed_cars()[3].clone();
        let rebuilt = Car::from_new(car.id.clone(), car.to_new());
        assert_eq!(rebuilt, car);
    }

    #[test]
    fn test_validate_requires_image() {
        let mut new = seed_cars()[0].to_new();
        assert!(new.validate_for_listing().is_ok());

        new.image_url = String::new();
        assert!(matches!(
            new.validate_for_listing(),
            Err(AutosalonError::Validation(_))
        ));

        new.image_urls = Some(vec!["http://x/2.jpg".into()]);
        assert!(new.validate_for_listing().is_ok());
    }

    #[test]
    fn test_with_derived_price() {
        let mut new = seed_cars()[5].to_new();
        new.price_formatted = None;
        assert_eq!(
            new.with_derived_price().price_formatted.as_deref(),
            Some("1 295 000 Kč")
        );
    }

    #[test]
    fn test_pinned_first_is_stable() {
        let cars = seed_cars();
        let ordered = pinned_first(&cars);
        let ids: Vec<&str> = ordered.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "6", "2", "4", "5"]);
    }

    #[test]
    fn test_featured_filter() {
        let cars = seed_cars();
        let featured_ids: Vec<String> = featured(&cars).into_iter().map(|c| c.id).collect();
        assert_eq!(featured_ids, vec!["1", "2", "3", "4", "6"]);
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("diesel".parse::<FuelType>().unwrap(), FuelType::Diesel);
        assert_eq!(" Hybrid ".parse::<FuelType>().unwrap(), FuelType::Hybrid);
        assert!("steam".parse::<FuelType>().is_err());
        assert_eq!(
            "MANUAL".parse::<Transmission>().unwrap(),
            Transmission::Manual
        );
    }

    #[test]
    fn test_serialized_field_names_are_camel_case() {
        let car = seed_cars()[0].clone();
        let value = serde_json::to_value(&car).unwrap();
        assert!(value.get("imageUrl").is_some());
        assert!(value.get("priceFormatted").is_some());
        assert!(value.get("image_url").is_none());
        // Absent optionals are omitted, not null.
        assert!(value.get("engineVolume").is_none());
    }
}
