//! Relational backend: the `cars` table of a Supabase project, over PostgREST.
//!
//! ## Column Mapping
//!
//! Rows use snake_case columns. Every `Car` field maps one-to-one; see
//! [`COLUMN_MAP`]. Besides the car fields the table carries `created_at`
//! (server default), `created_by` (owner uid) and `updated_at`.
//!
//! ## Not Found
//!
//! PostgREST answers an `UPDATE`/`DELETE` that matched nothing with an empty
//! result, not an error. Writes ask for the affected rows back and treat an
//! empty list as `NotFound`.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::http::decode_error;
use super::postgrest::{eq, id_as_string, null_as_default, PostgrestClient, RETURN_REPRESENTATION};
use super::CarProvider;
use crate::error::{AutosalonError, ProviderError, Result};
use crate::model::{Car, CarPatch, FuelType, NewCar, Transmission};

pub const CARS_TABLE: &str = "cars";

/// Application field name → table column, for every field that differs.
pub const COLUMN_MAP: &[(&str, &str)] = &[
    ("priceFormatted", "price_formatted"),
    ("engineVolume", "engine_volume"),
    ("imageUrl", "image_url"),
    ("imageUrls", "image_urls"),
];

pub fn column_for(field: &str) -> &str {
    COLUMN_MAP
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, c)| *c)
        .unwrap_or(field)
}

/// One row of the `cars` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarRow {
    #[serde(
        default,
        deserialize_with = "id_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub name: String,
    pub brand: String,
    pub year: i32,
    pub price: u64,
    #[serde(default)]
    pub price_formatted: Option<String>,
    pub mileage: u64,
    pub fuel: FuelType,
    pub transmission: Transmission,
    #[serde(default)]
    pub engine_volume: Option<String>,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pinned: bool,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    // Server-managed
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
}

impl CarRow {
    pub fn from_new(car: &NewCar, owner_id: Option<&str>) -> Self {
        Self {
            id: None,
            name: car.name.clone(),
            brand: car.brand.clone(),
            year: car.year,
            price: car.price,
            price_formatted: car.price_formatted.clone(),
            mileage: car.mileage,
            fuel: car.fuel,
            transmission: car.transmission,
            engine_volume: car.engine_volume.clone(),
            power: car.power.clone(),
            description: car.description.clone(),
            image_url: car.image_url.clone(),
            image_urls: car.image_urls.clone(),
            featured: car.featured,
            pinned: car.pinned,
            features: car.features.clone(),
            created_by: owner_id.map(str::to_string),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn from_car(car: &Car) -> Self {
        let mut row = Self::from_new(&car.to_new(), None);
        row.id = Some(car.id.clone());
        row
    }

    pub fn into_car(self) -> Result<Car> {
        let id = self
            .id
            .ok_or_else(|| decode_error("row without id"))?;
        Ok(Car {
            id,
            name: self.name,
            brand: self.brand,
            year: self.year,
            price: self.price,
            price_formatted: self.price_formatted,
            mileage: self.mileage,
            fuel: self.fuel,
            transmission: self.transmission,
            engine_volume: self.engine_volume,
            power: self.power,
            description: self.description,
            image_url: self.image_url,
            image_urls: self.image_urls,
            featured: self.featured,
            pinned: self.pinned,
            features: self.features,
        })
    }
}

/// Column/value pairs for a partial update, plus `updated_at`.
pub fn patch_to_columns(patch: &CarPatch, updated_at: DateTime<Utc>) -> Result<Map<String, Value>> {
    let value = serde_json::to_value(patch).map_err(|e| decode_error(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(decode_error("patch did not serialize to an object"));
    };
    let mut columns: Map<String, Value> = fields
        .into_iter()
        .map(|(field, v)| (column_for(&field).to_string(), v))
        .collect();
    columns.insert(
        "updated_at".to_string(),
        Value::String(updated_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    Ok(columns)
}

#[derive(Deserialize)]
struct IdRow {
    #[serde(deserialize_with = "id_as_string")]
    id: Option<String>,
}

#[derive(Deserialize)]
struct OwnerRow {
    #[serde(default)]
    created_by: Option<String>,
}

pub struct SupabaseProvider {
    client: PostgrestClient,
}

impl SupabaseProvider {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    async fn owner_of(&self, id: &str) -> Result<Option<String>> {
        let req = self
            .client
            .request(Method::GET, CARS_TABLE)
            .query(&[("select", "created_by".to_string()), ("id", eq(id))]);
        let rows: Vec<OwnerRow> = self
            .client
            .send(req, Some(id))
            .await?
            .json()
            .await
            .map_err(|e| decode_error(e.to_string()))?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AutosalonError::Provider(ProviderError::NotFound(id.to_string())))?;
        Ok(row.created_by)
    }
}

#[async_trait]
impl CarProvider for SupabaseProvider {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn create(&self, car: &NewCar, owner_id: &str) -> Result<String> {
        let row = CarRow::from_new(car, Some(owner_id));
        let req = self
            .client
            .request(Method::POST, CARS_TABLE)
            .query(&[("select", "id")])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&row);
        let rows: Vec<IdRow> = self
            .client
            .send(req, None)
            .await?
            .json()
            .await
            .map_err(|e| decode_error(e.to_string()))?;
        let id = rows
            .into_iter()
            .next()
            .and_then(|r| r.id)
            .ok_or_else(|| decode_error("insert returned no id"))?;
        info!(%id, "Car added to Supabase");
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Car>> {
        let req = self
            .client
            .request(Method::GET, CARS_TABLE)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let rows: Vec<CarRow> = self
            .client
            .send(req, None)
            .await?
            .json()
            .await
            .map_err(|e| decode_error(e.to_string()))?;
        let cars = rows
            .into_iter()
            .map(CarRow::into_car)
            .collect::<Result<Vec<_>>>()?;
        info!(count = cars.len(), "Retrieved cars from Supabase");
        Ok(cars)
    }

    async fn update(&self, id: &str, patch: &CarPatch) -> Result<()> {
        let columns = patch_to_columns(patch, Utc::now())?;
        debug!(%id, columns = columns.len(), "Updating car in Supabase");
        let req = self
            .client
            .request(Method::PATCH, CARS_TABLE)
            .query(&[("id", eq(id)), ("select", "id".to_string())])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&columns);
        let rows: Vec<IdRow> = self
            .client
            .send(req, Some(id))
            .await?
            .json()
            .await
            .map_err(|e| decode_error(e.to_string()))?;
        if rows.is_empty() {
            return Err(AutosalonError::Provider(ProviderError::NotFound(id.to_string())));
        }
        info!(%id, "Car updated in Supabase");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let req = self
            .client
            .request(Method::DELETE, CARS_TABLE)
            .query(&[("id", eq(id)), ("select", "id".to_string())])
            .header("Prefer", RETURN_REPRESENTATION);
        let rows: Vec<IdRow> = self
            .client
            .send(req, Some(id))
            .await?
            .json()
            .await
            .map_err(|e| decode_error(e.to_string()))?;
        if rows.is_empty() {
            return Err(AutosalonError::Provider(ProviderError::NotFound(id.to_string())));
        }
        info!(%id, "Car deleted from Supabase");
        Ok(())
    }

    async fn check_ownership(&self, id: &str, user_id: &str) -> bool {
        match self.owner_of(id).await {
            Ok(owner) => owner.as_deref() == Some(user_id),
            Err(e) => {
                warn!(%id, error = %e, "Ownership check failed");
                false
            }
        }
    }
}
