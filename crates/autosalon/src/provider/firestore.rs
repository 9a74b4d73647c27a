//! Document backend: the `cars` collection of a Firestore database, over REST.
//!
//! ## Endpoint
//!
//! The provider URL is the database root,
//! `https://firestore.googleapis.com/v1/projects/<project>/databases/(default)`.
//! The API key travels as the `key` query parameter; a signed-in user's ID token, if
//! configured, as a bearer token so security rules can see `request.auth`.
//!
//! ## Documents
//!
//! A car is stored with the same field names as the local slot (camelCase), each
//! wrapped in a Firestore typed value. Three extra fields ride along:
//!
//! - `createdBy`: uid passed to `create`
//! - `createdAt`: server timestamp, set by a commit transform
//! - `updatedAt`: server timestamp, set on every update
//!
//! All writes go through `documents:commit` so the server timestamps and the
//! existence preconditions are applied atomically with the write.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::http::{build_client, check_status, decode_error, map_reqwest_error};
use super::CarProvider;
use crate::error::{AutosalonError, Result};
use crate::model::{Car, CarPatch, NewCar};

pub const CARS_COLLECTION: &str = "cars";

const CREATED_BY: &str = "createdBy";
const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";
const REQUEST_TIME: &str = "REQUEST_TIME";

/// A Firestore typed value, as it appears in REST payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    NullValue(()),
    BooleanValue(bool),
    /// 64-bit integers are sent as decimal strings.
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(Value),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<FieldValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl FieldValue {
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::NullValue(()),
            Value::Bool(b) => FieldValue::BooleanValue(b),
            Value::Number(n) if n.is_i64() || n.is_u64() => FieldValue::IntegerValue(n.to_string()),
            Value::Number(n) => FieldValue::DoubleValue(n.as_f64().unwrap_or_default()),
            Value::String(s) => FieldValue::StringValue(s),
            Value::Array(items) => FieldValue::ArrayValue(ArrayValue {
                values: items.into_iter().map(FieldValue::from_json).collect(),
            }),
            Value::Object(obj) => FieldValue::MapValue(MapValue {
                fields: obj
                    .into_iter()
                    .map(|(k, v)| (k, FieldValue::from_json(v)))
                    .collect(),
            }),
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            FieldValue::NullValue(()) => Value::Null,
            FieldValue::BooleanValue(b) => Value::Bool(b),
            FieldValue::IntegerValue(s) => match s.parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => Value::String(s),
            },
            FieldValue::DoubleValue(f) => double_to_json(f),
            FieldValue::TimestampValue(s)
            | FieldValue::StringValue(s)
            | FieldValue::BytesValue(s)
            | FieldValue::ReferenceValue(s) => Value::String(s),
            FieldValue::GeoPointValue(v) => v,
            FieldValue::ArrayValue(a) => {
                Value::Array(a.values.into_iter().map(FieldValue::into_json).collect())
            }
            FieldValue::MapValue(m) => Value::Object(
                m.fields
                    .into_iter()
                    .map(|(k, v)| (k, v.into_json()))
                    .collect(),
            ),
        }
    }
}

// Documents edited in the console often hold whole numbers as doubles.
fn double_to_json(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        return Value::from(f as i64);
    }
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Document {
    /// Last path segment of the document name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    pub fn into_car(self) -> Result<Car> {
        let mut obj = Map::new();
        let id = self.id().to_string();
        for (key, value) in self.fields {
            // The document name is the id; a stored "id" field is stale.
            if matches!(key.as_str(), "id" | CREATED_BY | CREATED_AT | UPDATED_AT) {
                continue;
            }
            obj.insert(key, value.into_json());
        }
        obj.insert("id".to_string(), Value::String(id));
        serde_json::from_value(Value::Object(obj))
            .map_err(|e| decode_error(format!("document {}: {}", self.name, e)))
    }

    pub fn created_by(&self) -> Option<&str> {
        match self.fields.get(CREATED_BY) {
            Some(FieldValue::StringValue(uid)) => Some(uid),
            _ => None,
        }
    }
}

/// Typed fields for a serializable value that must be a JSON object.
fn object_fields<T: Serialize>(value: &T) -> Result<BTreeMap<String, FieldValue>> {
    match serde_json::to_value(value).map_err(|e| decode_error(e.to_string()))? {
        Value::Object(obj) => Ok(obj
            .into_iter()
            .map(|(k, v)| (k, FieldValue::from_json(v)))
            .collect()),
        _ => Err(decode_error("expected an object")),
    }
}

pub fn car_fields(car: &NewCar, owner_id: &str) -> Result<BTreeMap<String, FieldValue>> {
    let mut fields = object_fields(car)?;
    fields.insert(
        CREATED_BY.to_string(),
        FieldValue::StringValue(owner_id.to_string()),
    );
    Ok(fields)
}

// Commit payloads

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub writes: Vec<Write>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Write {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<DocumentWrite>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_mask: Option<DocumentMask>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub update_transforms: Vec<FieldTransform>,
    pub current_document: Precondition,
}

#[derive(Debug, Serialize)]
pub struct DocumentWrite {
    pub name: String,
    pub fields: BTreeMap<String, FieldValue>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMask {
    pub field_paths: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTransform {
    pub field_path: String,
    pub set_to_server_value: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Precondition {
    pub exists: bool,
}

fn server_time(field: &str) -> FieldTransform {
    FieldTransform {
        field_path: field.to_string(),
        set_to_server_value: REQUEST_TIME,
    }
}

pub fn create_write(name: String, fields: BTreeMap<String, FieldValue>) -> Write {
    Write {
        update: Some(DocumentWrite { name, fields }),
        delete: None,
        update_mask: None,
        update_transforms: vec![server_time(CREATED_AT)],
        current_document: Precondition { exists: false },
    }
}

pub fn update_write(name: String, patch: &CarPatch) -> Result<Write> {
    let fields = object_fields(patch)?;
    let field_paths = fields.keys().cloned().collect();
    Ok(Write {
        update: Some(DocumentWrite { name, fields }),
        delete: None,
        update_mask: Some(DocumentMask { field_paths }),
        update_transforms: vec![server_time(UPDATED_AT)],
        current_document: Precondition { exists: true },
    })
}

pub fn delete_write(name: String) -> Write {
    Write {
        update: None,
        delete: Some(name),
        update_mask: None,
        update_transforms: Vec::new(),
        current_document: Precondition { exists: true },
    }
}

/// `runQuery` body listing the collection newest first.
pub fn newest_first_query() -> Value {
    serde_json::json!({
        "structuredQuery": {
            "from": [{ "collectionId": CARS_COLLECTION }],
            "orderBy": [{
                "field": { "fieldPath": CREATED_AT },
                "direction": "DESCENDING"
            }]
        }
    })
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<Document>,
}

pub struct FirestoreProvider {
    http: Client,
    base_url: String,
    database_name: String,
    api_key: String,
    access_token: Option<String>,
}

impl FirestoreProvider {
    pub fn new(database_url: &str, api_key: &str) -> Result<Self> {
        let base_url = database_url.trim_end_matches('/').to_string();
        let database_name = base_url
            .find("projects/")
            .map(|i| base_url[i..].to_string())
            .filter(|name| name.contains("/databases/"))
            .ok_or_else(|| {
                AutosalonError::Config(format!(
                    "Firestore URL must point at a database (.../projects/<id>/databases/<db>): {}",
                    database_url
                ))
            })?;
        Ok(Self {
            http: build_client()?,
            base_url,
            database_name,
            api_key: api_key.to_string(),
            access_token: None,
        })
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Fully qualified resource name of a car document.
    pub fn document_name(&self, id: &str) -> String {
        format!(
            "{}/documents/{}/{}",
            self.database_name, CARS_COLLECTION, id
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self
            .http
            .request(method, format!("{}/{}", self.base_url, path))
            .query(&[("key", self.api_key.as_str())]);
        match &self.access_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder, missing: Option<&str>) -> Result<Response> {
        let res = req.send().await.map_err(map_reqwest_error)?;
        check_status(res, missing).await
    }

    async fn commit(&self, write: Write, missing: Option<&str>) -> Result<()> {
        let body = CommitRequest {
            writes: vec![write],
        };
        let req = self.request(Method::POST, "documents:commit").json(&body);
        self.send(req, missing).await?;
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Document> {
        let req = self.request(
            Method::GET,
            &format!("documents/{}/{}", CARS_COLLECTION, id),
        );
        self.send(req, Some(id))
            .await?
            .json()
            .await
            .map_err(|e| decode_error(e.to_string()))
    }
}

#[async_trait]
impl CarProvider for FirestoreProvider {
    fn name(&self) -> &'static str {
        "firestore"
    }

    async fn create(&self, car: &NewCar, owner_id: &str) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        let write = create_write(self.document_name(&id), car_fields(car, owner_id)?);
        self.commit(write, None).await?;
        info!(%id, "Car added to Firestore");
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Car>> {
        let req = self
            .request(Method::POST, "documents:runQuery")
            .json(&newest_first_query());
        let items: Vec<RunQueryItem> = self
            .send(req, None)
            .await?
            .json()
            .await
            .map_err(|e| decode_error(e.to_string()))?;
        let cars = items
            .into_iter()
            .filter_map(|item| item.document)
            .map(Document::into_car)
            .collect::<Result<Vec<_>>>()?;
        info!(count = cars.len(), "Retrieved cars from Firestore");
        Ok(cars)
    }

    async fn update(&self, id: &str, patch: &CarPatch) -> Result<()> {
        let write = update_write(self.document_name(id), patch)?;
        debug!(%id, fields = ?write.update_mask.as_ref().map(|m| &m.field_paths), "Updating car in Firestore");
        self.commit(write, Some(id)).await?;
        info!(%id, "Car updated in Firestore");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.commit(delete_write(self.document_name(id)), Some(id))
            .await?;
        info!(%id, "Car deleted from Firestore");
        Ok(())
    }

    async fn check_ownership(&self, id: &str, user_id: &str) -> bool {
        match self.get_document(id).await {
            Ok(doc) => doc.created_by() == Some(user_id),
            Err(e) => {
                warn!(%id, error = %e, "Ownership check failed");
                false
            }
        }
    }
}
