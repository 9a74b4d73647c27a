//! # Remote Providers
//!
//! A provider is a hosted backend that owns the inventory when the gate resolves to
//! [`Gate::Remote`](crate::config::Gate). The facade only sees the
//! [`CarProvider`] trait; the adapters translate between `Car` and the backend's
//! record shape.
//!
//! - [`firestore::FirestoreProvider`]: document store, collection `cars`, over REST
//! - [`supabase::SupabaseProvider`]: relational table `cars`, over PostgREST
//! - [`memory::MemProvider`]: in-process double for tests and offline demos
//!
//! ## Contract
//!
//! - `create` stores the car with `owner_id` as its creator and a server timestamp,
//!   and returns the backend-assigned id.
//! - `list` returns every car, newest first.
//! - `update` touches only the supplied fields and stamps an update time.
//! - `delete` of an id the backend doesn't have is an error.
//! - `check_ownership` never fails; any problem reads as "not the owner".

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::config::{ProviderKind, ProviderSettings};
use crate::error::Result;
use crate::model::{Car, CarPatch, NewCar};

pub mod firestore;
pub(crate) mod http;
pub mod memory;
pub mod postgrest;
pub mod supabase;

#[async_trait]
pub trait CarProvider: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    async fn create(&self, car: &NewCar, owner_id: &str) -> Result<String>;

    async fn list(&self) -> Result<Vec<Car>>;

    async fn update(&self, id: &str, patch: &CarPatch) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;

    async fn check_ownership(&self, id: &str, user_id: &str) -> bool;
}

/// Builds the adapter the settings describe.
pub fn build_provider(settings: &ProviderSettings) -> Result<Arc<dyn CarProvider>> {
    debug!(kind = %settings.kind, url = %settings.url, "Building car provider");
    let provider: Arc<dyn CarProvider> = match settings.kind {
        ProviderKind::Supabase => {
            let mut client = postgrest::PostgrestClient::new(&settings.url, &settings.key)?;
            if let Some(token) = &settings.access_token {
                client = client.with_access_token(token.clone());
            }
            Arc::new(supabase::SupabaseProvider::new(client))
        }
        ProviderKind::Firestore => {
            let mut provider = firestore::FirestoreProvider::new(&settings.url, &settings.key)?;
            if let Some(token) = &settings.access_token {
                provider = provider.with_access_token(token.clone());
            }
            Arc::new(provider)
        }
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(kind: ProviderKind, url: &str) -> ProviderSettings {
        ProviderSettings {
            kind,
            url: url.to_string(),
            key: "key".to_string(),
            access_token: None,
        }
    }

    #[test]
    fn test_build_supabase() {
        let provider =
            build_provider(&settings(ProviderKind::Supabase, "https://x.supabase.co")).unwrap();
        assert_eq!(provider.name(), "supabase");
    }

    #[test]
    fn test_build_firestore() {
        let provider = build_provider(&settings(
            ProviderKind::Firestore,
            "https://firestore.googleapis.com/v1/projects/demo/databases/(default)",
        ))
        .unwrap();
        assert_eq!(provider.name(), "firestore");
    }

    #[test]
    fn test_firestore_url_must_name_a_database() {
        let result = build_provider(&settings(ProviderKind::Firestore, "https://example.com"));
        assert!(matches!(
            result,
            Err(crate::error::AutosalonError::Config(_))
        ));
    }
}
