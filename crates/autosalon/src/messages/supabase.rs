use async_trait::async_trait;
use reqwest::Method;
use tracing::info;

use super::{ContactMessage, MessageProvider, NewMessage};
use crate::config::ProviderSettings;
use crate::error::{AutosalonError, ProviderError, Result};
use crate::provider::http::decode_error;
use crate::provider::postgrest::{eq, PostgrestClient, RETURN_REPRESENTATION};

pub const MESSAGES_TABLE: &str = "contact_messages";

pub struct SupabaseMessages {
    client: PostgrestClient,
}

impl SupabaseMessages {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        let mut client = PostgrestClient::new(&settings.url, &settings.key)?;
        if let Some(token) = &settings.access_token {
            client = client.with_access_token(token.clone());
        }
        Ok(Self::new(client))
    }

    /// Runs a filtered write and fails with `NotFound` when no row matched.
    async fn write_one(&self, req: reqwest::RequestBuilder, id: &str) -> Result<()> {
        let rows: Vec<serde_json::Value> = self
            .client
            .send(req.header("Prefer", RETURN_REPRESENTATION), Some(id))
            .await?
            .json()
            .await
            .map_err(|e| decode_error(e.to_string()))?;
        if rows.is_empty() {
            return Err(AutosalonError::Provider(ProviderError::NotFound(id.to_string())));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageProvider for SupabaseMessages {
    fn name(&self) -> &'static str {
        "supabase"
    }

    // Row-level security lets anonymous visitors insert but not read back, so the
    // insert asks for nothing in return.
    async fn submit(&self, message: &NewMessage) -> Result<()> {
        let req = self
            .client
            .request(Method::POST, MESSAGES_TABLE)
            .json(&[message]);
        self.client.send(req, None).await?;
        info!("Message added to Supabase");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ContactMessage>> {
        let req = self
            .client
            .request(Method::GET, MESSAGES_TABLE)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let messages: Vec<ContactMessage> = self
            .client
            .send(req, None)
            .await?
            .json()
            .await
            .map_err(|e| decode_error(e.to_string()))?;
        info!(count = messages.len(), "Retrieved messages from Supabase");
        Ok(messages)
    }

    async fn mark_read(&self, id: &str) -> Result<()> {
        let req = self
            .client
            .request(Method::PATCH, MESSAGES_TABLE)
            .query(&[("id", eq(id)), ("select", "id".to_string())])
            .json(&serde_json::json!({ "read": true }));
        self.write_one(req, id).await?;
        info!(%id, "Message marked as read");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let req = self
            .client
            .request(Method::DELETE, MESSAGES_TABLE)
            .query(&[("id", eq(id)), ("select", "id".to_string())]);
        self.write_one(req, id).await?;
        info!(%id, "Message deleted from Supabase");
        Ok(())
    }

    async fn count_total(&self) -> Result<u64> {
        self.client.count(MESSAGES_TABLE, &[]).await
    }

    async fn count_unread(&self) -> Result<u64> {
        self.client
            .count(MESSAGES_TABLE, &[("read", "eq.false")])
            .await
    }
}
