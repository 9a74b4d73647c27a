//! # Contact Message Inbox
//!
//! Messages sent from the site's contact form, read and triaged from the admin
//! panel. Like the inventory, the inbox is backed either by the provider's
//! `contact_messages` table ([`supabase::SupabaseMessages`]) or by a local slot
//! ([`local::LocalMessages`]). The [`Inbox`] facade keeps the loaded list and the
//! unread counter in memory.
//!
//! Only the relational provider has a messages table. With a Firestore provider
//! configured, the inbox stays local.
//!
//! ## Counters
//!
//! Counts are decorations for the admin dashboard: a failing count reads as 0 and
//! never fails the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::config::{AutosalonConfig, Gate, ProviderKind};
use crate::error::Result;
use crate::provider::postgrest::{id_as_string, null_as_default};
use crate::store::fs_backend::FsSlots;

pub mod local;
pub mod supabase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    #[serde(deserialize_with = "required_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub read: bool,
}

/// What the contact form submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

fn required_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    id_as_string(deserializer)?.ok_or_else(|| serde::de::Error::custom("message without id"))
}

#[async_trait]
pub trait MessageProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn submit(&self, message: &NewMessage) -> Result<()>;

    /// All messages, newest first.
    async fn list(&self) -> Result<Vec<ContactMessage>>;

    async fn mark_read(&self, id: &str) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;

    async fn count_total(&self) -> Result<u64>;

    async fn count_unread(&self) -> Result<u64>;
}

#[derive(Default)]
struct InboxState {
    messages: Vec<ContactMessage>,
    unread: u64,
}

pub struct Inbox {
    provider: Arc<dyn MessageProvider>,
    state: Mutex<InboxState>,
}

impl Inbox {
    pub fn new(provider: Arc<dyn MessageProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(InboxState::default()),
        }
    }

    /// Supabase table when the gate picks a Supabase provider, the local slot otherwise.
    pub fn from_config(config: &AutosalonConfig) -> Self {
        let local = || -> Arc<dyn MessageProvider> {
            Arc::new(local::LocalMessages::new(FsSlots::new(config.storage_dir())))
        };
        let provider = match Gate::resolve(config) {
            Gate::Remote(settings) if settings.kind == ProviderKind::Supabase => {
                match supabase::SupabaseMessages::from_settings(&settings) {
                    Ok(p) => Arc::new(p) as Arc<dyn MessageProvider>,
                    Err(e) => {
                        warn!(error = %e, "Provider settings unusable, inbox stays local");
                        local()
                    }
                }
            }
            _ => local(),
        };
        Self::new(provider)
    }

    pub fn backend_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Loads the message list and the unread counter.
    pub async fn load(&self) -> Result<usize> {
        let messages = self.provider.list().await?;
        let unread = self.count_unread().await;
        let count = messages.len();
        info!(count, unread, "Messages loaded");
        let mut state = self.lock();
        state.messages = messages;
        state.unread = unread;
        Ok(count)
    }

    pub fn messages(&self) -> Vec<ContactMessage> {
        self.lock().messages.clone()
    }

    pub fn unread(&self) -> u64 {
        self.lock().unread
    }

    pub fn get(&self, id: &str) -> Option<ContactMessage> {
        self.lock().messages.iter().find(|m| m.id == id).cloned()
    }

    /// Returns the message, marking it read first if it wasn't.
    pub async fn open(&self, id: &str) -> Result<Option<ContactMessage>> {
        let Some(message) = self.get(id) else {
            return Ok(None);
        };
        if message.read {
            return Ok(Some(message));
        }

        self.provider.mark_read(id).await?;
        let mut state = self.lock();
        state.unread = state.unread.saturating_sub(1);
        let opened = state.messages.iter_mut().find(|m| m.id == id).map(|m| {
            m.read = true;
            m.clone()
        });
        Ok(opened)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.provider.delete(id).await?;
        let mut state = self.lock();
        if let Some(pos) = state.messages.iter().position(|m| m.id == id) {
            let removed = state.messages.remove(pos);
            if !removed.read {
                state.unread = state.unread.saturating_sub(1);
            }
        }
        info!(%id, "Message deleted");
        Ok(())
    }

    /// Stores a contact-form submission. It shows up after the next `load`.
    pub async fn submit(&self, message: &NewMessage) -> Result<()> {
        self.provider.submit(message).await?;
        info!(subject = %message.subject, "Message submitted");
        Ok(())
    }

    pub async fn count_total(&self) -> u64 {
        self.provider.count_total().await.unwrap_or_else(|e| {
            warn!(error = %e, "Counting messages failed");
            0
        })
    }

    pub async fn count_unread(&self) -> u64 {
        self.provider.count_unread().await.unwrap_or_else(|e| {
            warn!(error = %e, "Counting unread messages failed");
            0
        })
    }

    fn lock(&self) -> MutexGuard<'_, InboxState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::local_inbox;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_seeds_demo_messages() {
        let (_slots, inbox) = local_inbox();
        assert_eq!(inbox.load().await.unwrap(), 2);
        assert_eq!(inbox.unread(), 1);
        assert_eq!(inbox.messages()[0].name, "Jan Novák");
        assert_eq!(inbox.count_total().await, 2);
    }

    #[tokio::test]
    async fn test_open_marks_read_once() {
        let (_slots, inbox) = local_inbox();
        inbox.load().await.unwrap();

        let opened = inbox.open("1").await.unwrap().unwrap();
        assert!(opened.read);
        assert_eq!(inbox.unread(), 0);

        // Opening again changes nothing.
        inbox.open("1").await.unwrap();
        assert_eq!(inbox.unread(), 0);
        assert_eq!(inbox.count_unread().await, 0);
    }

    #[tokio::test]
    async fn test_open_unknown_is_none() {
        let (_slots, inbox) = local_inbox();
        inbox.load().await.unwrap();
        assert!(inbox.open("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_unread_adjusts_counter() {
        let (_slots, inbox) = local_inbox();
        inbox.load().await.unwrap();

        inbox.delete("1").await.unwrap();
        assert_eq!(inbox.messages().len(), 1);
        assert_eq!(inbox.unread(), 0);
        assert!(inbox.delete("1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_submit_then_reload() {
        let (_slots, inbox) = local_inbox();
        inbox.load().await.unwrap();
        inbox
            .submit(&NewMessage {
                name: "Petr Dvořák".into(),
                email: "petr@example.com".into(),
                phone: None,
                subject: "Servis".into(),
                message: "Kdy máte volný termín?".into(),
            })
            .await
            .unwrap();

        assert_eq!(inbox.load().await.unwrap(), 3);
        assert_eq!(inbox.messages()[0].subject, "Servis");
        assert_eq!(inbox.unread(), 2);
    }

    #[test]
    fn test_message_decodes_numeric_id_and_null_read() {
        let msg: ContactMessage = serde_json::from_value(json!({
            "id": 12,
            "name": "A",
            "email": "a@example.com",
            "phone": null,
            "subject": "S",
            "message": "M",
            "created_at": "2025-03-01T10:00:00.123456+00:00",
            "read": null
        }))
        .unwrap();
        assert_eq!(msg.id, "12");
        assert!(!msg.read);
        assert!(msg.created_at.is_some());
    }

    #[test]
    fn test_message_without_id_is_rejected() {
        let result = serde_json::from_value::<ContactMessage>(json!({
            "name": "A", "email": "e", "subject": "s", "message": "m"
        }));
        assert!(result.is_err());
    }
}
