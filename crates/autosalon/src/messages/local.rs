use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::{ContactMessage, MessageProvider, NewMessage};
use crate::error::{AutosalonError, Result, StorageError};
use crate::store::backend::SlotBackend;

/// Slot holding the inbox when no relational provider is configured.
pub const MESSAGES_KEY: &str = "contact_messages";

/// Two demo messages, one unread.
pub fn demo_messages() -> Vec<ContactMessage> {
    let now = Utc::now();
    vec![
        ContactMessage {
            id: "1".to_string(),
            name: "Jan Novák".to_string(),
            email: "jan@example.com".to_string(),
            phone: Some("+420 123 456 789".to_string()),
            subject: "Dotaz na opravu".to_string(),
            message: "Dobrý den, potřebuji opravit brzdy na mém BMW. Můžete mi prosím sdělit cenu?"
                .to_string(),
            created_at: Some(now),
            read: false,
        },
        ContactMessage {
            id: "2".to_string(),
            name: "Marie Svobodová".to_string(),
            email: "marie@example.com".to_string(),
            phone: None,
            subject: "Prodej vozidla".to_string(),
            message: "Máte nějaké vozy v ceně do 200 000 Kč?".to_string(),
            created_at: Some(now - Duration::days(1)),
            read: true,
        },
    ]
}

/// Inbox kept in a local slot, seeded with [`demo_messages`] on first read.
pub struct LocalMessages<B: SlotBackend> {
    backend: B,
}

impl<B: SlotBackend> LocalMessages<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    fn read_all(&self) -> Result<Vec<ContactMessage>> {
        if let Some(raw) = self.backend.read(MESSAGES_KEY)? {
            match serde_json::from_str(&raw) {
                Ok(messages) => return Ok(messages),
                Err(e) => warn!(error = %e, "Local inbox is corrupt, resetting to demo messages"),
            }
        }
        let messages = demo_messages();
        self.write_all(&messages)?;
        info!("Seeded local inbox with demo messages");
        Ok(messages)
    }

    fn write_all(&self, messages: &[ContactMessage]) -> Result<()> {
        let content =
            serde_json::to_string(messages).map_err(|e| AutosalonError::Storage(e.into()))?;
        self.backend.write(MESSAGES_KEY, &content)
    }
}

fn not_found(id: &str) -> AutosalonError {
    AutosalonError::Storage(StorageError::NotFound(id.to_string()))
}

#[async_trait]
impl<B: SlotBackend> MessageProvider for LocalMessages<B> {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn submit(&self, message: &NewMessage) -> Result<()> {
        let mut messages = self.read_all()?;
        messages.push(ContactMessage {
            id: Uuid::new_v4().to_string(),
            name: message.name.clone(),
            email: message.email.clone(),
            phone: message.phone.clone(),
            subject: message.subject.clone(),
            message: message.message.clone(),
            created_at: Some(Utc::now()),
            read: false,
        });
        self.write_all(&messages)
    }

    async fn list(&self) -> Result<Vec<ContactMessage>> {
        let mut messages = self.read_all()?;
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    async fn mark_read(&self, id: &str) -> Result<()> {
        let mut messages = self.read_all()?;
        let message = messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| not_found(id))?;
        message.read = true;
        self.write_all(&messages)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut messages = self.read_all()?;
        let before = messages.len();
        messages.retain(|m| m.id != id);
        if messages.len() == before {
            return Err(not_found(id));
        }
        self.write_all(&messages)
    }

    async fn count_total(&self) -> Result<u64> {
        Ok(self.read_all()?.len() as u64)
    }

    async fn count_unread(&self) -> Result<u64> {
        Ok(self.read_all()?.iter().filter(|m| !m.read).count() as u64)
    }
}
