pub mod database;
pub mod error;
pub mod memory;
pub mod schema;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::channel::{ChannelType, ProviderId};

pub use database::ProviderDatabase;
pub use error::StorageError;
pub use memory::InMemoryStore;

pub const PROVIDERS_DB_FILENAME: &str = "providers.db";

/// Scope of a message count. Both time bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCountQuery {
    pub environment_id: String,
    pub channel: ChannelType,
    pub provider_id: ProviderId,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

impl MessageCountQuery {
    pub fn matches(&self, record: &MessageRecord) -> bool {
        record.environment_id == self.environment_id
            && record.channel == self.channel
            && record.provider_id == self.provider_id
            && self.period_start <= record.created_at
            && record.created_at <= self.period_end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub organization_id: String,
    pub environment_id: String,
    pub channel: ChannelType,
    pub provider_id: ProviderId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub organization_id: String,
    pub environment_id: String,
    pub channel: ChannelType,
    pub provider_id: ProviderId,
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    pub fn from_new(message: NewMessage, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            organization_id: message.organization_id,
            environment_id: message.environment_id,
            channel: message.channel,
            provider_id: message.provider_id,
            created_at: message.created_at.unwrap_or(now),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIntegration {
    pub organization_id: String,
    pub environment_id: String,
    pub channel: ChannelType,
    pub provider_id: ProviderId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationRecord {
    pub id: String,
    pub organization_id: String,
    pub environment_id: String,
    pub channel: ChannelType,
    pub provider_id: ProviderId,
    pub name: String,
    pub identifier: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IntegrationRecord {
    // Defaults: display name, and `{provider}-{suffix}` as identifier.
    pub fn from_new(integration: NewIntegration, now: DateTime<Utc>) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let identifier = integration
            .identifier
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| format!("{}-{}", integration.provider_id, &id[..6]));
        let name = integration
            .name
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| integration.provider_id.display_name().to_string());

        Self {
            id,
            organization_id: integration.organization_id,
            environment_id: integration.environment_id,
            channel: integration.channel,
            provider_id: integration.provider_id,
            name,
            identifier,
            active: integration.active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active_custom(&self) -> bool {
        self.active && !self.provider_id.is_hosted()
    }
}

pub trait MessageStore: Send + Sync {
    fn count_messages(&self, query: &MessageCountQuery) -> Result<u64, StorageError>;

    fn record_message(&self, message: NewMessage) -> Result<MessageRecord, StorageError>;
}

pub trait IntegrationStore: Send + Sync {
    fn count_active_integrations(
        &self,
        environment_id: &str,
        channel: ChannelType,
    ) -> Result<u64, StorageError>;

    /// Inserts, or updates the record sharing `(environment_id, identifier)`.
    fn upsert_integration(
        &self,
        integration: NewIntegration,
    ) -> Result<IntegrationRecord, StorageError>;

    fn list_integrations(&self, environment_id: &str)
        -> Result<Vec<IntegrationRecord>, StorageError>;

    fn set_integration_active(
        &self,
        integration_id: &str,
        active: bool,
    ) -> Result<IntegrationRecord, StorageError>;
}
