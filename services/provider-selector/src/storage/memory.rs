use std::sync::Arc;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::channel::ChannelType;

use super::error::StorageError;
use super::{
    IntegrationRecord, IntegrationStore, MessageCountQuery, MessageRecord, MessageStore,
    NewIntegration, NewMessage,
};

#[derive(Clone, Default)]
pub struct InMemoryStore {
    messages: Arc<DashMap<String, Vec<MessageRecord>>>,
    integrations: Arc<DashMap<String, IntegrationRecord>>,
    // (environment_id, identifier) -> integration id
    identifiers: Arc<DashMap<(String, String), String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageStore for InMemoryStore {
    fn count_messages(&self, query: &MessageCountQuery) -> Result<u64, StorageError> {
        let count = self
            .messages
            .get(&query.environment_id)
            .map(|records| records.iter().filter(|record| query.matches(record)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    fn record_message(&self, message: NewMessage) -> Result<MessageRecord, StorageError> {
        let record = MessageRecord::from_new(message, Utc::now());
        self.messages
            .entry(record.environment_id.clone())
            .or_default()
            .push(record.clone());
        Ok(record)
    }
}

impl IntegrationStore for InMemoryStore {
    fn count_active_integrations(
        &self,
        environment_id: &str,
        channel: ChannelType,
    ) -> Result<u64, StorageError> {
        let count = self
            .integrations
            .iter()
            .filter(|entry| {
                let record = entry.value();
                record.environment_id == environment_id
                    && record.channel == channel
                    && record.is_active_custom()
            })
            .count();
        Ok(count as u64)
    }

    fn upsert_integration(
        &self,
        integration: NewIntegration,
    ) -> Result<IntegrationRecord, StorageError> {
        if !integration.provider_id.supports(integration.channel) {
            return Err(StorageError::InvalidRecord(format!(
                "provider {} does not serve the {} channel",
                integration.provider_id, integration.channel
            )));
        }

        let now = Utc::now();
        let candidate = IntegrationRecord::from_new(integration, now);

        let key = (candidate.environment_id.clone(), candidate.identifier.clone());

        // The identifier entry stays locked until the record is written.
        let stored = match self.identifiers.entry(key) {
            Entry::Occupied(slot) => {
                let mut existing = self
                    .integrations
                    .get_mut(slot.get())
                    .ok_or_else(|| StorageError::IntegrationNotFound(slot.get().clone()))?;
                existing.channel = candidate.channel;
                existing.provider_id = candidate.provider_id;
                existing.name = candidate.name;
                existing.active = candidate.active;
                existing.updated_at = now;
                existing.clone()
            }
            Entry::Vacant(slot) => {
                self.integrations
                    .insert(candidate.id.clone(), candidate.clone());
                slot.insert(candidate.id.clone());
                candidate
            }
        };

        Ok(stored)
    }

    fn list_integrations(
        &self,
        environment_id: &str,
    ) -> Result<Vec<IntegrationRecord>, StorageError> {
        let mut integrations: Vec<IntegrationRecord> = self
            .integrations
            .iter()
            .filter(|entry| entry.environment_id == environment_id)
            .map(|entry| entry.value().clone())
            .collect();
        integrations.sort_by_key(|record| record.created_at);
        Ok(integrations)
    }

    fn set_integration_active(
        &self,
        integration_id: &str,
        active: bool,
    ) -> Result<IntegrationRecord, StorageError> {
        let mut record = self
            .integrations
            .get_mut(integration_id)
            .ok_or_else(|| StorageError::IntegrationNotFound(integration_id.to_string()))?;
        record.active = active;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}
