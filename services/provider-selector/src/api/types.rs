use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::channel::{ChannelType, ProviderId};
use crate::selector::ChannelStatus;
use crate::storage::{IntegrationRecord, MessageRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectProviderRequest {
    pub organization_id: String,
    pub environment_id: String,
    pub channel: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectProviderResponse {
    pub provider_id: Option<ProviderId>,
    pub delivery_provider_id: Option<ProviderId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackQuery {
    pub channel: String,
    pub provider_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackResponse {
    pub channel: ChannelType,
    pub provider_id: ProviderId,
    pub fallback_provider_id: ProviderId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSummary {
    pub provider_id: ProviderId,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelCatalog {
    pub channel: ChannelType,
    pub step_name: String,
    pub providers: Vec<ProviderSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub channels: Vec<ChannelCatalog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageResponse {
    pub environment_id: String,
    pub channels: Vec<ChannelStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMessageRequest {
    pub organization_id: String,
    pub environment_id: String,
    pub channel: String,
    pub provider_id: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMessageResponse {
    pub message: MessageRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntegrationRequest {
    pub organization_id: String,
    pub environment_id: String,
    pub channel: String,
    pub provider_id: String,
    pub name: Option<String>,
    pub identifier: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationResponse {
    pub integration: IntegrationRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListIntegrationsResponse {
    pub integrations: Vec<IntegrationRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub details: Option<serde_json::Value>,
}
