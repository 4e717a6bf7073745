pub mod api;
pub mod channel;
pub mod config;
pub mod selector;
pub mod storage;

pub use api::{create_router, ApiState, ErrorResponse, SelectProviderRequest, SelectProviderResponse};
pub use channel::{ChannelType, ProviderId};
pub use config::{ProviderHubConfig, StorageBackend};
pub use selector::{
    map_fallback_provider, ChannelStatus, HostedCredentials, HostedIntegration, LimitPolicy,
    MonthWindow, ProviderSelector, SelectProviderCommand, SelectionError,
};
pub use storage::{InMemoryStore, IntegrationStore, MessageStore, ProviderDatabase, StorageError};
