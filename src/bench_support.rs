use std::sync::Arc;

use anyhow::{anyhow, Result};
use hosted_provider_selector::channel::ChannelType;
use hosted_provider_selector::selector::{
    HostedCredentials, LimitPolicy, ProviderSelector, SelectProviderCommand,
};
use hosted_provider_selector::storage::{MessageStore, NewMessage, ProviderDatabase};
use tempfile::TempDir;

pub struct SelectionBenchFixture {
    pub selector: Arc<ProviderSelector>,
    pub database: Arc<ProviderDatabase>,
    pub environment_id: String,
    pub temp_dir: TempDir,
}

impl SelectionBenchFixture {
    /// Seeds `prior_messages` hosted sends on `channel` in the current month.
    pub fn new(environment_id: &str, channel: ChannelType, prior_messages: u64) -> Result<Self> {
        let provider_id = channel
            .hosted_provider()
            .ok_or_else(|| anyhow!("{channel} has no hosted provider"))?;
        let temp_dir = TempDir::new()?;
        let database = Arc::new(ProviderDatabase::new(temp_dir.path().to_path_buf())?);

        for _ in 0..prior_messages {
            database.record_message(NewMessage {
                organization_id: "bench-org".to_string(),
                environment_id: environment_id.to_string(),
                channel,
                provider_id,
                created_at: None,
            })?;
        }

        let selector = ProviderSelector::with_store(
            Arc::clone(&database),
            LimitPolicy::new(u64::MAX, u64::MAX),
            bench_credentials(),
        );

        Ok(Self {
            selector: Arc::new(selector),
            database,
            environment_id: environment_id.to_string(),
            temp_dir,
        })
    }

    pub fn command(&self, channel: ChannelType) -> SelectProviderCommand {
        SelectProviderCommand {
            organization_id: "bench-org".to_string(),
            environment_id: self.environment_id.clone(),
            channel,
            user_id: "bench-user".to_string(),
        }
    }
}

pub fn bench_credentials() -> HostedCredentials {
    HostedCredentials {
        email_api_key: Some("bench-key".to_string()),
        sms_account_sid: Some("bench-sid".to_string()),
        sms_token: Some("bench-token".to_string()),
        sms_sender: Some("1234567890".to_string()),
    }
}
