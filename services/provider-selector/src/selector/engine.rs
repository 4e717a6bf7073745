use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info_span, warn};

use crate::channel::{ChannelType, ProviderId, CHANNELS_ORDER};
use crate::storage::{IntegrationStore, MessageCountQuery, MessageStore, StorageError};

use super::error::SelectionError;
use super::hosted::{HostedCredentials, HostedIntegration};
use super::limits::{LimitPolicy, MonthWindow};
use super::status::{missing_integration_warning, ChannelStatus};

#[derive(Debug, Clone)]
pub struct SelectProviderCommand {
    pub organization_id: String,
    pub environment_id: String,
    pub channel: ChannelType,
    pub user_id: String,
}

/// Decides whether an environment sends through the hosted provider.
///
/// Each decision is a single read of the stores followed by a comparison, so
/// concurrent callers for the same scope can both pass the limit check.
#[derive(Clone)]
pub struct ProviderSelector {
    messages: Arc<dyn MessageStore>,
    integrations: Arc<dyn IntegrationStore>,
    policy: LimitPolicy,
    credentials: HostedCredentials,
}

impl ProviderSelector {
    pub fn new(
        messages: Arc<dyn MessageStore>,
        integrations: Arc<dyn IntegrationStore>,
        policy: LimitPolicy,
        credentials: HostedCredentials,
    ) -> Self {
        Self {
            messages,
            integrations,
            policy,
            credentials,
        }
    }

    pub fn with_store<S>(store: Arc<S>, policy: LimitPolicy, credentials: HostedCredentials) -> Self
    where
        S: MessageStore + IntegrationStore + 'static,
    {
        let messages: Arc<dyn MessageStore> = store.clone();
        let integrations: Arc<dyn IntegrationStore> = store;
        Self::new(messages, integrations, policy, credentials)
    }

    pub fn policy(&self) -> &LimitPolicy {
        &self.policy
    }

    pub fn messages(&self) -> &Arc<dyn MessageStore> {
        &self.messages
    }

    pub fn integrations(&self) -> &Arc<dyn IntegrationStore> {
        &self.integrations
    }

    pub fn select(
        &self,
        command: &SelectProviderCommand,
    ) -> Result<Option<ProviderId>, SelectionError> {
        self.select_at(command, Utc::now())
    }

    pub fn select_at(
        &self,
        command: &SelectProviderCommand,
        now: DateTime<Utc>,
    ) -> Result<Option<ProviderId>, SelectionError> {
        let span = info_span!(
            "select_provider",
            organization_id = %command.organization_id,
            environment_id = %command.environment_id,
            channel = %command.channel,
            user_id = %command.user_id,
        );
        let _guard = span.enter();

        let channel = command.channel;
        let active = self
            .integrations
            .count_active_integrations(&command.environment_id, channel)?;
        if active > 0 {
            debug!(active, "environment has its own integration");
            return Ok(None);
        }

        let (Some(hosted), Some(limit)) = (channel.hosted_provider(), self.policy.threshold(channel))
        else {
            debug!("channel has no hosted provider");
            return Ok(None);
        };

        let current = self.hosted_usage(&command.environment_id, channel, now)?;
        if self.policy.is_under_limit(channel, current) {
            debug!(current, limit, provider_id = %hosted, "hosted provider selected");
            return Ok(Some(hosted));
        }

        warn!(current, limit, "hosted provider limit reached");
        Err(SelectionError::LimitExceeded {
            channel,
            limit,
            current,
        })
    }

    pub fn resolve(
        &self,
        command: &SelectProviderCommand,
    ) -> Result<Option<HostedIntegration>, SelectionError> {
        self.resolve_at(command, Utc::now())
    }

    pub fn resolve_at(
        &self,
        command: &SelectProviderCommand,
        now: DateTime<Utc>,
    ) -> Result<Option<HostedIntegration>, SelectionError> {
        match self.select_at(command, now)? {
            Some(_) => self.hosted_integration(command.channel).map(Some),
            None => Ok(None),
        }
    }

    pub fn hosted_integration(
        &self,
        channel: ChannelType,
    ) -> Result<HostedIntegration, SelectionError> {
        let provider_id = channel
            .hosted_provider()
            .ok_or(SelectionError::HostedUnavailable(channel))?;
        let credentials = self
            .credentials
            .for_channel(channel)
            .ok_or(SelectionError::HostedUnavailable(channel))?;

        Ok(HostedIntegration {
            channel,
            provider_id,
            delivery_provider_id: map_fallback_provider(channel, provider_id),
            credentials,
        })
    }

    pub fn hosted_usage(
        &self,
        environment_id: &str,
        channel: ChannelType,
        now: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        let Some(provider_id) = channel.hosted_provider() else {
            return Ok(0);
        };
        let window = MonthWindow::containing(now);

        self.messages.count_messages(&MessageCountQuery {
            environment_id: environment_id.to_string(),
            channel,
            provider_id,
            period_start: window.start,
            period_end: window.end,
        })
    }

    pub fn channel_status(
        &self,
        environment_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ChannelStatus>, SelectionError> {
        let period = MonthWindow::containing(now).period_label();
        let mut statuses = Vec::with_capacity(CHANNELS_ORDER.len());

        for channel in CHANNELS_ORDER {
            let has_active_integration = self
                .integrations
                .count_active_integrations(environment_id, channel)?
                > 0;
            let hosted_usage = self.hosted_usage(environment_id, channel, now)?;

            // Same predicate `select_at` applies; credentials are reported apart.
            let mut status = ChannelStatus {
                channel,
                has_active_integration,
                hosted_provider_id: channel.hosted_provider(),
                hosted_usage,
                hosted_limit: self.policy.threshold(channel),
                hosted_remaining: self.policy.remaining(channel, hosted_usage),
                hosted_available: self.policy.is_under_limit(channel, hosted_usage),
                credentials_configured: self.credentials.is_configured(channel),
                period: period.clone(),
                warning: None,
            };
            if !status.is_deliverable() {
                status.warning = Some(missing_integration_warning(channel));
            }

            statuses.push(status);
        }

        Ok(statuses)
    }
}

pub fn map_fallback_provider(channel: ChannelType, provider_id: ProviderId) -> ProviderId {
    match (channel, provider_id) {
        (ChannelType::Email, ProviderId::NovuEmail | ProviderId::NovuSms) => ProviderId::SendGrid,
        (ChannelType::Sms, ProviderId::NovuEmail | ProviderId::NovuSms) => ProviderId::Twilio,
        (_, other) => other,
    }
}
