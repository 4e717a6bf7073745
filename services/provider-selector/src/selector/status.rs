use serde::{Deserialize, Serialize};

use crate::channel::{ChannelType, ProviderId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStatus {
    pub channel: ChannelType,
    pub has_active_integration: bool,
    pub hosted_provider_id: Option<ProviderId>,
    pub hosted_usage: u64,
    pub hosted_limit: Option<u64>,
    pub hosted_remaining: u64,
    pub hosted_available: bool,
    pub credentials_configured: bool,
    pub period: String,
    pub warning: Option<String>,
}

impl ChannelStatus {
    pub fn is_deliverable(&self) -> bool {
        self.has_active_integration || (self.hosted_available && self.credentials_configured)
    }
}

pub fn missing_integration_warning(channel: ChannelType) -> String {
    format!(
        "Looks like you haven't configured your {} provider yet, this channel will be disabled until you configure it.",
        channel.step_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(hosted_available: bool, credentials_configured: bool) -> ChannelStatus {
        ChannelStatus {
            channel: ChannelType::Sms,
            has_active_integration: false,
            hosted_provider_id: Some(ProviderId::NovuSms),
            hosted_usage: 5,
            hosted_limit: Some(20),
            hosted_remaining: 15,
            hosted_available,
            credentials_configured,
            period: "2024-01".into(),
            warning: None,
        }
    }

    #[test]
    fn hosted_delivery_needs_capacity_and_credentials() {
        assert!(status(true, true).is_deliverable());
        assert!(!status(true, false).is_deliverable());
        assert!(!status(false, true).is_deliverable());

        let own = ChannelStatus {
            has_active_integration: true,
            ..status(false, false)
        };
        assert!(own.is_deliverable());
    }

    #[test]
    fn warning_names_channel_step() {
        assert_eq!(
            missing_integration_warning(ChannelType::InApp),
            "Looks like you haven't configured your In-App provider yet, this channel will be disabled until you configure it."
        );
        assert!(missing_integration_warning(ChannelType::Sms).contains("your SMS provider"));
    }
}
