use std::fmt;

use serde::Serialize;

use crate::channel::{ChannelType, ProviderId};

#[derive(Clone, Default, PartialEq, Eq)]
pub struct HostedCredentials {
    pub email_api_key: Option<String>,
    pub sms_account_sid: Option<String>,
    pub sms_token: Option<String>,
    pub sms_sender: Option<String>,
}

// Secrets stay out of logs.
impl fmt::Debug for HostedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedCredentials")
            .field("email_configured", &self.is_configured(ChannelType::Email))
            .field("sms_configured", &self.is_configured(ChannelType::Sms))
            .finish()
    }
}

impl HostedCredentials {
    pub fn is_configured(&self, channel: ChannelType) -> bool {
        match channel {
            ChannelType::Email => present(&self.email_api_key),
            ChannelType::Sms => {
                present(&self.sms_account_sid) && present(&self.sms_token) && present(&self.sms_sender)
            }
            ChannelType::Chat | ChannelType::Push | ChannelType::InApp => false,
        }
    }

    pub fn for_channel(&self, channel: ChannelType) -> Option<ChannelCredentials> {
        if !self.is_configured(channel) {
            return None;
        }
        match channel {
            ChannelType::Email => Some(ChannelCredentials::Email {
                api_key: self.email_api_key.clone().unwrap_or_default(),
            }),
            ChannelType::Sms => Some(ChannelCredentials::Sms {
                account_sid: self.sms_account_sid.clone().unwrap_or_default(),
                token: self.sms_token.clone().unwrap_or_default(),
                from: self.sms_sender.clone().unwrap_or_default(),
            }),
            _ => None,
        }
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

#[derive(Clone, PartialEq, Eq)]
pub enum ChannelCredentials {
    Email {
        api_key: String,
    },
    Sms {
        account_sid: String,
        token: String,
        from: String,
    },
}

impl fmt::Debug for ChannelCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelCredentials::Email { .. } => f.write_str("ChannelCredentials::Email(..)"),
            ChannelCredentials::Sms { from, .. } => f
                .debug_struct("ChannelCredentials::Sms")
                .field("from", from)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostedIntegration {
    pub channel: ChannelType,
    pub provider_id: ProviderId,
    pub delivery_provider_id: ProviderId,
    #[serde(skip)]
    pub credentials: ChannelCredentials,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sms_requires_every_field() {
        let mut creds = HostedCredentials {
            email_api_key: Some("key".into()),
            sms_account_sid: Some("sid".into()),
            sms_token: Some("token".into()),
            sms_sender: None,
        };
        assert!(creds.is_configured(ChannelType::Email));
        assert!(!creds.is_configured(ChannelType::Sms));

        creds.sms_sender = Some("1234567890".into());
        assert!(creds.is_configured(ChannelType::Sms));
        assert_eq!(
            creds.for_channel(ChannelType::Sms),
            Some(ChannelCredentials::Sms {
                account_sid: "sid".into(),
                token: "token".into(),
                from: "1234567890".into(),
            })
        );
    }

    #[test]
    fn blank_values_count_as_missing() {
        let creds = HostedCredentials {
            email_api_key: Some("   ".into()),
            ..Default::default()
        };
        assert!(!creds.is_configured(ChannelType::Email));
        assert_eq!(creds.for_channel(ChannelType::Email), None);
        assert_eq!(creds.for_channel(ChannelType::Chat), None);
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = HostedCredentials {
            email_api_key: Some("super-secret".into()),
            ..Default::default()
        };
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("super-secret"));

        let email = ChannelCredentials::Email {
            api_key: "super-secret".into(),
        };
        assert!(!format!("{email:?}").contains("super-secret"));
    }
}
