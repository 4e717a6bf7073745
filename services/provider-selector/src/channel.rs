use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    Email,
    Sms,
    Chat,
    Push,
    InApp,
}

pub const CHANNELS_ORDER: [ChannelType; 5] = [
    ChannelType::InApp,
    ChannelType::Email,
    ChannelType::Sms,
    ChannelType::Chat,
    ChannelType::Push,
];

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::Email => "email",
            ChannelType::Sms => "sms",
            ChannelType::Chat => "chat",
            ChannelType::Push => "push",
            ChannelType::InApp => "in_app",
        }
    }

    pub fn step_name(&self) -> &'static str {
        match self {
            ChannelType::Email => "Email",
            ChannelType::Sms => "SMS",
            ChannelType::Chat => "Chat",
            ChannelType::Push => "Push",
            ChannelType::InApp => "In-App",
        }
    }

    pub fn hosted_provider(&self) -> Option<ProviderId> {
        match self {
            ChannelType::Email => Some(ProviderId::NovuEmail),
            ChannelType::Sms => Some(ProviderId::NovuSms),
            ChannelType::Chat | ChannelType::Push | ChannelType::InApp => None,
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown channel type: {0}")]
    UnknownChannel(String),
    #[error("unknown provider id: {0}")]
    UnknownProvider(String),
    #[error("provider {provider} does not serve the {channel} channel")]
    UnsupportedChannel {
        provider: ProviderId,
        channel: ChannelType,
    },
}

impl FromStr for ChannelType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "email" => Ok(ChannelType::Email),
            "sms" => Ok(ChannelType::Sms),
            "chat" => Ok(ChannelType::Chat),
            "push" => Ok(ChannelType::Push),
            "in_app" | "in-app" => Ok(ChannelType::InApp),
            _ => Err(CatalogError::UnknownChannel(s.to_string())),
        }
    }
}

/// Identifier of a concrete provider implementation. Ids are namespaced per
/// channel, so the hosted provider has one id for email and one for SMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    #[serde(rename = "novu-email")]
    NovuEmail,
    #[serde(rename = "novu-sms")]
    NovuSms,
    #[serde(rename = "sendgrid")]
    SendGrid,
    #[serde(rename = "mailgun")]
    Mailgun,
    #[serde(rename = "mailjet")]
    Mailjet,
    #[serde(rename = "mandrill")]
    Mandrill,
    #[serde(rename = "postmark")]
    Postmark,
    #[serde(rename = "ses")]
    Ses,
    #[serde(rename = "sendinblue")]
    Sendinblue,
    #[serde(rename = "resend")]
    Resend,
    #[serde(rename = "nodemailer")]
    CustomSmtp,
    #[serde(rename = "twilio")]
    Twilio,
    #[serde(rename = "plivo")]
    Plivo,
    #[serde(rename = "sns")]
    Sns,
    #[serde(rename = "nexmo")]
    Nexmo,
    #[serde(rename = "telnyx")]
    Telnyx,
    #[serde(rename = "infobip-sms")]
    InfobipSms,
    #[serde(rename = "slack")]
    Slack,
    #[serde(rename = "discord")]
    Discord,
    #[serde(rename = "msteams")]
    MsTeams,
    #[serde(rename = "fcm")]
    Fcm,
    #[serde(rename = "apns")]
    Apns,
    #[serde(rename = "expo")]
    Expo,
    #[serde(rename = "novu-in-app")]
    NovuInApp,
}

pub const ALL_PROVIDERS: [ProviderId; 24] = [
    ProviderId::NovuEmail,
    ProviderId::NovuSms,
    ProviderId::SendGrid,
    ProviderId::Mailgun,
    ProviderId::Mailjet,
    ProviderId::Mandrill,
    ProviderId::Postmark,
    ProviderId::Ses,
    ProviderId::Sendinblue,
    ProviderId::Resend,
    ProviderId::CustomSmtp,
    ProviderId::Twilio,
    ProviderId::Plivo,
    ProviderId::Sns,
    ProviderId::Nexmo,
    ProviderId::Telnyx,
    ProviderId::InfobipSms,
    ProviderId::Slack,
    ProviderId::Discord,
    ProviderId::MsTeams,
    ProviderId::Fcm,
    ProviderId::Apns,
    ProviderId::Expo,
    ProviderId::NovuInApp,
];

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::NovuEmail => "novu-email",
            ProviderId::NovuSms => "novu-sms",
            ProviderId::SendGrid => "sendgrid",
            ProviderId::Mailgun => "mailgun",
            ProviderId::Mailjet => "mailjet",
            ProviderId::Mandrill => "mandrill",
            ProviderId::Postmark => "postmark",
            ProviderId::Ses => "ses",
            ProviderId::Sendinblue => "sendinblue",
            ProviderId::Resend => "resend",
            ProviderId::CustomSmtp => "nodemailer",
            ProviderId::Twilio => "twilio",
            ProviderId::Plivo => "plivo",
            ProviderId::Sns => "sns",
            ProviderId::Nexmo => "nexmo",
            ProviderId::Telnyx => "telnyx",
            ProviderId::InfobipSms => "infobip-sms",
            ProviderId::Slack => "slack",
            ProviderId::Discord => "discord",
            ProviderId::MsTeams => "msteams",
            ProviderId::Fcm => "fcm",
            ProviderId::Apns => "apns",
            ProviderId::Expo => "expo",
            ProviderId::NovuInApp => "novu-in-app",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::NovuEmail => "Novu Email",
            ProviderId::NovuSms => "Novu SMS",
            ProviderId::SendGrid => "SendGrid",
            ProviderId::Mailgun => "Mailgun",
            ProviderId::Mailjet => "Mailjet",
            ProviderId::Mandrill => "Mandrill",
            ProviderId::Postmark => "Postmark",
            ProviderId::Ses => "SES",
            ProviderId::Sendinblue => "Sendinblue",
            ProviderId::Resend => "Resend",
            ProviderId::CustomSmtp => "Custom SMTP",
            ProviderId::Twilio => "Twilio",
            ProviderId::Plivo => "Plivo",
            ProviderId::Sns => "SNS",
            ProviderId::Nexmo => "Nexmo",
            ProviderId::Telnyx => "Telnyx",
            ProviderId::InfobipSms => "Infobip",
            ProviderId::Slack => "Slack",
            ProviderId::Discord => "Discord",
            ProviderId::MsTeams => "MSTeams",
            ProviderId::Fcm => "FCM",
            ProviderId::Apns => "APNS",
            ProviderId::Expo => "Expo Push",
            ProviderId::NovuInApp => "Novu In-App",
        }
    }

    pub fn channels(&self) -> &'static [ChannelType] {
        match self {
            ProviderId::NovuEmail
            | ProviderId::SendGrid
            | ProviderId::Mailgun
            | ProviderId::Mailjet
            | ProviderId::Mandrill
            | ProviderId::Postmark
            | ProviderId::Ses
            | ProviderId::Sendinblue
            | ProviderId::Resend
            | ProviderId::CustomSmtp => &[ChannelType::Email],
            ProviderId::NovuSms
            | ProviderId::Twilio
            | ProviderId::Plivo
            | ProviderId::Sns
            | ProviderId::Nexmo
            | ProviderId::Telnyx
            | ProviderId::InfobipSms => &[ChannelType::Sms],
            ProviderId::Slack | ProviderId::Discord | ProviderId::MsTeams => &[ChannelType::Chat],
            ProviderId::Fcm | ProviderId::Apns | ProviderId::Expo => &[ChannelType::Push],
            ProviderId::NovuInApp => &[ChannelType::InApp],
        }
    }

    pub fn supports(&self, channel: ChannelType) -> bool {
        self.channels().contains(&channel)
    }

    pub fn is_hosted(&self) -> bool {
        matches!(self, ProviderId::NovuEmail | ProviderId::NovuSms)
    }

    pub fn parse_for_channel(raw: &str, channel: ChannelType) -> Result<Self, CatalogError> {
        let provider: ProviderId = raw.parse()?;
        if !provider.supports(channel) {
            return Err(CatalogError::UnsupportedChannel { provider, channel });
        }
        Ok(provider)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_PROVIDERS
            .iter()
            .copied()
            .find(|provider| provider.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownProvider(s.to_string()))
    }
}

pub fn providers_for(channel: ChannelType, search: Option<&str>) -> Vec<ProviderId> {
    let needle = search
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase);

    ALL_PROVIDERS
        .iter()
        .copied()
        .filter(|provider| provider.supports(channel))
        .filter(|provider| match &needle {
            Some(term) => provider.display_name().to_lowercase().contains(term),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_parses_both_in_app_spellings() {
        assert_eq!("in_app".parse::<ChannelType>(), Ok(ChannelType::InApp));
        assert_eq!("in-app".parse::<ChannelType>(), Ok(ChannelType::InApp));
        assert_eq!("EMAIL".parse::<ChannelType>(), Ok(ChannelType::Email));
        assert!("fax".parse::<ChannelType>().is_err());
    }

    #[test]
    fn provider_ids_parse_back_from_their_string_form() {
        for provider in ALL_PROVIDERS {
            assert_eq!(provider.as_str().parse::<ProviderId>(), Ok(provider));
        }
        assert_eq!(
            "carrier-pigeon".parse::<ProviderId>(),
            Err(CatalogError::UnknownProvider("carrier-pigeon".into()))
        );
    }

    #[test]
    fn provider_serde_uses_platform_ids() {
        let json = serde_json::to_string(&ProviderId::CustomSmtp).unwrap();
        assert_eq!(json, "\"nodemailer\"");
        let parsed: ProviderId = serde_json::from_str("\"infobip-sms\"").unwrap();
        assert_eq!(parsed, ProviderId::InfobipSms);
    }

    #[test]
    fn only_email_and_sms_have_a_hosted_provider() {
        assert_eq!(ChannelType::Email.hosted_provider(), Some(ProviderId::NovuEmail));
        assert_eq!(ChannelType::Sms.hosted_provider(), Some(ProviderId::NovuSms));
        assert_eq!(ChannelType::Chat.hosted_provider(), None);
        assert_eq!(ChannelType::Push.hosted_provider(), None);
        assert_eq!(ChannelType::InApp.hosted_provider(), None);
    }

    #[test]
    fn hosted_ids_are_namespaced_per_channel() {
        assert_eq!("novu-email".parse::<ProviderId>(), Ok(ProviderId::NovuEmail));
        assert_eq!("novu-sms".parse::<ProviderId>(), Ok(ProviderId::NovuSms));
        assert!(ProviderId::NovuEmail.is_hosted());
        assert!(ProviderId::NovuSms.is_hosted());
        assert!(!ProviderId::SendGrid.is_hosted());
        assert_eq!(ProviderId::NovuEmail.channels(), &[ChannelType::Email]);
        assert_eq!(ProviderId::NovuSms.channels(), &[ChannelType::Sms]);
        assert!(ProviderId::parse_for_channel("novu-email", ChannelType::Sms).is_err());
    }

    #[test]
    fn parse_for_channel_rejects_mismatched_channel() {
        assert_eq!(
            ProviderId::parse_for_channel("twilio", ChannelType::Email),
            Err(CatalogError::UnsupportedChannel {
                provider: ProviderId::Twilio,
                channel: ChannelType::Email,
            })
        );
        assert_eq!(
            ProviderId::parse_for_channel("twilio", ChannelType::Sms),
            Ok(ProviderId::Twilio)
        );
    }

    #[test]
    fn search_filters_on_display_name() {
        let found = providers_for(ChannelType::Email, Some("  GRID "));
        assert_eq!(found, vec![ProviderId::SendGrid]);

        let all_sms = providers_for(ChannelType::Sms, None);
        assert!(all_sms.contains(&ProviderId::NovuSms));
        assert!(!all_sms.contains(&ProviderId::NovuEmail));
        assert!(all_sms.contains(&ProviderId::Twilio));
        assert!(!all_sms.contains(&ProviderId::SendGrid));
    }
}
