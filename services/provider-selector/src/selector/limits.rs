use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

use crate::channel::ChannelType;

use super::{MAX_HOSTED_MAIL_REQUESTS, MAX_HOSTED_SMS_REQUESTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    mail_requests: u64,
    sms_requests: u64,
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            mail_requests: MAX_HOSTED_MAIL_REQUESTS,
            sms_requests: MAX_HOSTED_SMS_REQUESTS,
        }
    }
}

impl LimitPolicy {
    pub fn new(mail_requests: u64, sms_requests: u64) -> Self {
        Self {
            mail_requests,
            sms_requests,
        }
    }

    pub fn threshold(&self, channel: ChannelType) -> Option<u64> {
        match channel {
            ChannelType::Email => Some(self.mail_requests),
            ChannelType::Sms => Some(self.sms_requests),
            ChannelType::Chat | ChannelType::Push | ChannelType::InApp => None,
        }
    }

    pub fn is_under_limit(&self, channel: ChannelType, current_count: u64) -> bool {
        self.threshold(channel)
            .map(|limit| current_count < limit)
            .unwrap_or(false)
    }

    pub fn remaining(&self, channel: ChannelType, current_count: u64) -> u64 {
        self.threshold(channel)
            .map(|limit| limit.saturating_sub(current_count))
            .unwrap_or(0)
    }
}

/// Inclusive bounds of the calendar month (UTC) containing an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    pub fn containing(now: DateTime<Utc>) -> Self {
        let start = first_of_month(now.year(), now.month());
        let (next_year, next_month) = if now.month() == 12 {
            (now.year() + 1, 1)
        } else {
            (now.year(), now.month() + 1)
        };
        let end = first_of_month(next_year, next_month) - Duration::milliseconds(1);
        Self { start, end }
    }

    pub fn current() -> Self {
        Self::containing(Utc::now())
    }

    pub fn period_label(&self) -> String {
        format!("{:04}-{:02}", self.start.year(), self.start.month())
    }
}

fn first_of_month(year: i32, month: u32) -> DateTime<Utc> {
    // Midnight on day one exists for every month in UTC.
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_equal_to_threshold_is_not_under_limit() {
        let policy = LimitPolicy::new(10, 3);
        assert!(policy.is_under_limit(ChannelType::Email, 9));
        assert!(!policy.is_under_limit(ChannelType::Email, 10));
        assert!(!policy.is_under_limit(ChannelType::Email, 11));
        assert!(policy.is_under_limit(ChannelType::Sms, 2));
        assert!(!policy.is_under_limit(ChannelType::Sms, 3));
    }

    #[test]
    fn channels_without_hosted_provider_have_no_threshold() {
        let policy = LimitPolicy::default();
        assert_eq!(policy.threshold(ChannelType::Chat), None);
        assert!(!policy.is_under_limit(ChannelType::Push, 0));
        assert_eq!(policy.remaining(ChannelType::InApp, 0), 0);
    }

    #[test]
    fn default_thresholds() {
        let policy = LimitPolicy::default();
        assert_eq!(policy.threshold(ChannelType::Email), Some(300));
        assert_eq!(policy.threshold(ChannelType::Sms), Some(20));
    }

    #[test]
    fn remaining_saturates_at_zero() {
        let policy = LimitPolicy::new(5, 5);
        assert_eq!(policy.remaining(ChannelType::Email, 2), 3);
        assert_eq!(policy.remaining(ChannelType::Email, 9), 0);
    }

    #[test]
    fn month_window_spans_whole_month() {
        let now = Utc.with_ymd_and_hms(2024, 2, 14, 12, 30, 0).unwrap();
        let window = MonthWindow::containing(now);

        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(
            window.end,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() - Duration::milliseconds(1)
        );
        assert_eq!(MonthWindow::containing(window.end), window);
        assert_ne!(MonthWindow::containing(window.end + Duration::milliseconds(1)), window);
        assert_eq!(window.period_label(), "2024-02");
    }

    #[test]
    fn month_window_rolls_over_december() {
        let now = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let window = MonthWindow::containing(now);
        assert_eq!(
            window.end + Duration::milliseconds(1),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }
}
