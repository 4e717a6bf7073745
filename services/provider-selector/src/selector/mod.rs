pub mod engine;
pub mod error;
pub mod hosted;
pub mod limits;
pub mod status;

pub use engine::{map_fallback_provider, ProviderSelector, SelectProviderCommand};
pub use error::SelectionError;
pub use hosted::{HostedCredentials, HostedIntegration};
pub use limits::{LimitPolicy, MonthWindow};
pub use status::ChannelStatus;

pub const MAX_HOSTED_MAIL_REQUESTS: u64 = 300;
pub const MAX_HOSTED_SMS_REQUESTS: u64 = 20;
