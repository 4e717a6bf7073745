use thiserror::Error;

use crate::channel::ChannelType;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Limit for Novus {channel} provider was reached.")]
    LimitExceeded {
        channel: ChannelType,
        limit: u64,
        current: u64,
    },
    #[error("hosted {0} provider is not configured")]
    HostedUnavailable(ChannelType),
    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),
}
