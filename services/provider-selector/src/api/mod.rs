use std::sync::Arc;

pub mod handlers;
pub mod router;
pub mod types;

pub use handlers::*;
pub use router::create_router;
pub use types::*;

use crate::config::ProviderHubConfig;
use crate::selector::ProviderSelector;

pub struct ApiState {
    pub selector: Arc<ProviderSelector>,
    pub config: Arc<ProviderHubConfig>,
}

impl ApiState {
    pub fn new(selector: Arc<ProviderSelector>, config: ProviderHubConfig) -> Self {
        Self {
            selector,
            config: Arc::new(config),
        }
    }
}
