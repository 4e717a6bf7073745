use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use hosted_provider_selector::api::{self, ApiState};
use hosted_provider_selector::channel::ChannelType;
use hosted_provider_selector::config::{ProviderHubConfig, StorageBackend};
use hosted_provider_selector::selector::ProviderSelector;
use hosted_provider_selector::storage::{InMemoryStore, ProviderDatabase};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ProviderHubConfig::from_env()?;
    init_tracing(&config.log_level)?;

    let host = config.server_host.clone();
    let port = config.server_port;

    info!(
        host = %host,
        port,
        data_dir = %config.data_dir.display(),
        backend = ?config.storage_backend,
        max_mail_requests = config.max_mail_requests,
        max_sms_requests = config.max_sms_requests,
        "starting hosted-provider-selector service"
    );

    for channel in [ChannelType::Email, ChannelType::Sms] {
        if !config.hosted_credentials.is_configured(channel) {
            warn!(%channel, "hosted provider credentials missing; hosted channel disabled");
        }
    }

    let policy = config.limit_policy();
    let credentials = config.hosted_credentials.clone();
    let selector = match config.storage_backend {
        StorageBackend::Sqlite => {
            let database = Arc::new(ProviderDatabase::new(config.data_dir.clone())?);
            ProviderSelector::with_store(database, policy, credentials)
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage; usage counts reset on restart");
            ProviderSelector::with_store(Arc::new(InMemoryStore::new()), policy, credentials)
        }
    };

    let state = Arc::new(ApiState::new(Arc::new(selector), config));
    let router = api::create_router(Arc::clone(&state));
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("hosted-provider-selector service shutting down");
    Ok(())
}

fn init_tracing(default_level: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
