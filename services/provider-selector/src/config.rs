use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::selector::{
    HostedCredentials, LimitPolicy, MAX_HOSTED_MAIL_REQUESTS, MAX_HOSTED_SMS_REQUESTS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("unsupported storage backend {other}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderHubConfig {
    pub server_host: String,
    pub server_port: u16,
    pub data_dir: PathBuf,
    pub storage_backend: StorageBackend,
    pub max_mail_requests: u64,
    pub max_sms_requests: u64,
    pub request_timeout_secs: u64,
    pub hosted_credentials: HostedCredentials,
    pub log_level: String,
}

impl Default for ProviderHubConfig {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 8184,
            data_dir: PathBuf::from("data/providers"),
            storage_backend: StorageBackend::Sqlite,
            max_mail_requests: MAX_HOSTED_MAIL_REQUESTS,
            max_sms_requests: MAX_HOSTED_SMS_REQUESTS,
            request_timeout_secs: 30,
            hosted_credentials: HostedCredentials::default(),
            log_level: "info".to_string(),
        }
    }
}

impl ProviderHubConfig {
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(host) = env::var("PROVIDER_HUB_HOST") {
            cfg.server_host = host;
        }
        if let Ok(port) = env::var("PROVIDER_HUB_PORT") {
            cfg.server_port = port
                .parse()
                .context("PROVIDER_HUB_PORT must be a valid u16")?;
        }
        if let Ok(dir) = env::var("PROVIDER_HUB_DATA_DIR") {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Ok(backend) = env::var("STORAGE_BACKEND") {
            cfg.storage_backend = backend
                .parse()
                .with_context(|| format!("STORAGE_BACKEND is invalid: {backend}"))?;
        }
        if let Ok(limit) = env::var("MAX_HOSTED_MAIL_REQUESTS") {
            cfg.max_mail_requests = limit
                .parse()
                .context("MAX_HOSTED_MAIL_REQUESTS must be a positive integer")?;
        }
        if let Ok(limit) = env::var("MAX_HOSTED_SMS_REQUESTS") {
            cfg.max_sms_requests = limit
                .parse()
                .context("MAX_HOSTED_SMS_REQUESTS must be a positive integer")?;
        }
        if let Ok(timeout) = env::var("REQUEST_TIMEOUT_SECS") {
            cfg.request_timeout_secs = timeout
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a positive integer")?;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            cfg.log_level = level;
        }

        cfg.hosted_credentials = HostedCredentials {
            email_api_key: env::var("NOVU_EMAIL_INTEGRATION_API_KEY").ok(),
            sms_account_sid: env::var("NOVU_SMS_INTEGRATION_ACCOUNT_SID").ok(),
            sms_token: env::var("NOVU_SMS_INTEGRATION_TOKEN").ok(),
            sms_sender: env::var("NOVU_SMS_INTEGRATION_SENDER").ok(),
        };

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_backend == StorageBackend::Sqlite {
            ensure_directory(&self.data_dir)?;
        }

        if self.server_port == 0 {
            anyhow::bail!("PROVIDER_HUB_PORT must be greater than zero");
        }
        if self.max_mail_requests == 0 {
            anyhow::bail!("MAX_HOSTED_MAIL_REQUESTS must be greater than zero");
        }
        if self.max_sms_requests == 0 {
            anyhow::bail!("MAX_HOSTED_SMS_REQUESTS must be greater than zero");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        Ok(())
    }

    pub fn limit_policy(&self) -> LimitPolicy {
        LimitPolicy::new(self.max_mail_requests, self.max_sms_requests)
    }
}

fn ensure_directory(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            anyhow::bail!("{} exists but is not a directory", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("unable to create data directory {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!("sqlite".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
        assert_eq!("MEMORY".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_config_validation() {
        let temp = tempdir().expect("failed to create temp dir");
        let mut config = ProviderHubConfig {
            data_dir: temp.path().join("providers"),
            ..ProviderHubConfig::default()
        };

        assert!(config.validate().is_ok());
        assert!(config.data_dir.is_dir());

        config.max_mail_requests = 0;
        assert!(config.validate().is_err());
        config.max_mail_requests = 300;

        config.max_sms_requests = 0;
        assert!(config.validate().is_err());
        config.max_sms_requests = 20;

        config.server_port = 0;
        assert!(config.validate().is_err());
        config.server_port = 8184;

        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_data_dir_must_be_directory() {
        let temp = tempdir().expect("failed to create temp dir");
        let file = temp.path().join("not-a-dir");
        fs::write(&file, b"x").unwrap();

        let config = ProviderHubConfig {
            data_dir: file.clone(),
            ..ProviderHubConfig::default()
        };
        assert!(config.validate().is_err());

        let memory = ProviderHubConfig {
            data_dir: file,
            storage_backend: StorageBackend::Memory,
            ..ProviderHubConfig::default()
        };
        assert!(memory.validate().is_ok());
    }

    #[test]
    fn test_limit_policy_from_config() {
        let config = ProviderHubConfig {
            max_mail_requests: 7,
            max_sms_requests: 2,
            ..ProviderHubConfig::default()
        };
        assert_eq!(config.limit_policy(), LimitPolicy::new(7, 2));
    }
}
