//! Application configuration file (TOML)
//!
//! ```toml
//! database_path = "/var/lib/domain-binding/store.db"
//! legacy_domains = ["old-customer.com"]
//!
//! [workflow]
//! max_attempts = 5
//!
//! [provider]
//! origin_domain = "apps.example.net"
//!
//! [provider.credentials]
//! provider = "aws"
//! credentials = { access_key_id = "AKID", secret_access_key = "secret" }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use domain_binding_core::WorkflowConfig;
use domain_binding_core::error::{CoreError, CoreResult};
use domain_binding_provider::ProviderConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub workflow: WorkflowConfig,
    pub provider: ProviderConfig,
    /// `SQLite` file; ignored unless the `sqlite-store` feature is enabled.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Replaces the embedded public suffix list.
    #[serde(default)]
    pub public_suffix_list: Option<PathBuf>,
    /// Replaces the bundled WHOIS server map.
    #[serde(default)]
    pub whois_servers: Option<PathBuf>,
    /// Names still owned by the pre-migration system.
    #[serde(default)]
    pub legacy_domains: Vec<String>,
    /// Skip provider polls for a domain checked less than this many seconds ago.
    #[serde(default)]
    pub min_poll_interval_secs: Option<u64>,
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| CoreError::ValidationError(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ValidationError(format!("Failed to read {}: {e}", path.display()))
        })?;
        log::info!("Loading configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.workflow.validate()?;
        if self.provider.origin_domain.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "provider.origin_domain must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
