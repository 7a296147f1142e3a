//! WHOIS network lookup

use async_trait::async_trait;
use whois_rust::{WhoIs, WhoIsLookupOptions};

use domain_binding_provider::ProviderError;

use crate::error::{CoreError, CoreResult};
use crate::traits::RegistrantLookupProvider;

/// Default WHOIS server map (node-whois format).
const WHOIS_SERVERS: &str = include_str!("whois_servers.json");

const PROVIDER: &str = "whois";

/// [`RegistrantLookupProvider`] over the WHOIS protocol.
pub struct WhoisServerLookup {
    whois: WhoIs,
}

impl WhoisServerLookup {
    /// Build from a JSON server map.
    pub fn from_servers(servers_json: &str) -> CoreResult<Self> {
        let whois = WhoIs::from_string(servers_json).map_err(|e| {
            CoreError::ValidationError(format!("Failed to initialize WHOIS client: {e}"))
        })?;
        Ok(Self { whois })
    }

    /// Build with the bundled server map.
    pub fn with_default_servers() -> CoreResult<Self> {
        Self::from_servers(WHOIS_SERVERS)
    }
}

#[async_trait]
impl RegistrantLookupProvider for WhoisServerLookup {
    async fn lookup(&self, domain_name: &str) -> Result<String, ProviderError> {
        let options =
            WhoIsLookupOptions::from_string(domain_name).map_err(|e| {
                ProviderError::InvalidParameter {
                    provider: PROVIDER.to_string(),
                    param: "domain".to_string(),
                    detail: e.to_string(),
                }
            })?;

        log::debug!("[{PROVIDER}] Querying {domain_name}");
        self.whois
            .lookup_async(options)
            .await
            .map_err(|e| ProviderError::NetworkError {
                provider: PROVIDER.to_string(),
                detail: format!("WHOIS query failed: {e}"),
            })
    }
}
