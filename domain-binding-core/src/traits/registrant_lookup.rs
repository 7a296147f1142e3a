//! Registrant lookup trait

use async_trait::async_trait;

use domain_binding_provider::ProviderError;

/// Raw WHOIS text source. Parsing is done by `RegistrantLookupService`.
#[async_trait]
pub trait RegistrantLookupProvider: Send + Sync {
    /// Fetch the raw WHOIS record for a bare domain
    async fn lookup(&self, domain_name: &str) -> Result<String, ProviderError>;
}
