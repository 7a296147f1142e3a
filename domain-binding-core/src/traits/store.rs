//! Persistence traits
//!
//! Single-record, strongly consistent operations. The workflow gets its
//! consistency from call ordering, so no transactions are assumed.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{AppBinding, Certificate, Domain};

/// Domain record store
///
/// Platform implementation:
/// - `InMemoryStore` (domain-binding-app)
/// - `SqliteStore` (domain-binding-app, `SeaORM`)
#[async_trait]
pub trait DomainStore: Send + Sync {
    /// Get a domain by its (globally unique) name
    async fn get_domain(&self, domain_name: &str) -> CoreResult<Option<Domain>>;

    /// Insert a new domain
    ///
    /// Must fail with `CoreError::DomainNotAvailable` if the name already exists.
    async fn create_domain(&self, domain: &Domain) -> CoreResult<()>;

    /// Replace an existing domain
    async fn update_domain(&self, domain: &Domain) -> CoreResult<()>;

    /// Delete a domain (no-op if absent)
    async fn delete_domain(&self, domain_name: &str) -> CoreResult<()>;

    /// All domains owned by an organization
    async fn list_domains(&self, org_id: &str) -> CoreResult<Vec<Domain>>;

    /// Domains that reference a certificate
    async fn find_domains_by_certificate(&self, certificate_id: &str) -> CoreResult<Vec<Domain>>;
}

/// Certificate record store
#[async_trait]
pub trait CertificateStore: Send + Sync {
    async fn get_certificate(&self, certificate_id: &str) -> CoreResult<Option<Certificate>>;

    /// Insert or replace by `certificate_id`
    async fn create_certificate(&self, certificate: &Certificate) -> CoreResult<()>;

    async fn update_certificate(&self, certificate: &Certificate) -> CoreResult<()>;

    async fn delete_certificate(&self, certificate_id: &str) -> CoreResult<()>;

    async fn list_certificates(&self, org_id: &str) -> CoreResult<Vec<Certificate>>;
}

/// Application binding store
///
/// Only the custom-domain fields of an application are visible to this crate.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Applications currently bound to `domain_name`
    async fn get_apps_by_domain(&self, domain_name: &str) -> CoreResult<Vec<AppBinding>>;

    /// Persist an application's binding fields
    async fn update_application(&self, app: &AppBinding) -> CoreResult<()>;
}
