//! Domain Binding Core Library
//!
//! Workflow for binding a custom domain to hosted applications:
//! - Provisioning state machine (request / confirm / delete)
//! - Reconciliation pass on list reads
//! - Domain availability check with registrant lookup
//! - Certificate management (upload / list / delete)
//!
//! Storage, the certificate/CDN provider and WHOIS are reached only through
//! traits, so platforms plug in their own implementations.

pub mod config;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::WorkflowConfig;
pub use error::{CoreError, CoreResult};
pub use services::{
    AvailabilityService, CertificateService, Collaborators, DomainProvisioningService,
    ReconciliationService, RegistrantLookupService, ServiceContext, Stores, WhoisServerLookup,
};
pub use traits::{
    ApplicationStore, CertificateStore, DomainStore, LegacyDomainRegistry, PublicSuffixClassifier,
    RefreshPolicy, RegistrantLookupProvider,
};
