//! Collaborator trait definitions

mod legacy_registry;
mod public_suffix;
mod refresh_policy;
mod registrant_lookup;
mod store;

pub use legacy_registry::{LegacyDomainRegistry, NoLegacyDomains, StaticLegacyRegistry};
pub use public_suffix::{ParsedDomain, PublicSuffixClassifier, SuffixListClassifier};
pub use refresh_policy::{ExternalRefresh, MinPollInterval, RefreshOnRead, RefreshPolicy};
pub use registrant_lookup::RegistrantLookupProvider;
pub use store::{ApplicationStore, CertificateStore, DomainStore};
