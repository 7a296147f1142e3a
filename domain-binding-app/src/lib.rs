//! Platform-agnostic application bootstrap for custom domain binding.
//!
//! Provides `AppState` (service container), `AppStateBuilder` (adapter injection)
//! and `AppConfig` (TOML configuration).

pub mod adapters;
mod config;

use std::sync::Arc;
use std::time::Duration;

use domain_binding_core::WorkflowConfig;
use domain_binding_core::error::{CoreError, CoreResult};
use domain_binding_core::services::{
    AvailabilityService, CertificateService, Collaborators, DomainProvisioningService,
    ReconciliationService, ServiceContext, Stores, WhoisServerLookup,
};
use domain_binding_core::traits::{
    ApplicationStore, CertificateStore, DomainStore, LegacyDomainRegistry, MinPollInterval,
    NoLegacyDomains, PublicSuffixClassifier, RefreshOnRead, RefreshPolicy,
    RegistrantLookupProvider, StaticLegacyRegistry, SuffixListClassifier,
};
use domain_binding_provider::{EdgeProvider, create_provider};

pub use config::AppConfig;

/// Platform-agnostic application state.
///
/// Holds all services and the `ServiceContext`. Every frontend constructs this
/// once at startup via `AppStateBuilder`.
pub struct AppState {
    /// Service context (holds all adapters)
    pub ctx: Arc<ServiceContext>,
    /// Request / confirm / delete
    pub provisioning_service: DomainProvisioningService,
    /// Reconciling list reads; shared so poll timestamps survive across callers
    pub reconciliation_service: Arc<ReconciliationService>,
    /// Availability check
    pub availability_service: AvailabilityService,
    /// Uploaded certificates
    pub certificate_service: CertificateService,
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `domain_store`, `certificate_store`, `application_store` (or `stores` for
///   one type implementing all three)
/// - `edge_provider`: certificate authority and CDN
///
/// # Optional
/// - `registrant_lookup`: defaults to WHOIS with the bundled server map
/// - `suffix_classifier`: defaults to the embedded suffix list
/// - `legacy_registry`: defaults to `NoLegacyDomains`
/// - `refresh_policy`: defaults to `RefreshOnRead`
/// - `workflow_config`: defaults to `WorkflowConfig::default()`
pub struct AppStateBuilder {
    domain_store: Option<Arc<dyn DomainStore>>,
    certificate_store: Option<Arc<dyn CertificateStore>>,
    application_store: Option<Arc<dyn ApplicationStore>>,
    edge_provider: Option<Arc<dyn EdgeProvider>>,
    registrant_lookup: Option<Arc<dyn RegistrantLookupProvider>>,
    suffix_classifier: Option<Arc<dyn PublicSuffixClassifier>>,
    legacy_registry: Option<Arc<dyn LegacyDomainRegistry>>,
    refresh_policy: Option<Arc<dyn RefreshPolicy>>,
    workflow_config: WorkflowConfig,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            domain_store: None,
            certificate_store: None,
            application_store: None,
            edge_provider: None,
            registrant_lookup: None,
            suffix_classifier: None,
            legacy_registry: None,
            refresh_policy: None,
            workflow_config: WorkflowConfig::default(),
        }
    }

    /// Use one store for domains, certificates and applications.
    #[must_use]
    pub fn stores<S>(self, store: Arc<S>) -> Self
    where
        S: DomainStore + CertificateStore + ApplicationStore + 'static,
    {
        self.domain_store(Arc::clone(&store) as Arc<dyn DomainStore>)
            .certificate_store(Arc::clone(&store) as Arc<dyn CertificateStore>)
            .application_store(store)
    }

    #[must_use]
    pub fn domain_store(mut self, store: Arc<dyn DomainStore>) -> Self {
        self.domain_store = Some(store);
        self
    }

    #[must_use]
    pub fn certificate_store(mut self, store: Arc<dyn CertificateStore>) -> Self {
        self.certificate_store = Some(store);
        self
    }

    #[must_use]
    pub fn application_store(mut self, store: Arc<dyn ApplicationStore>) -> Self {
        self.application_store = Some(store);
        self
    }

    #[must_use]
    pub fn edge_provider(mut self, provider: Arc<dyn EdgeProvider>) -> Self {
        self.edge_provider = Some(provider);
        self
    }

    #[must_use]
    pub fn registrant_lookup(mut self, lookup: Arc<dyn RegistrantLookupProvider>) -> Self {
        self.registrant_lookup = Some(lookup);
        self
    }

    #[must_use]
    pub fn suffix_classifier(mut self, classifier: Arc<dyn PublicSuffixClassifier>) -> Self {
        self.suffix_classifier = Some(classifier);
        self
    }

    #[must_use]
    pub fn legacy_registry(mut self, registry: Arc<dyn LegacyDomainRegistry>) -> Self {
        self.legacy_registry = Some(registry);
        self
    }

    #[must_use]
    pub fn refresh_policy(mut self, policy: Arc<dyn RefreshPolicy>) -> Self {
        self.refresh_policy = Some(policy);
        self
    }

    #[must_use]
    pub fn workflow_config(mut self, config: WorkflowConfig) -> Self {
        self.workflow_config = config;
        self
    }

    /// Fill every non-store adapter from a configuration file.
    ///
    /// Stores are left to the caller, since opening them may be async.
    pub fn with_config(mut self, config: &AppConfig) -> CoreResult<Self> {
        config.validate()?;

        self.edge_provider = Some(create_provider(config.provider.clone())?);

        if let Some(path) = &config.public_suffix_list {
            let classifier = SuffixListClassifier::from_file(path)?;
            log::info!("Loaded public suffix list from {}", path.display());
            self.suffix_classifier = Some(Arc::new(classifier));
        }

        if let Some(path) = &config.whois_servers {
            let servers = std::fs::read_to_string(path).map_err(|e| {
                CoreError::ValidationError(format!("Failed to read {}: {e}", path.display()))
            })?;
            self.registrant_lookup = Some(Arc::new(WhoisServerLookup::from_servers(&servers)?));
        }

        if !config.legacy_domains.is_empty() {
            self.legacy_registry = Some(Arc::new(StaticLegacyRegistry::new(
                config.legacy_domains.iter().map(String::as_str),
            )));
        }

        if let Some(secs) = config.min_poll_interval_secs {
            self.refresh_policy = Some(Arc::new(MinPollInterval(Duration::from_secs(secs))));
        }

        self.workflow_config = config.workflow.clone();
        Ok(self)
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required adapters are missing.
    pub fn build(self) -> CoreResult<AppState> {
        self.workflow_config.validate()?;

        let domains = self
            .domain_store
            .ok_or_else(|| CoreError::ValidationError("domain_store is required".to_string()))?;
        let certificates = self.certificate_store.ok_or_else(|| {
            CoreError::ValidationError("certificate_store is required".to_string())
        })?;
        let applications = self.application_store.ok_or_else(|| {
            CoreError::ValidationError("application_store is required".to_string())
        })?;
        let edge_provider = self
            .edge_provider
            .ok_or_else(|| CoreError::ValidationError("edge_provider is required".to_string()))?;

        let registrant_lookup = match self.registrant_lookup {
            Some(lookup) => lookup,
            None => Arc::new(WhoisServerLookup::with_default_servers()?),
        };
        let suffix_classifier = self
            .suffix_classifier
            .unwrap_or_else(|| Arc::new(SuffixListClassifier::embedded()));
        let legacy_registry = self
            .legacy_registry
            .unwrap_or_else(|| Arc::new(NoLegacyDomains));
        let refresh_policy = self
            .refresh_policy
            .unwrap_or_else(|| Arc::new(RefreshOnRead));

        log::info!("Building app state with provider '{}'", edge_provider.id());

        let ctx = Arc::new(ServiceContext::new(
            Stores {
                domains,
                certificates,
                applications,
            },
            Collaborators {
                edge_provider,
                registrant_lookup,
                suffix_classifier,
                legacy_registry,
                refresh_policy,
            },
            self.workflow_config,
        ));

        Ok(AppState {
            provisioning_service: DomainProvisioningService::new(Arc::clone(&ctx)),
            reconciliation_service: Arc::new(ReconciliationService::new(Arc::clone(&ctx))),
            availability_service: AvailabilityService::new(Arc::clone(&ctx)),
            certificate_service: CertificateService::new(Arc::clone(&ctx)),
            ctx,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
