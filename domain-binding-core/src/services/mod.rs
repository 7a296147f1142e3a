//! 业务逻辑服务层

mod availability_service;
mod certificate_service;
mod domain_locks;
mod provisioning_service;
mod reconciliation_service;
mod registrant_service;
mod whois_lookup;

pub use availability_service::AvailabilityService;
pub use certificate_service::CertificateService;
pub use domain_locks::DomainLocks;
pub use provisioning_service::DomainProvisioningService;
pub use reconciliation_service::ReconciliationService;
pub use registrant_service::{RegistrantLookupService, parse_whois_record};
pub use whois_lookup::WhoisServerLookup;

use std::sync::Arc;

use domain_binding_provider::{EdgeProvider, ProviderError};

use crate::config::WorkflowConfig;
use crate::error::{CoreError, CoreResult};
use crate::traits::{
    ApplicationStore, CertificateStore, DomainStore, LegacyDomainRegistry, PublicSuffixClassifier,
    RefreshPolicy, RegistrantLookupProvider,
};

/// 服务上下文 - 持有所有依赖
///
/// 平台层需要创建此上下文，并注入平台特定的存储实现。
pub struct ServiceContext {
    /// 域名存储
    pub domain_store: Arc<dyn DomainStore>,
    /// 证书存储
    pub certificate_store: Arc<dyn CertificateStore>,
    /// 应用绑定存储
    pub application_store: Arc<dyn ApplicationStore>,
    /// 证书 / CDN Provider
    pub edge_provider: Arc<dyn EdgeProvider>,
    /// WHOIS 查询
    pub registrant_lookup: Arc<dyn RegistrantLookupProvider>,
    /// 公共后缀校验
    pub suffix_classifier: Arc<dyn PublicSuffixClassifier>,
    /// 旧系统域名表
    pub legacy_registry: Arc<dyn LegacyDomainRegistry>,
    /// 列表读取时是否轮询
    pub refresh_policy: Arc<dyn RefreshPolicy>,
    pub config: WorkflowConfig,
    /// 同一域名的读-改-写串行化
    pub domain_locks: DomainLocks,
}

/// Stores consumed by [`ServiceContext`].
pub struct Stores {
    pub domains: Arc<dyn DomainStore>,
    pub certificates: Arc<dyn CertificateStore>,
    pub applications: Arc<dyn ApplicationStore>,
}

/// External collaborators consumed by [`ServiceContext`].
pub struct Collaborators {
    pub edge_provider: Arc<dyn EdgeProvider>,
    pub registrant_lookup: Arc<dyn RegistrantLookupProvider>,
    pub suffix_classifier: Arc<dyn PublicSuffixClassifier>,
    pub legacy_registry: Arc<dyn LegacyDomainRegistry>,
    pub refresh_policy: Arc<dyn RefreshPolicy>,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(stores: Stores, collaborators: Collaborators, config: WorkflowConfig) -> Self {
        Self {
            domain_store: stores.domains,
            certificate_store: stores.certificates,
            application_store: stores.applications,
            edge_provider: collaborators.edge_provider,
            registrant_lookup: collaborators.registrant_lookup,
            suffix_classifier: collaborators.suffix_classifier,
            legacy_registry: collaborators.legacy_registry,
            refresh_policy: collaborators.refresh_policy,
            config,
            domain_locks: DomainLocks::new(),
        }
    }

    /// Run a certificate/CDN provider call under `provider_timeout`.
    ///
    /// Expiry is reported as `ProviderError::Timeout`; the provider side may
    /// still complete the request.
    pub(crate) async fn call_provider<T, F>(&self, operation: &str, call: F) -> CoreResult<T>
    where
        F: Future<Output = domain_binding_provider::Result<T>>,
    {
        let limit = self.config.provider_timeout();
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result.map_err(CoreError::from),
            Err(_) => {
                log::warn!(
                    "[{}] {operation} timed out after {}s",
                    self.edge_provider.id(),
                    limit.as_secs()
                );
                Err(CoreError::Provider(ProviderError::Timeout {
                    provider: self.edge_provider.id().to_string(),
                    detail: format!("{operation} timed out after {}s", limit.as_secs()),
                }))
            }
        }
    }

    /// Trim, strip a trailing dot and lowercase a candidate domain name.
    pub(crate) fn normalize(domain_name: &str) -> String {
        domain_name.trim().trim_end_matches('.').to_ascii_lowercase()
    }

    /// Normalize and reject anything that is not a bare registrable domain.
    pub(crate) fn validated_name(&self, domain_name: &str) -> CoreResult<String> {
        let name = Self::normalize(domain_name);
        if self.suffix_classifier.is_valid_domain(&name) {
            Ok(name)
        } else {
            Err(CoreError::InvalidDomainName(name))
        }
    }
}

/// Log an error at the level its kind calls for.
pub(crate) fn log_failure(operation: &str, subject: &str, err: &CoreError) {
    if err.is_expected() {
        log::warn!("{operation} {subject} failed: {err}");
    } else {
        log::error!("{operation} {subject} failed: {err}");
    }
}
