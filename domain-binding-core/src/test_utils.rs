//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。所有 mock 共享一个有序调用日志，
//! 用于断言调用顺序和“无写入”之类的性质。

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain_binding_provider::{
    CdnDistribution, CdnStatus, CertificateDetail, CertificateStatus, EdgeProvider, ProviderError,
    UploadCertificateRequest,
};
use tokio::sync::RwLock;

use crate::config::WorkflowConfig;
use crate::error::{CoreError, CoreResult};
use crate::services::{Collaborators, ServiceContext, Stores};
use crate::traits::{
    ApplicationStore, CertificateStore, DomainStore, LegacyDomainRegistry, RefreshOnRead,
    RefreshPolicy, RegistrantLookupProvider, StaticLegacyRegistry, SuffixListClassifier,
};
use crate::types::{AppBinding, Certificate, Domain};

// ===== CallLog =====

/// Ordered record of collaborator calls, as `"<component>.<operation>:<subject>"`.
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<RwLock<Vec<String>>>,
}

const STORE_WRITES: &[&str] = &[
    "store.create_domain",
    "store.update_domain",
    "store.delete_domain",
    "store.create_certificate",
    "store.update_certificate",
    "store.delete_certificate",
    "store.update_application",
];

impl CallLog {
    pub async fn record(&self, op: &str, subject: &str) {
        self.entries.write().await.push(format!("{op}:{subject}"));
    }

    pub async fn entries(&self) -> Vec<String> {
        self.entries.read().await.clone()
    }

    /// Entries for the given operation prefix, e.g. `"provider."`.
    pub async fn matching(&self, prefix: &str) -> Vec<String> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub async fn store_writes(&self) -> Vec<String> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| STORE_WRITES.iter().any(|w| e.starts_with(&format!("{w}:"))))
            .cloned()
            .collect()
    }

    pub async fn position(&self, entry: &str) -> Option<usize> {
        self.entries.read().await.iter().position(|e| e == entry)
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

// ===== MockStore =====

pub struct MockStore {
    domains: RwLock<HashMap<String, Domain>>,
    certificates: RwLock<HashMap<String, Certificate>>,
    apps: RwLock<HashMap<String, AppBinding>>,
    /// 如果 Some，写操作返回此错误（用于测试孤儿资源路径）
    write_error: RwLock<Option<String>>,
    log: CallLog,
}

impl MockStore {
    pub fn new(log: CallLog) -> Self {
        Self {
            domains: RwLock::new(HashMap::new()),
            certificates: RwLock::new(HashMap::new()),
            apps: RwLock::new(HashMap::new()),
            write_error: RwLock::new(None),
            log,
        }
    }

    pub async fn set_write_error(&self, err: Option<String>) {
        *self.write_error.write().await = err;
    }

    async fn check_write(&self) -> CoreResult<()> {
        match &*self.write_error.read().await {
            Some(msg) => Err(CoreError::StorageError(msg.clone())),
            None => Ok(()),
        }
    }

    /// Seed helpers bypass the call log.
    pub async fn insert_domain(&self, domain: Domain) {
        self.domains
            .write()
            .await
            .insert(domain.domain_name.clone(), domain);
    }

    pub async fn insert_certificate(&self, certificate: Certificate) {
        self.certificates
            .write()
            .await
            .insert(certificate.certificate_id.clone(), certificate);
    }

    pub async fn insert_app(&self, app: AppBinding) {
        self.apps.write().await.insert(app.app_id.clone(), app);
    }

    pub async fn domain(&self, name: &str) -> Option<Domain> {
        self.domains.read().await.get(name).cloned()
    }

    pub async fn certificate(&self, id: &str) -> Option<Certificate> {
        self.certificates.read().await.get(id).cloned()
    }

    pub async fn app(&self, id: &str) -> Option<AppBinding> {
        self.apps.read().await.get(id).cloned()
    }
}

#[async_trait]
impl DomainStore for MockStore {
    async fn get_domain(&self, domain_name: &str) -> CoreResult<Option<Domain>> {
        Ok(self.domains.read().await.get(domain_name).cloned())
    }

    async fn create_domain(&self, domain: &Domain) -> CoreResult<()> {
        self.log
            .record("store.create_domain", &domain.domain_name)
            .await;
        self.check_write().await?;
        let mut domains = self.domains.write().await;
        if domains.contains_key(&domain.domain_name) {
            return Err(CoreError::DomainNotAvailable(domain.domain_name.clone()));
        }
        domains.insert(domain.domain_name.clone(), domain.clone());
        Ok(())
    }

    async fn update_domain(&self, domain: &Domain) -> CoreResult<()> {
        self.log
            .record("store.update_domain", &domain.domain_name)
            .await;
        self.check_write().await?;
        self.domains
            .write()
            .await
            .insert(domain.domain_name.clone(), domain.clone());
        Ok(())
    }

    async fn delete_domain(&self, domain_name: &str) -> CoreResult<()> {
        self.log.record("store.delete_domain", domain_name).await;
        self.check_write().await?;
        self.domains.write().await.remove(domain_name);
        Ok(())
    }

    async fn list_domains(&self, org_id: &str) -> CoreResult<Vec<Domain>> {
        let mut domains: Vec<Domain> = self
            .domains
            .read()
            .await
            .values()
            .filter(|d| d.is_owned_by(org_id))
            .cloned()
            .collect();
        domains.sort_by(|a, b| a.domain_name.cmp(&b.domain_name));
        Ok(domains)
    }

    async fn find_domains_by_certificate(&self, certificate_id: &str) -> CoreResult<Vec<Domain>> {
        Ok(self
            .domains
            .read()
            .await
            .values()
            .filter(|d| d.certificate_id.as_deref() == Some(certificate_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CertificateStore for MockStore {
    async fn get_certificate(&self, certificate_id: &str) -> CoreResult<Option<Certificate>> {
        Ok(self.certificates.read().await.get(certificate_id).cloned())
    }

    async fn create_certificate(&self, certificate: &Certificate) -> CoreResult<()> {
        self.log
            .record("store.create_certificate", &certificate.certificate_id)
            .await;
        self.check_write().await?;
        self.insert_certificate(certificate.clone()).await;
        Ok(())
    }

    async fn update_certificate(&self, certificate: &Certificate) -> CoreResult<()> {
        self.log
            .record("store.update_certificate", &certificate.certificate_id)
            .await;
        self.check_write().await?;
        self.insert_certificate(certificate.clone()).await;
        Ok(())
    }

    async fn delete_certificate(&self, certificate_id: &str) -> CoreResult<()> {
        self.log
            .record("store.delete_certificate", certificate_id)
            .await;
        self.check_write().await?;
        self.certificates.write().await.remove(certificate_id);
        Ok(())
    }

    async fn list_certificates(&self, org_id: &str) -> CoreResult<Vec<Certificate>> {
        Ok(self
            .certificates
            .read()
            .await
            .values()
            .filter(|c| c.is_owned_by(org_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ApplicationStore for MockStore {
    async fn get_apps_by_domain(&self, domain_name: &str) -> CoreResult<Vec<AppBinding>> {
        let mut apps: Vec<AppBinding> = self
            .apps
            .read()
            .await
            .values()
            .filter(|a| a.domain_name.as_deref() == Some(domain_name))
            .cloned()
            .collect();
        apps.sort_by(|a, b| a.app_id.cmp(&b.app_id));
        Ok(apps)
    }

    async fn update_application(&self, app: &AppBinding) -> CoreResult<()> {
        self.log.record("store.update_application", &app.app_id).await;
        self.check_write().await?;
        self.insert_app(app.clone()).await;
        Ok(())
    }
}

// ===== MockEdgeProvider =====

pub struct MockEdgeProvider {
    certificate_statuses: RwLock<HashMap<String, CertificateStatus>>,
    distributions: RwLock<HashMap<String, CdnStatus>>,
    /// 按操作名注入的错误
    failures: RwLock<HashMap<&'static str, ProviderError>>,
    /// 每次调用前的延迟（用于测试超时）
    delay: RwLock<Option<Duration>>,
    next_id: RwLock<u32>,
    log: CallLog,
}

impl MockEdgeProvider {
    pub fn new(log: CallLog) -> Self {
        Self {
            certificate_statuses: RwLock::new(HashMap::new()),
            distributions: RwLock::new(HashMap::new()),
            failures: RwLock::new(HashMap::new()),
            delay: RwLock::new(None),
            next_id: RwLock::new(1),
            log,
        }
    }

    pub async fn set_certificate_status(&self, id: &str, status: CertificateStatus) {
        self.certificate_statuses
            .write()
            .await
            .insert(id.to_string(), status);
    }

    pub async fn set_distribution_status(&self, id: &str, status: CdnStatus) {
        self.distributions
            .write()
            .await
            .insert(id.to_string(), status);
    }

    pub async fn has_distribution(&self, id: &str) -> bool {
        self.distributions.read().await.contains_key(id)
    }

    pub async fn fail(&self, operation: &'static str, err: ProviderError) {
        self.failures.write().await.insert(operation, err);
    }

    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().await = delay;
    }

    async fn enter(&self, operation: &'static str, subject: &str) -> Result<(), ProviderError> {
        self.log
            .record(&format!("provider.{operation}"), subject)
            .await;
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.failures.read().await.get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn next_id(&self) -> u32 {
        let mut next = self.next_id.write().await;
        let id = *next;
        *next += 1;
        id
    }

    fn not_found(resource: &str) -> ProviderError {
        ProviderError::ResourceNotFound {
            provider: "mock".to_string(),
            resource: resource.to_string(),
            raw_message: None,
        }
    }
}

#[async_trait]
impl EdgeProvider for MockEdgeProvider {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn request_wildcard_certificate(
        &self,
        domain: &str,
    ) -> domain_binding_provider::Result<String> {
        self.enter("request_wildcard_certificate", domain).await?;
        let id = format!("cert-{}", self.next_id().await);
        self.set_certificate_status(&id, CertificateStatus::PendingValidation)
            .await;
        Ok(id)
    }

    async fn describe_certificate(
        &self,
        certificate_id: &str,
    ) -> domain_binding_provider::Result<CertificateDetail> {
        self.enter("describe_certificate", certificate_id).await?;
        let status = self
            .certificate_statuses
            .read()
            .await
            .get(certificate_id)
            .cloned()
            .ok_or_else(|| Self::not_found(certificate_id))?;
        Ok(CertificateDetail {
            certificate_id: certificate_id.to_string(),
            domain_name: String::new(),
            subject_alternative_names: Vec::new(),
            status,
        })
    }

    async fn get_certificate_status(
        &self,
        certificate_id: &str,
    ) -> domain_binding_provider::Result<CertificateStatus> {
        self.enter("get_certificate_status", certificate_id).await?;
        self.certificate_statuses
            .read()
            .await
            .get(certificate_id)
            .cloned()
            .ok_or_else(|| Self::not_found(certificate_id))
    }

    async fn upload_certificate(
        &self,
        req: &UploadCertificateRequest,
    ) -> domain_binding_provider::Result<CertificateDetail> {
        self.enter("upload_certificate", &req.name).await?;
        let id = format!("uploaded-{}", self.next_id().await);
        self.set_certificate_status(&id, CertificateStatus::Issued)
            .await;
        Ok(CertificateDetail {
            certificate_id: id,
            domain_name: format!("*.{}", req.name),
            subject_alternative_names: vec![req.name.clone()],
            status: CertificateStatus::Issued,
        })
    }

    async fn delete_certificate(&self, certificate_id: &str) -> domain_binding_provider::Result<()> {
        self.enter("delete_certificate", certificate_id).await?;
        self.certificate_statuses
            .write()
            .await
            .remove(certificate_id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(certificate_id))
    }

    async fn resend_validation_email(
        &self,
        domain: &str,
        certificate_id: &str,
    ) -> domain_binding_provider::Result<()> {
        self.enter("resend_validation_email", &format!("{domain}/{certificate_id}"))
            .await
    }

    async fn create_cdn_distribution(
        &self,
        domain: &str,
        certificate_id: &str,
    ) -> domain_binding_provider::Result<CdnDistribution> {
        self.enter("create_cdn_distribution", &format!("{domain}/{certificate_id}"))
            .await?;
        let n = self.next_id().await;
        let distribution_id = format!("dist-{n}");
        self.set_distribution_status(&distribution_id, CdnStatus::InProgress)
            .await;
        Ok(CdnDistribution {
            distribution_id,
            domain_name: format!("d{n}.cloudfront.net"),
            status: CdnStatus::InProgress,
        })
    }

    async fn get_cdn_distribution_status(
        &self,
        distribution_id: &str,
    ) -> domain_binding_provider::Result<CdnStatus> {
        self.enter("get_cdn_distribution_status", distribution_id)
            .await?;
        self.distributions
            .read()
            .await
            .get(distribution_id)
            .cloned()
            .ok_or_else(|| Self::not_found(distribution_id))
    }

    async fn delete_cdn_distribution(
        &self,
        distribution_id: &str,
    ) -> domain_binding_provider::Result<()> {
        self.enter("delete_cdn_distribution", distribution_id)
            .await?;
        self.distributions
            .write()
            .await
            .remove(distribution_id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(distribution_id))
    }
}

// ===== MockRegistrantLookup =====

pub struct MockRegistrantLookup {
    /// 依次返回的结果；耗尽后使用 `fallback`
    responses: RwLock<VecDeque<Result<String, ProviderError>>>,
    fallback: RwLock<Result<String, ProviderError>>,
    calls: RwLock<u32>,
}

pub const REGISTERED_WHOIS: &str = "\
Domain Name: EXAMPLE.COM
Registrar: Example Registrar, Inc.
Registrant Name: Jane Doe
Registrant Organization: Example Org
Registrant Country: US
Registrant Email: owner@example.com
Admin Email: admin@example.com
Tech Email: tech@example.com
";

impl MockRegistrantLookup {
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(VecDeque::new()),
            fallback: RwLock::new(Ok(REGISTERED_WHOIS.to_string())),
            calls: RwLock::new(0),
        }
    }

    pub async fn push(&self, response: Result<String, ProviderError>) {
        self.responses.write().await.push_back(response);
    }

    pub async fn set_fallback(&self, response: Result<String, ProviderError>) {
        *self.fallback.write().await = response;
    }

    pub async fn calls(&self) -> u32 {
        *self.calls.read().await
    }
}

#[async_trait]
impl RegistrantLookupProvider for MockRegistrantLookup {
    async fn lookup(&self, _domain_name: &str) -> Result<String, ProviderError> {
        *self.calls.write().await += 1;
        if let Some(next) = self.responses.write().await.pop_front() {
            return next;
        }
        self.fallback.read().await.clone()
    }
}

pub fn whois_network_error() -> ProviderError {
    ProviderError::NetworkError {
        provider: "whois".to_string(),
        detail: "connection reset".to_string(),
    }
}

// ===== 工厂方法 =====

/// Knobs for [`create_test_context_with`].
pub struct TestOptions {
    pub config: WorkflowConfig,
    pub refresh_policy: Arc<dyn RefreshPolicy>,
    pub legacy_domains: Vec<&'static str>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            config: WorkflowConfig {
                retry_interval_ms: 10,
                ..WorkflowConfig::default()
            },
            refresh_policy: Arc::new(RefreshOnRead),
            legacy_domains: Vec::new(),
        }
    }
}

/// Everything a service test needs.
pub struct TestHarness {
    pub ctx: Arc<ServiceContext>,
    pub store: Arc<MockStore>,
    pub provider: Arc<MockEdgeProvider>,
    pub lookup: Arc<MockRegistrantLookup>,
    pub log: CallLog,
}

/// 创建测试用 `ServiceContext`
pub fn create_test_context() -> TestHarness {
    create_test_context_with(TestOptions::default())
}

pub fn create_test_context_with(options: TestOptions) -> TestHarness {
    let log = CallLog::default();
    let store = Arc::new(MockStore::new(log.clone()));
    let provider = Arc::new(MockEdgeProvider::new(log.clone()));
    let lookup = Arc::new(MockRegistrantLookup::new());
    let legacy: Arc<dyn LegacyDomainRegistry> =
        Arc::new(StaticLegacyRegistry::new(options.legacy_domains));

    let ctx = Arc::new(ServiceContext::new(
        Stores {
            domains: store.clone(),
            certificates: store.clone(),
            applications: store.clone(),
        },
        Collaborators {
            edge_provider: provider.clone(),
            registrant_lookup: lookup.clone(),
            suffix_classifier: Arc::new(SuffixListClassifier::embedded()),
            legacy_registry: legacy,
            refresh_policy: options.refresh_policy,
        },
        options.config,
    ));

    TestHarness {
        ctx,
        store,
        provider,
        lookup,
        log,
    }
}

/// `Pending` domain plus its certificate record, seeded without logging.
pub async fn seed_pending(
    harness: &TestHarness,
    org_id: &str,
    domain_name: &str,
    certificate_id: &str,
    status: CertificateStatus,
) -> Domain {
    let domain = Domain::new_pending(domain_name, org_id, certificate_id);
    harness.store.insert_domain(domain.clone()).await;
    harness
        .store
        .insert_certificate(Certificate::requested(
            certificate_id.to_string(),
            org_id,
            domain_name,
        ))
        .await;
    harness
        .provider
        .set_certificate_status(certificate_id, status)
        .await;
    domain
}

/// `InProgress` domain with a live distribution.
pub async fn seed_in_progress(
    harness: &TestHarness,
    org_id: &str,
    domain_name: &str,
    distribution_id: &str,
    cdn_status: CdnStatus,
) -> Domain {
    let certificate_id = format!("cert-{domain_name}");
    let mut domain = seed_pending(
        harness,
        org_id,
        domain_name,
        &certificate_id,
        CertificateStatus::Issued,
    )
    .await;
    domain.cdn_distribution_id = Some(distribution_id.to_string());
    domain.dns_value = Some(format!("{distribution_id}.cloudfront.net"));
    domain.status = crate::types::DomainStatus::InProgress;
    harness.store.insert_domain(domain.clone()).await;
    harness
        .provider
        .set_distribution_status(distribution_id, cdn_status)
        .await;
    domain
}

pub fn app(app_id: &str, org_id: &str, domain_name: &str, sub_domain: &str) -> AppBinding {
    AppBinding {
        app_id: app_id.to_string(),
        org_id: org_id.to_string(),
        domain_name: Some(domain_name.to_string()),
        sub_domain: Some(sub_domain.to_string()),
    }
}
