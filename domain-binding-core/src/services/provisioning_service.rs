//! 域名开通服务
//!
//! Request → (email validation) → confirm → reconciliation → `Deployed`.
//! Ownership and availability are checked before any provider call; once a
//! provider resource exists, a failed store write is logged with the orphaned
//! resource id and returned as-is.

use std::sync::Arc;

use domain_binding_provider::{CertificateStatus, ProviderError};

use crate::error::{CoreError, CoreResult};
use crate::services::{ServiceContext, log_failure};
use crate::types::{Certificate, CertificateRecordStatus, Domain, DomainStatus};

/// 域名开通服务
pub struct DomainProvisioningService {
    ctx: Arc<ServiceContext>,
}

impl DomainProvisioningService {
    /// 创建域名开通服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// 申请绑定域名
    ///
    /// Reuses a live wildcard certificate the organization already holds for
    /// this name; otherwise requests a new one from the authority.
    pub async fn request_domain(&self, org_id: &str, domain_name: &str) -> CoreResult<Domain> {
        let name = self.ctx.validated_name(domain_name)?;
        let _guard = self.ctx.domain_locks.acquire(&name).await;
        self.ensure_unclaimed(&name).await?;

        let certificate_id = match self.find_reusable_certificate(org_id, &name).await? {
            Some(certificate) => {
                log::info!(
                    "Reusing certificate {} for {name}",
                    certificate.certificate_id
                );
                certificate.certificate_id
            }
            None => self.request_certificate(org_id, &name).await?,
        };

        self.create_pending(org_id, &name, certificate_id).await
    }

    /// 使用已有证书申请绑定域名
    pub async fn request_domain_with_certificate(
        &self,
        org_id: &str,
        domain_name: &str,
        certificate_id: &str,
    ) -> CoreResult<Domain> {
        let name = self.ctx.validated_name(domain_name)?;
        let _guard = self.ctx.domain_locks.acquire(&name).await;
        self.ensure_unclaimed(&name).await?;

        let certificate = self
            .ctx
            .certificate_store
            .get_certificate(certificate_id)
            .await?
            .ok_or_else(|| CoreError::CertificateNotFound(certificate_id.to_string()))?;
        if !certificate.is_owned_by(org_id) {
            return Err(CoreError::Forbidden(format!(
                "certificate {certificate_id} belongs to another organization"
            )));
        }
        if !certificate.covers(&name) {
            return Err(CoreError::CertificateMismatch {
                certificate_id: certificate_id.to_string(),
                domain: name,
            });
        }

        self.create_pending(org_id, &name, certificate.certificate_id)
            .await
    }

    /// 确认域名：证书已签发后创建 CDN 分发
    ///
    /// Nothing is written unless the authority reports `ISSUED`. A domain that
    /// already has a distribution is returned unchanged.
    pub async fn confirm_domain(&self, org_id: &str, domain_name: &str) -> CoreResult<Domain> {
        let name = ServiceContext::normalize(domain_name);
        let _guard = self.ctx.domain_locks.acquire(&name).await;
        let mut domain = self.owned_domain(org_id, &name).await?;

        if let Some(distribution_id) = &domain.cdn_distribution_id {
            log::info!("{name} already has distribution {distribution_id}, nothing to confirm");
            return Ok(domain);
        }

        let certificate_id = domain
            .certificate_id
            .clone()
            .ok_or_else(|| CoreError::CertificateNotFound(format!("no certificate bound to {name}")))?;

        let status = self
            .ctx
            .call_provider(
                "get_certificate_status",
                self.ctx.edge_provider.get_certificate_status(&certificate_id),
            )
            .await?;
        match status {
            CertificateStatus::Issued => {}
            CertificateStatus::PendingValidation => return Err(CoreError::CertNotApproved(name)),
            CertificateStatus::ValidationTimedOut => {
                return Err(CoreError::ValidationTimedOut(name));
            }
            other => {
                return Err(CoreError::CertificateNotIssued {
                    domain: name,
                    status: other.to_string(),
                });
            }
        }

        let distribution = self
            .ctx
            .call_provider(
                "create_cdn_distribution",
                self.ctx
                    .edge_provider
                    .create_cdn_distribution(&name, &certificate_id),
            )
            .await?;

        domain.cdn_distribution_id = Some(distribution.distribution_id.clone());
        domain.dns_value = Some(distribution.domain_name);
        domain.set_status(DomainStatus::InProgress);

        if let Err(e) = self.ctx.domain_store.update_domain(&domain).await {
            log::error!(
                "Orphaned distribution {} for {name}: store update failed: {e}",
                distribution.distribution_id
            );
            return Err(e);
        }
        log::info!(
            "Confirmed {name}: distribution {}",
            distribution.distribution_id
        );

        self.mark_certificate_deployed(&certificate_id).await;
        Ok(domain)
    }

    /// 删除域名
    ///
    /// Order: unbind applications, delete the distribution, delete the record.
    /// The certificate is kept so the name can be requested again.
    pub async fn delete_domain(&self, org_id: &str, domain_name: &str) -> CoreResult<()> {
        let name = ServiceContext::normalize(domain_name);
        let _guard = self.ctx.domain_locks.acquire(&name).await;
        let domain = self.owned_domain(org_id, &name).await?;

        let apps = self.ctx.application_store.get_apps_by_domain(&name).await?;
        for mut app in apps {
            app.clear_domain();
            self.ctx.application_store.update_application(&app).await?;
            log::info!("Unbound application {} from {name}", app.app_id);
        }

        if let Some(distribution_id) = &domain.cdn_distribution_id {
            match self
                .ctx
                .call_provider(
                    "delete_cdn_distribution",
                    self.ctx.edge_provider.delete_cdn_distribution(distribution_id),
                )
                .await
            {
                Ok(()) => {}
                Err(CoreError::Provider(ProviderError::ResourceNotFound { .. })) => {
                    log::warn!("Distribution {distribution_id} for {name} already deleted");
                }
                Err(e) => {
                    log_failure("Deleting distribution for", &name, &e);
                    return Err(e);
                }
            }
        }

        self.ctx.domain_store.delete_domain(&name).await?;
        log::info!("Deleted domain {name}");
        Ok(())
    }

    /// 重新发送证书验证邮件
    pub async fn resend_validation_email(&self, org_id: &str, domain_name: &str) -> CoreResult<()> {
        let name = ServiceContext::normalize(domain_name);
        let domain = self.owned_domain(org_id, &name).await?;
        let certificate_id = domain
            .certificate_id
            .ok_or_else(|| CoreError::CertificateNotFound(format!("no certificate bound to {name}")))?;

        self.ctx
            .call_provider(
                "resend_validation_email",
                self.ctx
                    .edge_provider
                    .resend_validation_email(&name, &certificate_id),
            )
            .await?;
        log::info!("Resent validation email for {name}");
        Ok(())
    }

    /// 获取域名
    pub async fn get_domain(&self, org_id: &str, domain_name: &str) -> CoreResult<Domain> {
        self.owned_domain(org_id, &ServiceContext::normalize(domain_name))
            .await
    }

    // ===== 内部方法 =====

    async fn owned_domain(&self, org_id: &str, name: &str) -> CoreResult<Domain> {
        let domain = self
            .ctx
            .domain_store
            .get_domain(name)
            .await?
            .ok_or_else(|| CoreError::DomainNotFound(name.to_string()))?;
        if !domain.is_owned_by(org_id) {
            return Err(CoreError::Forbidden(format!(
                "domain {name} belongs to another organization"
            )));
        }
        Ok(domain)
    }

    async fn ensure_unclaimed(&self, name: &str) -> CoreResult<()> {
        if self.ctx.domain_store.get_domain(name).await?.is_some() {
            return Err(CoreError::DomainNotAvailable(name.to_string()));
        }
        Ok(())
    }

    /// First wildcard certificate for `name` whose live authority status is
    /// still usable. The cached record status is only refreshed, never trusted.
    async fn find_reusable_certificate(
        &self,
        org_id: &str,
        name: &str,
    ) -> CoreResult<Option<Certificate>> {
        let certificates = self.ctx.certificate_store.list_certificates(org_id).await?;

        for mut certificate in certificates.into_iter().filter(|c| c.covers(name)) {
            let certificate_id = certificate.certificate_id.clone();
            let status = match self
                .ctx
                .call_provider(
                    "get_certificate_status",
                    self.ctx.edge_provider.get_certificate_status(&certificate_id),
                )
                .await
            {
                Ok(status) => status,
                Err(CoreError::Provider(ProviderError::ResourceNotFound { .. })) => {
                    log::warn!("Certificate {certificate_id} no longer exists at the authority");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if status.is_terminal_failure() {
                log::info!("Not reusing certificate {certificate_id} for {name}: {status}");
                let cached = CertificateRecordStatus::Authority(status);
                if certificate.status != cached {
                    certificate.set_status(cached);
                    if let Err(e) = self
                        .ctx
                        .certificate_store
                        .update_certificate(&certificate)
                        .await
                    {
                        log::warn!("Failed to refresh certificate {certificate_id}: {e}");
                    }
                }
                continue;
            }
            return Ok(Some(certificate));
        }
        Ok(None)
    }

    async fn request_certificate(&self, org_id: &str, name: &str) -> CoreResult<String> {
        let certificate_id = self
            .ctx
            .call_provider(
                "request_wildcard_certificate",
                self.ctx.edge_provider.request_wildcard_certificate(name),
            )
            .await?;

        let certificate = Certificate::requested(certificate_id.clone(), org_id, name);
        if let Err(e) = self
            .ctx
            .certificate_store
            .create_certificate(&certificate)
            .await
        {
            log::error!("Orphaned certificate {certificate_id} for {name}: store write failed: {e}");
            return Err(e);
        }
        Ok(certificate_id)
    }

    async fn create_pending(
        &self,
        org_id: &str,
        name: &str,
        certificate_id: String,
    ) -> CoreResult<Domain> {
        let domain = Domain::new_pending(name, org_id, certificate_id);
        if let Err(e) = self.ctx.domain_store.create_domain(&domain).await {
            log::error!(
                "Certificate {} requested for {name} has no domain record: {e}",
                domain.certificate_id.as_deref().unwrap_or_default()
            );
            return Err(e);
        }
        log::info!("Domain {name} requested by organization {org_id}");
        Ok(domain)
    }

    async fn mark_certificate_deployed(&self, certificate_id: &str) {
        let store = &self.ctx.certificate_store;
        match store.get_certificate(certificate_id).await {
            Ok(Some(mut certificate)) if certificate.status != CertificateRecordStatus::Deployed => {
                certificate.set_status(CertificateRecordStatus::Deployed);
                if let Err(e) = store.update_certificate(&certificate).await {
                    log::warn!("Failed to mark certificate {certificate_id} deployed: {e}");
                }
            }
            Ok(_) => {}
            Err(e) => log::warn!("Failed to load certificate {certificate_id}: {e}"),
        }
    }
}
