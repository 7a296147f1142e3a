//! 证书管理服务
//!
//! Upload writes provider-then-store; delete runs in the same order, so a
//! mid-failure leaves a visible store record rather than an untracked
//! provider certificate.

use std::sync::Arc;

use chrono::Utc;
use regex::Regex;

use domain_binding_provider::{ProviderError, UploadCertificateRequest};

use crate::error::{CoreError, CoreResult};
use crate::services::{ServiceContext, log_failure};
use crate::types::{Certificate, CertificateRecordStatus};

const PRIVATE_KEY_PEM: &str =
    r"-----BEGIN (?:RSA |EC )?PRIVATE KEY-----[\s\S]+-----END (?:RSA |EC )?PRIVATE KEY-----";

const CERTIFICATE_PEM: &str = r"-----BEGIN CERTIFICATE-----[\s\S]+-----END CERTIFICATE-----";

/// 证书管理服务
pub struct CertificateService {
    ctx: Arc<ServiceContext>,
}

impl CertificateService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// 上传证书
    pub async fn upload_certificate(
        &self,
        org_id: &str,
        mut request: UploadCertificateRequest,
    ) -> CoreResult<Certificate> {
        validate_upload(&mut request)?;

        let detail = self
            .ctx
            .call_provider(
                "upload_certificate",
                self.ctx.edge_provider.upload_certificate(&request),
            )
            .await?;

        let now = Utc::now();
        let certificate = Certificate {
            certificate_id: detail.certificate_id,
            org_id: org_id.to_string(),
            name: request.name,
            common_name: detail.domain_name,
            alt_names: detail.subject_alternative_names,
            status: CertificateRecordStatus::Authority(detail.status),
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self
            .ctx
            .certificate_store
            .create_certificate(&certificate)
            .await
        {
            log::error!(
                "Orphaned certificate {}: store write failed: {e}",
                certificate.certificate_id
            );
            return Err(e);
        }
        log::info!(
            "Uploaded certificate {} ({}) for organization {org_id}",
            certificate.certificate_id,
            certificate.common_name
        );
        Ok(certificate)
    }

    /// 获取证书
    pub async fn get_certificate(&self, org_id: &str, certificate_id: &str) -> CoreResult<Certificate> {
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
        Ok(certificate)
    }

    /// 列出组织下的证书
    pub async fn list_certificates(&self, org_id: &str) -> CoreResult<Vec<Certificate>> {
        let mut certificates = self.ctx.certificate_store.list_certificates(org_id).await?;
        certificates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(certificates)
    }

    /// 删除证书
    ///
    /// Refused while any domain references the certificate.
    pub async fn delete_certificate(&self, org_id: &str, certificate_id: &str) -> CoreResult<()> {
        let certificate = self.get_certificate(org_id, certificate_id).await?;

        let users = self
            .ctx
            .domain_store
            .find_domains_by_certificate(&certificate.certificate_id)
            .await?;
        if let Some(domain) = users.first() {
            log::warn!(
                "Certificate {certificate_id} is still used by {} domain(s), e.g. {}",
                users.len(),
                domain.domain_name
            );
            return Err(CoreError::CertificateInUse(certificate_id.to_string()));
        }

        match self
            .ctx
            .call_provider(
                "delete_certificate",
                self.ctx.edge_provider.delete_certificate(certificate_id),
            )
            .await
        {
            Ok(()) => {}
            Err(CoreError::Provider(ProviderError::ResourceNotFound { .. })) => {
                log::warn!("Certificate {certificate_id} already deleted at the authority");
            }
            Err(e) => {
                log_failure("Deleting certificate", certificate_id, &e);
                return Err(e);
            }
        }

        self.ctx
            .certificate_store
            .delete_certificate(certificate_id)
            .await?;
        log::info!("Deleted certificate {certificate_id}");
        Ok(())
    }
}

/// Reject empty or non-PEM material before it reaches the authority.
fn validate_upload(request: &mut UploadCertificateRequest) -> CoreResult<()> {
    if request.name.trim().is_empty() {
        return Err(CoreError::ValidationError(
            "certificate name must not be empty".to_string(),
        ));
    }
    if !pem_matches(PRIVATE_KEY_PEM, &request.private_key) {
        return Err(CoreError::ValidationError(
            "private key must be an unencrypted PEM private key".to_string(),
        ));
    }
    if !pem_matches(CERTIFICATE_PEM, &request.certificate_body) {
        return Err(CoreError::ValidationError(
            "certificate body must be a PEM certificate".to_string(),
        ));
    }
    if request
        .certificate_chain
        .as_deref()
        .is_some_and(|c| c.trim().is_empty())
    {
        request.certificate_chain = None;
    }
    if let Some(chain) = &request.certificate_chain
        && !pem_matches(CERTIFICATE_PEM, chain)
    {
        return Err(CoreError::ValidationError(
            "certificate chain must contain PEM certificates".to_string(),
        ));
    }
    request.name = request.name.trim().to_string();
    Ok(())
}

/// An uncompilable pattern rejects the input.
fn pem_matches(pattern: &str, text: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(text),
        Err(e) => {
            log::error!("Invalid PEM pattern: {e}");
            false
        }
    }
}
