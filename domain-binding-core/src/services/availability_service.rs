//! 域名可用性检查
//!
//! Legacy registry, then store, then registrant lookup. Each phase can end
//! the check.

use std::sync::Arc;

use domain_binding_provider::CertificateStatus;

use crate::error::{CoreError, CoreResult};
use crate::services::{RegistrantLookupService, ServiceContext};
use crate::types::{AvailabilityResult, Domain, DomainStatus, ValidationHint};

/// 域名可用性检查服务
pub struct AvailabilityService {
    ctx: Arc<ServiceContext>,
    registrant: RegistrantLookupService,
}

impl AvailabilityService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            registrant: RegistrantLookupService::new(ctx.clone()),
            ctx,
        }
    }

    /// Classify `domain_name` for `org_id` as available, resumable or taken.
    ///
    /// An available name without a WHOIS record fails with `NoWhoisRecord`
    /// (carrying `available: true`).
    pub async fn check_availability(
        &self,
        org_id: &str,
        domain_name: &str,
    ) -> CoreResult<AvailabilityResult> {
        let name = self.ctx.validated_name(domain_name)?;

        if self.ctx.legacy_registry.is_registered(&name).await? {
            return Err(CoreError::LegacyDomainRegistered(name));
        }

        if let Some(existing) = self.ctx.domain_store.get_domain(&name).await? {
            if !existing.is_owned_by(org_id) {
                log::debug!("{name} is held by another organization");
                return Ok(AvailabilityResult::taken(&name));
            }
            let hint = self.validation_hint(&existing).await?;
            return Ok(AvailabilityResult::resumable(existing, hint));
        }

        match self.registrant.lookup(&name).await? {
            Some(whois) => Ok(AvailabilityResult::available(whois)),
            None => Err(CoreError::NoWhoisRecord {
                domain: name,
                available: true,
            }),
        }
    }

    /// Current validation state of a resumable domain's certificate.
    async fn validation_hint(&self, domain: &Domain) -> CoreResult<Option<ValidationHint>> {
        let (DomainStatus::Pending, Some(certificate_id)) =
            (&domain.status, domain.certificate_id.as_deref())
        else {
            return Ok(None);
        };

        let status = self
            .ctx
            .call_provider(
                "get_certificate_status",
                self.ctx.edge_provider.get_certificate_status(certificate_id),
            )
            .await?;
        Ok(match status {
            CertificateStatus::PendingValidation => Some(ValidationHint::CertNotApproved),
            CertificateStatus::ValidationTimedOut => Some(ValidationHint::ValidationTimedOut),
            _ => None,
        })
    }
}
