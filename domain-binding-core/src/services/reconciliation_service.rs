//! 状态同步服务
//!
//! Runs on list reads (subject to the [`RefreshPolicy`](crate::traits::RefreshPolicy))
//! or directly from a background poller. The store is a cache of provider
//! status: a change is written only when the polled status moves forward.
//! Any provider failure fails the whole pass.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use tokio::sync::RwLock;

use domain_binding_provider::CertificateStatus;

use crate::error::CoreResult;
use crate::services::{ServiceContext, log_failure};
use crate::types::{CertificateRecordStatus, Domain, DomainStatus, DomainView};

/// 状态同步服务
pub struct ReconciliationService {
    ctx: Arc<ServiceContext>,
    /// 域名 -> (组织, 最近一次轮询时间)，仅内存，不落库
    last_polled: RwLock<HashMap<String, (String, DateTime<Utc>)>>,
}

impl ReconciliationService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            ctx,
            last_polled: RwLock::new(HashMap::new()),
        }
    }

    /// 列出组织下的域名，按刷新策略轮询未完成的域名
    pub async fn list_domains(&self, org_id: &str) -> CoreResult<Vec<DomainView>> {
        self.run(org_id, false).await
    }

    /// 轮询组织下所有未完成的域名，忽略刷新策略
    pub async fn reconcile_organization(&self, org_id: &str) -> CoreResult<Vec<DomainView>> {
        self.run(org_id, true).await
    }

    /// Last time this process polled `domain_name`.
    pub async fn last_polled(&self, domain_name: &str) -> Option<DateTime<Utc>> {
        self.last_polled
            .read()
            .await
            .get(domain_name)
            .map(|(_, at)| *at)
    }

    async fn run(&self, org_id: &str, force: bool) -> CoreResult<Vec<DomainView>> {
        let domains = self.ctx.domain_store.list_domains(org_id).await?;
        let now = Utc::now();

        let due: Vec<bool> = {
            let mut polled = self.last_polled.write().await;
            // Names this org no longer lists were deleted.
            polled.retain(|name, (owner, _)| {
                owner.as_str() != org_id || domains.iter().any(|d| &d.domain_name == name)
            });
            domains
                .iter()
                .map(|d| {
                    force
                        || self.ctx.refresh_policy.should_poll(
                            polled.get(&d.domain_name).map(|(_, at)| *at),
                            now,
                        )
                })
                .collect()
        };

        let passes = domains.into_iter().zip(due).map(|(domain, poll)| async move {
            if poll {
                self.reconcile_domain(domain).await
            } else {
                Ok(Some(DomainView::from(domain)))
            }
        });

        match try_join_all(passes).await {
            Ok(views) => Ok(views.into_iter().flatten().collect()),
            Err(e) => {
                log_failure("Reconciling organization", org_id, &e);
                Err(e)
            }
        }
    }

    /// `None` if the domain was deleted while being polled.
    async fn reconcile_domain(&self, domain: Domain) -> CoreResult<Option<DomainView>> {
        match &domain.status {
            DomainStatus::Pending => self.poll_certificate(domain).await.map(Some),
            status if status.awaits_distribution() => self.poll_distribution(domain).await,
            _ => Ok(Some(DomainView::from(domain))),
        }
    }

    /// Attach the authority's status as a hint; the domain itself is not touched.
    async fn poll_certificate(&self, domain: Domain) -> CoreResult<DomainView> {
        let Some(certificate_id) = domain.certificate_id.clone() else {
            return Ok(DomainView::from(domain));
        };

        let status = self
            .ctx
            .call_provider(
                "get_certificate_status",
                self.ctx.edge_provider.get_certificate_status(&certificate_id),
            )
            .await?;
        self.mark_polled(&domain).await;
        self.sync_certificate(&certificate_id, &status).await?;

        Ok(DomainView {
            domain,
            certificate_status: Some(status),
        })
    }

    async fn poll_distribution(&self, domain: Domain) -> CoreResult<Option<DomainView>> {
        let Some(distribution_id) = domain.cdn_distribution_id.clone() else {
            log::warn!("{} is {} without a distribution", domain.domain_name, domain.status);
            return Ok(Some(DomainView::from(domain)));
        };

        let polled = DomainStatus::from(
            self.ctx
                .call_provider(
                    "get_cdn_distribution_status",
                    self.ctx
                        .edge_provider
                        .get_cdn_distribution_status(&distribution_id),
                )
                .await?,
        );
        self.mark_polled(&domain).await;

        if !domain.status.can_advance_to(&polled) {
            return Ok(Some(DomainView::from(domain)));
        }

        // Re-read under the lock; confirm or delete may have run meanwhile.
        let name = domain.domain_name;
        let _guard = self.ctx.domain_locks.acquire(&name).await;
        let Some(mut current) = self.ctx.domain_store.get_domain(&name).await? else {
            self.last_polled.write().await.remove(&name);
            return Ok(None);
        };
        if current.cdn_distribution_id.as_deref() == Some(distribution_id.as_str())
            && current.status.can_advance_to(&polled)
        {
            log::info!("{name}: {} -> {polled}", current.status);
            current.set_status(polled);
            self.ctx.domain_store.update_domain(&current).await?;
        }
        Ok(Some(DomainView::from(current)))
    }

    /// Refresh the cached certificate record when the authority's status changed.
    async fn sync_certificate(&self, certificate_id: &str, status: &CertificateStatus) -> CoreResult<()> {
        let store = &self.ctx.certificate_store;
        let Some(mut certificate) = store.get_certificate(certificate_id).await? else {
            return Ok(());
        };
        let next = CertificateRecordStatus::Authority(status.clone());
        if certificate.status == next || certificate.status == CertificateRecordStatus::Deployed {
            return Ok(());
        }
        certificate.set_status(next);
        store.update_certificate(&certificate).await
    }

    async fn mark_polled(&self, domain: &Domain) {
        self.last_polled.write().await.insert(
            domain.domain_name.clone(),
            (domain.org_id.clone(), Utc::now()),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::CoreError;
    use crate::test_utils::{
        TestHarness, TestOptions, create_test_context, create_test_context_with, seed_in_progress,
        seed_pending,
    };
    use crate::traits::{DomainStore, ExternalRefresh, MinPollInterval};
    use domain_binding_provider::{CdnStatus, ProviderError};

    fn service(h: &TestHarness) -> ReconciliationService {
        ReconciliationService::new(h.ctx.clone())
    }

    #[tokio::test]
    async fn in_progress_advances_to_deployed() {
        let h = create_test_context();
        seed_in_progress(&h, "org-1", "example.com", "dist-1", CdnStatus::Deployed).await;

        let views = service(&h).list_domains("org-1").await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].domain.status, DomainStatus::Deployed);
        assert_eq!(
            h.store.domain("example.com").await.unwrap().status,
            DomainStatus::Deployed
        );
        assert_eq!(
            h.log.store_writes().await,
            vec!["store.update_domain:example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn second_pass_writes_nothing() {
        let h = create_test_context();
        seed_in_progress(&h, "org-1", "a.com", "dist-1", CdnStatus::Deployed).await;
        seed_in_progress(&h, "org-1", "b.com", "dist-2", CdnStatus::InProgress).await;
        seed_pending(&h, "org-1", "c.com", "cert-c", CertificateStatus::Issued).await;
        let svc = service(&h);

        svc.list_domains("org-1").await.unwrap();
        let first = h.log.store_writes().await.len();
        assert!(first > 0);

        h.log.clear().await;
        svc.list_domains("org-1").await.unwrap();
        assert!(h.log.store_writes().await.is_empty());
    }

    #[tokio::test]
    async fn unchanged_in_progress_is_not_written() {
        let h = create_test_context();
        seed_in_progress(&h, "org-1", "example.com", "dist-1", CdnStatus::InProgress).await;

        service(&h).list_domains("org-1").await.unwrap();
        assert!(h.log.store_writes().await.is_empty());
        assert_eq!(
            h.log.matching("provider.get_cdn").await,
            vec!["provider.get_cdn_distribution_status:dist-1".to_string()]
        );
    }

    #[tokio::test]
    async fn deployed_is_never_polled_or_regressed() {
        let h = create_test_context();
        let mut domain =
            seed_in_progress(&h, "org-1", "example.com", "dist-1", CdnStatus::InProgress).await;
        domain.status = DomainStatus::Deployed;
        h.store.insert_domain(domain).await;

        let views = service(&h).list_domains("org-1").await.unwrap();
        assert_eq!(views[0].domain.status, DomainStatus::Deployed);
        assert!(h.log.matching("provider.").await.is_empty());
    }

    #[tokio::test]
    async fn unknown_cdn_status_is_kept_and_polled_again() {
        let h = create_test_context();
        seed_in_progress(
            &h,
            "org-1",
            "example.com",
            "dist-1",
            CdnStatus::Other("Suspended".into()),
        )
        .await;
        let svc = service(&h);

        let views = svc.list_domains("org-1").await.unwrap();
        assert_eq!(
            views[0].domain.status,
            DomainStatus::Other("Suspended".into())
        );

        h.provider
            .set_distribution_status("dist-1", CdnStatus::Deployed)
            .await;
        let views = svc.list_domains("org-1").await.unwrap();
        assert_eq!(views[0].domain.status, DomainStatus::Deployed);
    }

    #[tokio::test]
    async fn pending_gets_hint_without_domain_write() {
        let h = create_test_context();
        seed_pending(
            &h,
            "org-1",
            "example.com",
            "cert-1",
            CertificateStatus::PendingValidation,
        )
        .await;

        let views = service(&h).list_domains("org-1").await.unwrap();
        assert_eq!(views[0].domain.status, DomainStatus::Pending);
        assert_eq!(
            views[0].certificate_status,
            Some(CertificateStatus::PendingValidation)
        );
        // only the cached certificate record moves from Pending
        assert_eq!(
            h.log.store_writes().await,
            vec!["store.update_certificate:cert-1".to_string()]
        );
        assert_eq!(
            h.store.certificate("cert-1").await.unwrap().status,
            CertificateRecordStatus::Authority(CertificateStatus::PendingValidation)
        );
    }

    #[tokio::test]
    async fn provider_failure_fails_the_pass() {
        let h = create_test_context();
        seed_in_progress(&h, "org-1", "a.com", "dist-1", CdnStatus::Deployed).await;
        seed_in_progress(&h, "org-1", "b.com", "dist-2", CdnStatus::Deployed).await;
        h.provider
            .fail(
                "get_cdn_distribution_status",
                ProviderError::NetworkError {
                    provider: "mock".into(),
                    detail: "reset".into(),
                },
            )
            .await;

        let result = service(&h).list_domains("org-1").await;
        assert!(matches!(result, Err(CoreError::Provider(_))));
        assert!(h.log.store_writes().await.is_empty());
    }

    #[tokio::test]
    async fn only_own_domains_are_listed() {
        let h = create_test_context();
        seed_pending(&h, "org-1", "a.com", "cert-a", CertificateStatus::Issued).await;
        seed_pending(&h, "org-2", "b.com", "cert-b", CertificateStatus::Issued).await;

        let views = service(&h).list_domains("org-1").await.unwrap();
        let names: Vec<_> = views.iter().map(|v| v.domain.domain_name.as_str()).collect();
        assert_eq!(names, vec!["a.com"]);
    }

    #[tokio::test]
    async fn min_poll_interval_skips_recent_domains() {
        let h = create_test_context_with(TestOptions {
            refresh_policy: Arc::new(MinPollInterval(Duration::from_secs(3600))),
            ..TestOptions::default()
        });
        seed_in_progress(&h, "org-1", "example.com", "dist-1", CdnStatus::InProgress).await;
        let svc = service(&h);

        svc.list_domains("org-1").await.unwrap();
        assert!(svc.last_polled("example.com").await.is_some());
        svc.list_domains("org-1").await.unwrap();
        assert_eq!(h.log.matching("provider.").await.len(), 1);
    }

    #[tokio::test]
    async fn external_refresh_only_polls_on_reconcile() {
        let h = create_test_context_with(TestOptions {
            refresh_policy: Arc::new(ExternalRefresh),
            ..TestOptions::default()
        });
        seed_in_progress(&h, "org-1", "example.com", "dist-1", CdnStatus::Deployed).await;
        let svc = service(&h);

        let views = svc.list_domains("org-1").await.unwrap();
        assert_eq!(views[0].domain.status, DomainStatus::InProgress);
        assert!(h.log.matching("provider.").await.is_empty());

        let views = svc.reconcile_organization("org-1").await.unwrap();
        assert_eq!(views[0].domain.status, DomainStatus::Deployed);
    }

    #[tokio::test(start_paused = true)]
    async fn domain_deleted_mid_poll_is_dropped() {
        let h = create_test_context();
        seed_in_progress(&h, "org-1", "example.com", "dist-1", CdnStatus::Deployed).await;
        h.provider.set_delay(Some(Duration::from_millis(50))).await;
        let svc = service(&h);

        let (views, ()) = tokio::join!(svc.list_domains("org-1"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            h.store.delete_domain("example.com").await.unwrap();
        });

        assert!(views.unwrap().is_empty());
        assert!(h.store.domain("example.com").await.is_none());
        assert_eq!(
            h.log.store_writes().await,
            vec!["store.delete_domain:example.com".to_string()]
        );
        assert!(svc.last_polled("example.com").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn distribution_replaced_mid_poll_is_not_overwritten() {
        let h = create_test_context();
        let domain =
            seed_in_progress(&h, "org-1", "example.com", "dist-1", CdnStatus::Deployed).await;
        h.provider.set_delay(Some(Duration::from_millis(50))).await;
        let svc = service(&h);

        let (views, ()) = tokio::join!(svc.list_domains("org-1"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let mut replaced = domain.clone();
            replaced.cdn_distribution_id = Some("dist-2".into());
            replaced.dns_value = Some("dist-2.cloudfront.net".into());
            h.store.insert_domain(replaced).await;
        });

        let views = views.unwrap();
        assert_eq!(views[0].domain.cdn_distribution_id.as_deref(), Some("dist-2"));
        assert_eq!(views[0].domain.status, DomainStatus::InProgress);
        let stored = h.store.domain("example.com").await.unwrap();
        assert_eq!(stored.cdn_distribution_id.as_deref(), Some("dist-2"));
        assert_eq!(stored.status, DomainStatus::InProgress);
        assert!(h.log.store_writes().await.is_empty());
    }

    #[tokio::test]
    async fn poll_times_of_deleted_domains_are_pruned() {
        let h = create_test_context();
        seed_in_progress(&h, "org-1", "a.com", "dist-1", CdnStatus::InProgress).await;
        seed_in_progress(&h, "org-1", "b.com", "dist-2", CdnStatus::InProgress).await;
        seed_in_progress(&h, "org-2", "c.com", "dist-3", CdnStatus::InProgress).await;
        let svc = service(&h);

        svc.list_domains("org-1").await.unwrap();
        svc.list_domains("org-2").await.unwrap();
        assert!(svc.last_polled("a.com").await.is_some());

        h.store.delete_domain("a.com").await.unwrap();
        svc.list_domains("org-1").await.unwrap();

        assert!(svc.last_polled("a.com").await.is_none());
        assert!(svc.last_polled("b.com").await.is_some());
        // other organizations keep their entries
        assert!(svc.last_polled("c.com").await.is_some());
    }
}
