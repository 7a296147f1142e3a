//! In-memory store
//!
//! Implements all three store traits over `HashMap`s. Data is lost when the
//! process exits; intended for tests and single-process demos.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use domain_binding_core::error::{CoreError, CoreResult};
use domain_binding_core::traits::{ApplicationStore, CertificateStore, DomainStore};
use domain_binding_core::types::{AppBinding, Certificate, Domain};

#[derive(Default)]
pub struct InMemoryStore {
    domains: RwLock<HashMap<String, Domain>>,
    certificates: RwLock<HashMap<String, Certificate>>,
    applications: RwLock<HashMap<String, AppBinding>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an application so it can later be found by its bound domain.
    pub async fn insert_application(&self, app: AppBinding) {
        self.applications
            .write()
            .await
            .insert(app.app_id.clone(), app);
    }

    pub async fn get_application(&self, app_id: &str) -> Option<AppBinding> {
        self.applications.read().await.get(app_id).cloned()
    }
}

#[async_trait]
impl DomainStore for InMemoryStore {
    async fn get_domain(&self, domain_name: &str) -> CoreResult<Option<Domain>> {
        Ok(self.domains.read().await.get(domain_name).cloned())
    }

    async fn create_domain(&self, domain: &Domain) -> CoreResult<()> {
        let mut domains = self.domains.write().await;
        if domains.contains_key(&domain.domain_name) {
            return Err(CoreError::DomainNotAvailable(domain.domain_name.clone()));
        }
        domains.insert(domain.domain_name.clone(), domain.clone());
        Ok(())
    }

    async fn update_domain(&self, domain: &Domain) -> CoreResult<()> {
        let mut domains = self.domains.write().await;
        match domains.get_mut(&domain.domain_name) {
            Some(slot) => {
                *slot = domain.clone();
                Ok(())
            }
            None => Err(CoreError::DomainNotFound(domain.domain_name.clone())),
        }
    }

    async fn delete_domain(&self, domain_name: &str) -> CoreResult<()> {
        self.domains.write().await.remove(domain_name);
        Ok(())
    }

    async fn list_domains(&self, org_id: &str) -> CoreResult<Vec<Domain>> {
        let mut list: Vec<Domain> = self
            .domains
            .read()
            .await
            .values()
            .filter(|d| d.org_id == org_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.domain_name.cmp(&b.domain_name));
        Ok(list)
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
impl CertificateStore for InMemoryStore {
    async fn get_certificate(&self, certificate_id: &str) -> CoreResult<Option<Certificate>> {
        Ok(self.certificates.read().await.get(certificate_id).cloned())
    }

    async fn create_certificate(&self, certificate: &Certificate) -> CoreResult<()> {
        self.certificates
            .write()
            .await
            .insert(certificate.certificate_id.clone(), certificate.clone());
        Ok(())
    }

    async fn update_certificate(&self, certificate: &Certificate) -> CoreResult<()> {
        self.create_certificate(certificate).await
    }

    async fn delete_certificate(&self, certificate_id: &str) -> CoreResult<()> {
        self.certificates.write().await.remove(certificate_id);
        Ok(())
    }

    async fn list_certificates(&self, org_id: &str) -> CoreResult<Vec<Certificate>> {
        let mut list: Vec<Certificate> = self
            .certificates
            .read()
            .await
            .values()
            .filter(|c| c.org_id == org_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(list)
    }
}

#[async_trait]
impl ApplicationStore for InMemoryStore {
    async fn get_apps_by_domain(&self, domain_name: &str) -> CoreResult<Vec<AppBinding>> {
        let mut apps: Vec<AppBinding> = self
            .applications
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
        self.insert_application(app.clone()).await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use domain_binding_core::types::DomainStatus;

    fn pending(name: &str, org: &str) -> Domain {
        Domain::new_pending(name, org, "cert-1")
    }

    #[tokio::test]
    async fn create_rejects_duplicate_name() {
        let store = InMemoryStore::new();
        store.create_domain(&pending("example.com", "org-a")).await.unwrap();

        let err = store
            .create_domain(&pending("example.com", "org-b"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DomainNotAvailable(n) if n == "example.com"));
    }

    #[tokio::test]
    async fn update_requires_existing_record() {
        let store = InMemoryStore::new();
        let mut domain = pending("example.com", "org-a");
        assert!(matches!(
            store.update_domain(&domain).await,
            Err(CoreError::DomainNotFound(_))
        ));

        store.create_domain(&domain).await.unwrap();
        domain.set_status(DomainStatus::InProgress);
        store.update_domain(&domain).await.unwrap();
        let stored = store.get_domain("example.com").await.unwrap().unwrap();
        assert_eq!(stored.status, DomainStatus::InProgress);
    }

    #[tokio::test]
    async fn lists_are_scoped_to_organization() {
        let store = InMemoryStore::new();
        store.create_domain(&pending("b.com", "org-a")).await.unwrap();
        store.create_domain(&pending("a.com", "org-a")).await.unwrap();
        store.create_domain(&pending("c.com", "org-b")).await.unwrap();

        let names: Vec<_> = store
            .list_domains("org-a")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.domain_name)
            .collect();
        assert_eq!(names, vec!["a.com", "b.com"]);
        assert_eq!(store.find_domains_by_certificate("cert-1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn apps_found_by_bound_domain() {
        let store = InMemoryStore::new();
        store
            .insert_application(AppBinding {
                app_id: "app-1".into(),
                org_id: "org-a".into(),
                domain_name: Some("example.com".into()),
                sub_domain: Some("www".into()),
            })
            .await;

        let mut apps = store.get_apps_by_domain("example.com").await.unwrap();
        assert_eq!(apps.len(), 1);

        apps[0].clear_domain();
        store.update_application(&apps[0]).await.unwrap();
        assert!(store.get_apps_by_domain("example.com").await.unwrap().is_empty());
        assert!(!store.get_application("app-1").await.unwrap().is_bound());
    }
}
