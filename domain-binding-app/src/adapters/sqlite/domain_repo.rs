//! `DomainStore` implementation for `SqliteStore`.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    SqlErr,
};

use domain_binding_core::error::{CoreError, CoreResult};
use domain_binding_core::traits::DomainStore;
use domain_binding_core::types::{Domain, DomainStatus};

use super::entity::domain;
use super::{SqliteStore, parse_timestamp};

impl domain::Model {
    /// Convert a `SeaORM` row model into a `Domain`.
    fn into_domain(self) -> CoreResult<Domain> {
        Ok(Domain {
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "updated_at")?,
            domain_name: self.domain_name,
            org_id: self.org_id,
            certificate_id: self.certificate_id,
            cdn_distribution_id: self.cdn_distribution_id,
            dns_value: self.dns_value,
            status: DomainStatus::from(self.status),
        })
    }
}

fn domain_to_active_model(domain: &Domain) -> domain::ActiveModel {
    domain::ActiveModel {
        domain_name: Set(domain.domain_name.clone()),
        org_id: Set(domain.org_id.clone()),
        certificate_id: Set(domain.certificate_id.clone()),
        cdn_distribution_id: Set(domain.cdn_distribution_id.clone()),
        dns_value: Set(domain.dns_value.clone()),
        status: Set(String::from(domain.status.clone())),
        created_at: Set(domain.created_at.to_rfc3339()),
        updated_at: Set(domain.updated_at.to_rfc3339()),
    }
}

fn storage_error(action: &str, e: &DbErr) -> CoreError {
    CoreError::StorageError(format!("Failed to {action}: {e}"))
}

#[async_trait]
impl DomainStore for SqliteStore {
    async fn get_domain(&self, domain_name: &str) -> CoreResult<Option<Domain>> {
        let row = domain::Entity::find_by_id(domain_name)
            .one(&self.db)
            .await
            .map_err(|e| storage_error("query domain", &e))?;

        row.map(domain::Model::into_domain).transpose()
    }

    async fn create_domain(&self, domain: &Domain) -> CoreResult<()> {
        match domain::Entity::insert(domain_to_active_model(domain))
            .exec(&self.db)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(CoreError::DomainNotAvailable(domain.domain_name.clone()))
            }
            Err(e) => Err(storage_error("insert domain", &e)),
        }
    }

    async fn update_domain(&self, domain: &Domain) -> CoreResult<()> {
        match domain_to_active_model(domain).update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => {
                Err(CoreError::DomainNotFound(domain.domain_name.clone()))
            }
            Err(e) => Err(storage_error("update domain", &e)),
        }
    }

    async fn delete_domain(&self, domain_name: &str) -> CoreResult<()> {
        domain::Entity::delete_by_id(domain_name)
            .exec(&self.db)
            .await
            .map_err(|e| storage_error("delete domain", &e))?;
        Ok(())
    }

    async fn list_domains(&self, org_id: &str) -> CoreResult<Vec<Domain>> {
        let rows = domain::Entity::find()
            .filter(domain::Column::OrgId.eq(org_id))
            .order_by_asc(domain::Column::DomainName)
            .all(&self.db)
            .await
            .map_err(|e| storage_error("query domains", &e))?;

        rows.into_iter().map(domain::Model::into_domain).collect()
    }

    async fn find_domains_by_certificate(&self, certificate_id: &str) -> CoreResult<Vec<Domain>> {
        let rows = domain::Entity::find()
            .filter(domain::Column::CertificateId.eq(certificate_id))
            .all(&self.db)
            .await
            .map_err(|e| storage_error("query domains", &e))?;

        rows.into_iter().map(domain::Model::into_domain).collect()
    }
}
