//! `CertificateStore` implementation for `SqliteStore`.

use async_trait::async_trait;
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use domain_binding_core::error::{CoreError, CoreResult};
use domain_binding_core::traits::CertificateStore;
use domain_binding_core::types::{Certificate, CertificateRecordStatus};

use super::entity::certificate;
use super::{SqliteStore, parse_timestamp};

impl certificate::Model {
    fn into_certificate(self) -> CoreResult<Certificate> {
        let alt_names: Vec<String> = serde_json::from_str(&self.alt_names)
            .map_err(|e| CoreError::StorageError(format!("Invalid alt_names JSON: {e}")))?;

        Ok(Certificate {
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "updated_at")?,
            certificate_id: self.certificate_id,
            org_id: self.org_id,
            name: self.name,
            common_name: self.common_name,
            alt_names,
            status: CertificateRecordStatus::from(self.status),
        })
    }
}

fn certificate_to_active_model(certificate: &Certificate) -> CoreResult<certificate::ActiveModel> {
    let alt_names = serde_json::to_string(&certificate.alt_names)
        .map_err(|e| CoreError::StorageError(e.to_string()))?;

    Ok(certificate::ActiveModel {
        certificate_id: Set(certificate.certificate_id.clone()),
        org_id: Set(certificate.org_id.clone()),
        name: Set(certificate.name.clone()),
        common_name: Set(certificate.common_name.clone()),
        alt_names: Set(alt_names),
        status: Set(String::from(certificate.status.clone())),
        created_at: Set(certificate.created_at.to_rfc3339()),
        updated_at: Set(certificate.updated_at.to_rfc3339()),
    })
}

impl SqliteStore {
    async fn upsert_certificate(&self, certificate: &Certificate) -> CoreResult<()> {
        certificate::Entity::insert(certificate_to_active_model(certificate)?)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(certificate::Column::CertificateId)
                    .update_columns([
                        certificate::Column::Name,
                        certificate::Column::CommonName,
                        certificate::Column::AltNames,
                        certificate::Column::Status,
                        certificate::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to save certificate: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl CertificateStore for SqliteStore {
    async fn get_certificate(&self, certificate_id: &str) -> CoreResult<Option<Certificate>> {
        let row = certificate::Entity::find_by_id(certificate_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query certificate: {e}")))?;

        row.map(certificate::Model::into_certificate).transpose()
    }

    async fn create_certificate(&self, certificate: &Certificate) -> CoreResult<()> {
        self.upsert_certificate(certificate).await
    }

    async fn update_certificate(&self, certificate: &Certificate) -> CoreResult<()> {
        self.upsert_certificate(certificate).await
    }

    async fn delete_certificate(&self, certificate_id: &str) -> CoreResult<()> {
        certificate::Entity::delete_by_id(certificate_id)
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to delete certificate: {e}")))?;
        Ok(())
    }

    async fn list_certificates(&self, org_id: &str) -> CoreResult<Vec<Certificate>> {
        let rows = certificate::Entity::find()
            .filter(certificate::Column::OrgId.eq(org_id))
            .order_by_asc(certificate::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query certificates: {e}")))?;

        rows.into_iter()
            .map(certificate::Model::into_certificate)
            .collect()
    }
}
