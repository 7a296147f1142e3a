//! `ApplicationStore` implementation for `SqliteStore`.

use async_trait::async_trait;
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use domain_binding_core::error::{CoreError, CoreResult};
use domain_binding_core::traits::ApplicationStore;
use domain_binding_core::types::AppBinding;

use super::SqliteStore;
use super::entity::application;

impl From<application::Model> for AppBinding {
    fn from(row: application::Model) -> Self {
        Self {
            app_id: row.app_id,
            org_id: row.org_id,
            domain_name: row.domain_name,
            sub_domain: row.sub_domain,
        }
    }
}

#[async_trait]
impl ApplicationStore for SqliteStore {
    async fn get_apps_by_domain(&self, domain_name: &str) -> CoreResult<Vec<AppBinding>> {
        let rows = application::Entity::find()
            .filter(application::Column::DomainName.eq(domain_name))
            .order_by_asc(application::Column::AppId)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query applications: {e}")))?;

        Ok(rows.into_iter().map(AppBinding::from).collect())
    }

    async fn update_application(&self, app: &AppBinding) -> CoreResult<()> {
        let active_model = application::ActiveModel {
            app_id: Set(app.app_id.clone()),
            org_id: Set(app.org_id.clone()),
            domain_name: Set(app.domain_name.clone()),
            sub_domain: Set(app.sub_domain.clone()),
        };

        application::Entity::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(application::Column::AppId)
                    .update_columns([
                        application::Column::DomainName,
                        application::Column::SubDomain,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to save application: {e}")))?;

        Ok(())
    }
}
