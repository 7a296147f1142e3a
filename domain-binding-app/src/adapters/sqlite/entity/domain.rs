//! `SeaORM` entity for the `domains` table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "domains")]
/// Database row model for a custom domain.
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub domain_name: String,
    pub org_id: String,
    pub certificate_id: Option<String>,
    pub cdn_distribution_id: Option<String>,
    pub dns_value: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
