use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // domains 表
        manager
            .create_table(
                Table::create()
                    .table(Domain::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Domain::DomainName)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Domain::OrgId).string().not_null())
                    .col(ColumnDef::new(Domain::CertificateId).string().null())
                    .col(ColumnDef::new(Domain::CdnDistributionId).string().null())
                    .col(ColumnDef::new(Domain::DnsValue).string().null())
                    .col(ColumnDef::new(Domain::Status).string().not_null())
                    .col(ColumnDef::new(Domain::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Domain::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_domains_org_id")
                    .table(Domain::Table)
                    .col(Domain::OrgId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_domains_certificate_id")
                    .table(Domain::Table)
                    .col(Domain::CertificateId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // certificates 表
        manager
            .create_table(
                Table::create()
                    .table(Certificate::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Certificate::CertificateId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Certificate::OrgId).string().not_null())
                    .col(ColumnDef::new(Certificate::Name).string().not_null())
                    .col(ColumnDef::new(Certificate::CommonName).string().not_null())
                    .col(
                        ColumnDef::new(Certificate::AltNames)
                            .string()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Certificate::Status).string().not_null())
                    .col(ColumnDef::new(Certificate::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Certificate::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_certificates_org_id")
                    .table(Certificate::Table)
                    .col(Certificate::OrgId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // applications 表
        manager
            .create_table(
                Table::create()
                    .table(Application::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Application::AppId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Application::OrgId).string().not_null())
                    .col(ColumnDef::new(Application::DomainName).string().null())
                    .col(ColumnDef::new(Application::SubDomain).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_applications_domain_name")
                    .table(Application::Table)
                    .col(Application::DomainName)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Application::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Certificate::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Domain::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Domain {
    #[sea_orm(iden = "domains")]
    Table,
    DomainName,
    OrgId,
    CertificateId,
    CdnDistributionId,
    DnsValue,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Certificate {
    #[sea_orm(iden = "certificates")]
    Table,
    CertificateId,
    OrgId,
    Name,
    CommonName,
    AltNames,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Application {
    #[sea_orm(iden = "applications")]
    Table,
    AppId,
    OrgId,
    DomainName,
    SubDomain,
}
