use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_catalog_tables::Migration),
            Box::new(m20240101_000002_create_variant_tables::Migration),
            Box::new(m20240101_000003_create_product_images_table::Migration),
            Box::new(m20240101_000004_create_site_settings_table::Migration),
        ]
    }
}

mod m20240101_000001_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Attributes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Attributes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Attributes::Name).string().not_null())
                        .col(
                            ColumnDef::new(Attributes::Slug)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Attributes::Description).text().null())
                        .col(
                            ColumnDef::new(Attributes::AttributeType)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Attributes::IsRequired)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Attributes::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Attributes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Attributes::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AttributeValues::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AttributeValues::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AttributeValues::AttributeId).uuid().not_null())
                        .col(ColumnDef::new(AttributeValues::Value).string().not_null())
                        .col(ColumnDef::new(AttributeValues::Hex).string_len(7).null())
                        .col(
                            ColumnDef::new(AttributeValues::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(AttributeValues::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AttributeValues::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_attribute_values_attribute_id")
                                .from(AttributeValues::Table, AttributeValues::AttributeId)
                                .to(Attributes::Table, Attributes::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_attribute_values_attribute_id")
                        .table(AttributeValues::Table)
                        .col(AttributeValues::AttributeId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Sku).string().null())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(
                            ColumnDef::new(Products::BasePrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::ProductType)
                                .string_len(20)
                                .not_null()
                                .default("simple"),
                        )
                        .col(
                            ColumnDef::new(Products::Status)
                                .string_len(20)
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(Products::StockQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_product_type")
                        .table(Products::Table)
                        .col(Products::ProductType)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductAttributes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductAttributes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductAttributes::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(ProductAttributes::AttributeId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductAttributes::AttributeValueId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductAttributes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_attributes_product_id")
                                .from(ProductAttributes::Table, ProductAttributes::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_attributes_attribute_id")
                                .from(ProductAttributes::Table, ProductAttributes::AttributeId)
                                .to(Attributes::Table, Attributes::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_attributes_attribute_value_id")
                                .from(
                                    ProductAttributes::Table,
                                    ProductAttributes::AttributeValueId,
                                )
                                .to(AttributeValues::Table, AttributeValues::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_product_attributes_product_id")
                        .table(ProductAttributes::Table)
                        .col(ProductAttributes::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_product_attributes_unique_selection")
                        .table(ProductAttributes::Table)
                        .col(ProductAttributes::ProductId)
                        .col(ProductAttributes::AttributeValueId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductAttributes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AttributeValues::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Attributes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Attributes {
        Table,
        Id,
        Name,
        Slug,
        Description,
        AttributeType,
        IsRequired,
        SortOrder,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum AttributeValues {
        Table,
        Id,
        AttributeId,
        Value,
        Hex,
        SortOrder,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        Name,
        Sku,
        Description,
        BasePrice,
        ProductType,
        Status,
        StockQuantity,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ProductAttributes {
        Table,
        Id,
        ProductId,
        AttributeId,
        AttributeValueId,
        CreatedAt,
    }
}

mod m20240101_000002_create_variant_tables {

    use super::m20240101_000001_create_catalog_tables::{AttributeValues, Attributes, Products};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_variant_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductVariants::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductVariants::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductVariants::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(ProductVariants::Sku)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::PriceOverride)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::StockQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_variants_product_id")
                                .from(ProductVariants::Table, ProductVariants::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_product_variants_product_id")
                        .table(ProductVariants::Table)
                        .col(ProductVariants::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductVariantAttributes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductVariantAttributes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductVariantAttributes::VariantId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductVariantAttributes::AttributeId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductVariantAttributes::AttributeValueId)
                                .uuid()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_variant_attributes_variant_id")
                                .from(
                                    ProductVariantAttributes::Table,
                                    ProductVariantAttributes::VariantId,
                                )
                                .to(ProductVariants::Table, ProductVariants::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_variant_attributes_attribute_id")
                                .from(
                                    ProductVariantAttributes::Table,
                                    ProductVariantAttributes::AttributeId,
                                )
                                .to(Attributes::Table, Attributes::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_variant_attributes_attribute_value_id")
                                .from(
                                    ProductVariantAttributes::Table,
                                    ProductVariantAttributes::AttributeValueId,
                                )
                                .to(AttributeValues::Table, AttributeValues::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_variant_attributes_variant_id")
                        .table(ProductVariantAttributes::Table)
                        .col(ProductVariantAttributes::VariantId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(ProductVariantAttributes::Table)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(Table::drop().table(ProductVariants::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ProductVariants {
        Table,
        Id,
        ProductId,
        Sku,
        PriceOverride,
        StockQuantity,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ProductVariantAttributes {
        Table,
        Id,
        VariantId,
        AttributeId,
        AttributeValueId,
    }
}

mod m20240101_000003_create_product_images_table {

    use super::m20240101_000001_create_catalog_tables::Products;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_product_images_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductImages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductImages::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductImages::ProductId).uuid().not_null())
                        .col(ColumnDef::new(ProductImages::ImageUrl).string().not_null())
                        .col(ColumnDef::new(ProductImages::AltText).string().null())
                        .col(
                            ColumnDef::new(ProductImages::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductImages::IsPrimary)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ProductImages::AttributeCombination)
                                .json()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_images_product_id")
                                .from(ProductImages::Table, ProductImages::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_product_images_product_sort")
                        .table(ProductImages::Table)
                        .col(ProductImages::ProductId)
                        .col(ProductImages::SortOrder)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductImages::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ProductImages {
        Table,
        Id,
        ProductId,
        ImageUrl,
        AltText,
        SortOrder,
        IsPrimary,
        AttributeCombination,
    }
}

mod m20240101_000004_create_site_settings_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_site_settings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SiteSettings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SiteSettings::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SiteSettings::Key)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(SiteSettings::Group).string().not_null())
                        .col(ColumnDef::new(SiteSettings::Value).text().null())
                        .col(
                            ColumnDef::new(SiteSettings::SettingType)
                                .string_len(20)
                                .not_null()
                                .default("text"),
                        )
                        .col(ColumnDef::new(SiteSettings::Label).string().not_null())
                        .col(ColumnDef::new(SiteSettings::Description).text().null())
                        .col(
                            ColumnDef::new(SiteSettings::IsPublic)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(SiteSettings::ValidationRules).json().null())
                        .col(
                            ColumnDef::new(SiteSettings::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_site_settings_group")
                        .table(SiteSettings::Table)
                        .col(SiteSettings::Group)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SiteSettings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum SiteSettings {
        Table,
        Id,
        Key,
        Group,
        Value,
        SettingType,
        Label,
        Description,
        IsPublic,
        ValidationRules,
        SortOrder,
    }
}
