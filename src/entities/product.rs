use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Product entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Product name
    #[validate(length(
        min = 1,
        max = 255,
        message = "Product name must be between 1 and 255 characters"
    ))]
    pub name: String,

    /// SKU (Stock Keeping Unit); variant SKUs fall back to a slug of the name when absent
    #[validate(length(
        min = 1,
        max = 100,
        message = "SKU must be between 1 and 100 characters"
    ))]
    pub sku: Option<String>,

    /// Product description
    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,

    /// Base price, used by variants without a price override
    pub base_price: Decimal,

    pub product_type: ProductType,

    pub status: ProductStatus,

    /// Own stock; only meaningful for simple products
    pub stock_quantity: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::commerce::product_variant::Entity")]
    Variants,
    #[sea_orm(has_many = "super::commerce::product_image::Entity")]
    Images,
    #[sea_orm(has_many = "super::commerce::product_attribute::Entity")]
    ProductAttributes,
}

impl Related<super::commerce::product_variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variants.def()
    }
}

impl Related<super::commerce::product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::commerce::product_attribute::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductAttributes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Whether a product is sold as-is or through attribute-driven variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[sea_orm(string_value = "simple")]
    Simple,
    #[sea_orm(string_value = "variable")]
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

impl Model {
    pub fn is_variable(&self) -> bool {
        self.product_type == ProductType::Variable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(product_type: ProductType) -> Model {
        Model {
            id: Uuid::new_v4(),
            name: "Classic Tee".to_string(),
            sku: Some("TEE".to_string()),
            description: None,
            base_price: dec!(19.99),
            product_type,
            status: ProductStatus::Active,
            stock_quantity: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn product_type_flags() {
        assert!(product(ProductType::Variable).is_variable());
        assert!(!product(ProductType::Simple).is_variable());
    }

    #[test]
    fn product_type_serializes_lowercase() {
        let json = serde_json::to_string(&ProductType::Variable).unwrap();
        assert_eq!(json, "\"variable\"");
    }
}
