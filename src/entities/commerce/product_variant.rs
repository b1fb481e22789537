use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One purchasable combination of attribute values of a variable product.
///
/// Rows are written only by variant reconciliation; the set of attached
/// `product_variant_attributes` forms the variant's signature.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_variants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    #[sea_orm(unique)]
    pub sku: String,
    /// Falls back to the product base price when absent
    #[sea_orm(nullable)]
    pub price_override: Option<Decimal>,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::super::product::Entity",
        from = "Column::ProductId",
        to = "super::super::product::Column::Id"
    )]
    Product,
    #[sea_orm(has_many = "super::product_variant_attribute::Entity")]
    VariantAttributes,
}

impl Related<super::super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::product_variant_attribute::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VariantAttributes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Price charged for this variant given the owning product's base price
    pub fn effective_price(&self, base_price: Decimal) -> Decimal {
        self.price_override.unwrap_or(base_price)
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}
