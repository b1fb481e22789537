use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::common::AttributePair;

/// Attachment of one (attribute, value) pair to a variant
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_variant_attributes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub variant_id: Uuid,
    pub attribute_id: Uuid,
    pub attribute_value_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product_variant::Entity",
        from = "Column::VariantId",
        to = "super::product_variant::Column::Id"
    )]
    ProductVariant,
}

impl Related<super::product_variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductVariant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn pair(&self) -> AttributePair {
        AttributePair::new(self.attribute_id, self.attribute_value_id)
    }
}
