use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::AttributePair;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_images")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id: Uuid,

    #[sea_orm(column_type = "Uuid")]
    pub product_id: Uuid,

    pub image_url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
    pub is_primary: bool,

    /// JSON array of `{attribute_id, attribute_value_id}`; null or empty marks a general image
    #[sea_orm(column_type = "Json", nullable)]
    pub attribute_combination: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::super::product::Entity",
        from = "Column::ProductId",
        to = "super::super::product::Column::Id"
    )]
    Product,
}

impl Related<super::super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decodes the stored attribute combination.
    pub fn attribute_pairs(&self) -> Result<Vec<AttributePair>, serde_json::Error> {
        match &self.attribute_combination {
            None | Some(Json::Null) => Ok(Vec::new()),
            Some(raw) => serde_json::from_value(raw.clone()),
        }
    }

    pub fn is_general(&self) -> bool {
        match &self.attribute_combination {
            None | Some(Json::Null) => true,
            Some(Json::Array(items)) => items.is_empty(),
            Some(_) => false,
        }
    }

    pub fn is_attribute_specific(&self) -> bool {
        !self.is_general()
    }
}
