use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Key/value store for storefront-wide settings, grouped for the admin screens
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub key: String,
    pub group: String,
    #[sea_orm(nullable)]
    pub value: Option<String>,
    pub setting_type: SettingType,
    pub label: String,
    #[sea_orm(nullable)]
    pub description: Option<String>,
    pub is_public: bool,
    #[sea_orm(column_type = "Json", nullable)]
    pub validation_rules: Option<Json>,
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    #[sea_orm(string_value = "text")]
    Text,
    #[sea_orm(string_value = "number")]
    Number,
    #[sea_orm(string_value = "boolean")]
    Boolean,
    #[sea_orm(string_value = "json")]
    Json,
}

impl Model {
    /// Interprets the raw string value according to the setting type.
    pub fn typed_value(&self) -> Value {
        let Some(raw) = self.value.as_deref() else {
            return Value::Null;
        };
        match self.setting_type {
            SettingType::Text => Value::String(raw.to_string()),
            SettingType::Boolean => Value::Bool(matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            )),
            SettingType::Number => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            SettingType::Json => serde_json::from_str(raw).unwrap_or(Value::Null),
        }
    }
}
