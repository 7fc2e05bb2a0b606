//! Site configuration entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::ConfigEntry;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "config")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub config_key: String,
    pub config_value: Json,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ConfigEntry {
    fn from(model: Model) -> Self {
        ConfigEntry {
            config_key: model.config_key,
            config_value: model.config_value,
            description: model.description,
            is_public: model.is_public,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
