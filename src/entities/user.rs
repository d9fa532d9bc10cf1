use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A staff account. Authentication happens at the HTTP layer; workflow
/// operations only ever see the resolved user id and admin flag.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub username: String,

    pub full_name: Option<String>,

    pub email: Option<String>,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub is_admin: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::asset_request::Entity")]
    Requests,
    #[sea_orm(has_many = "super::asset::Entity")]
    AssignedAssets,
}

impl Related<super::asset_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requests.def()
    }
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignedAssets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
