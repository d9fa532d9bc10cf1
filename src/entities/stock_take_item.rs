use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One line of a stock-take session, snapshotted per asset present in the
/// department when the session opened.
///
/// `counted` distinguishes "counted as zero" (asset missing, a mismatch)
/// from "not yet counted".
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_take_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub stock_take_id: Uuid,

    pub asset_id: Uuid,

    pub expected_quantity: i32,

    pub actual_quantity: i32,

    pub counted: bool,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock_take::Entity",
        from = "Column::StockTakeId",
        to = "super::stock_take::Column::Id",
        on_delete = "Cascade"
    )]
    StockTake,
    #[sea_orm(
        belongs_to = "super::asset::Entity",
        from = "Column::AssetId",
        to = "super::asset::Column::Id",
        on_delete = "Cascade"
    )]
    Asset,
}

impl Related<super::stock_take::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockTake.def()
    }
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
