use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Asset category enumeration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    #[sea_orm(string_value = "furniture")]
    Furniture,

    #[sea_orm(string_value = "technology")]
    Technology,

    #[sea_orm(string_value = "vehicles")]
    Vehicles,

    #[sea_orm(string_value = "office_supplies")]
    OfficeSupplies,

    #[sea_orm(string_value = "machinery")]
    Machinery,
}

impl AssetCategory {
    /// Machine-readable code embedded in asset numbers.
    pub fn code(&self) -> &'static str {
        match self {
            AssetCategory::Furniture => "furniture",
            AssetCategory::Technology => "technology",
            AssetCategory::Vehicles => "vehicles",
            AssetCategory::OfficeSupplies => "office_supplies",
            AssetCategory::Machinery => "machinery",
        }
    }

    /// Human-readable label used in report rows.
    pub fn label(&self) -> &'static str {
        match self {
            AssetCategory::Furniture => "Furniture",
            AssetCategory::Technology => "Technology",
            AssetCategory::Vehicles => "Vehicles",
            AssetCategory::OfficeSupplies => "Office Supplies",
            AssetCategory::Machinery => "Machinery / Equipment",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Asset status enumeration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    #[sea_orm(string_value = "available")]
    Available,

    #[sea_orm(string_value = "in_use")]
    InUse,

    #[sea_orm(string_value = "maintenance")]
    Maintenance,

    #[sea_orm(string_value = "retired")]
    Retired,
}

impl AssetStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AssetStatus::Available => "Available",
            AssetStatus::InUse => "In Use",
            AssetStatus::Maintenance => "Under Maintenance",
            AssetStatus::Retired => "Retired",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A tracked organizational asset. `asset_no` is assigned exactly once at
/// creation time and never changes afterwards.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub asset_no: String,

    pub category: AssetCategory,

    pub status: AssetStatus,

    pub department_id: Uuid,

    pub assigned_to: Option<Uuid>,

    pub serial_no: Option<String>,

    pub purchase_date: Option<NaiveDate>,

    pub purchase_cost: Option<Decimal>,

    /// Depreciation rate in %
    pub depreciation: Option<Decimal>,

    pub supplier: Option<String>,

    pub warranty: Option<String>,

    pub condition: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Opaque path into external blob storage.
    pub image_path: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id",
        on_delete = "Cascade"
    )]
    Department,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedTo",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    AssignedUser,
    #[sea_orm(has_many = "super::asset_request::Entity")]
    Requests,
    #[sea_orm(has_many = "super::stock_take_item::Entity")]
    StockTakeItems,
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignedUser.def()
    }
}

impl Related<super::asset_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requests.def()
    }
}

impl Related<super::stock_take_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockTakeItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
