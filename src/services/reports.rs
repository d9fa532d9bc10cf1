use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select, SelectTwo,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{
    asset,
    asset::{AssetCategory, AssetStatus},
    asset_request,
    asset_request::RequestStatus,
    department, user,
};
use crate::errors::ServiceError;

/// Filters applied to report queries as a logical AND. Assets filter their
/// purchase date against the range; requests filter their request date.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ReportFilter {
    pub department: Option<String>,
    pub category: Option<AssetCategory>,
    pub status: Option<AssetStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Summary statistics over the filtered asset and request sets.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssetSummaryReport {
    pub total_assets: u64,
    pub total_value: Decimal,
    /// `in_use / total × 100`, 0.0 when there are no assets
    pub utilization_rate: f64,
    /// Mean request-to-decision time across resolved requests, in hours;
    /// 0.0 when there are none
    pub avg_decision_hours: f64,
    pub resolved_requests: u64,
}

/// Grouping key for distribution reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DistributionKey {
    Category,
    Status,
    Department,
}

/// One bucket of a distribution report.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DistributionBucket {
    pub label: String,
    pub count: u64,
}

/// One row of the flat asset report consumed by external renderers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssetReportRow {
    pub asset_no: String,
    pub category: String,
    pub status: String,
    pub department: String,
    pub assigned_to: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_cost: Option<Decimal>,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub total_assets: u64,
    pub available_assets: u64,
    pub assigned_assets: u64,
    pub pending_requests: u64,
    #[schema(value_type = Vec<Object>)]
    pub recent_assets: Vec<asset::Model>,
    #[schema(value_type = Vec<Object>)]
    pub recent_requests: Vec<asset_request::Model>,
}

/// Service for report aggregation. Pure read-side: everything is re-derived
/// per call, with no cache, and reads are not isolated from concurrent
/// writes.
#[derive(Clone)]
pub struct ReportService {
    db_pool: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    fn asset_query(filter: &ReportFilter) -> Select<asset::Entity> {
        let mut query = asset::Entity::find();

        if let Some(name) = &filter.department {
            query = query
                .join(JoinType::InnerJoin, asset::Relation::Department.def())
                .filter(department::Column::Name.eq(name.clone()));
        }
        if let Some(category) = filter.category {
            query = query.filter(asset::Column::Category.eq(category));
        }
        if let Some(status) = filter.status {
            query = query.filter(asset::Column::Status.eq(status));
        }
        if let Some(start) = filter.start_date {
            query = query.filter(asset::Column::PurchaseDate.gte(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(asset::Column::PurchaseDate.lte(end));
        }

        query
    }

    fn request_query(filter: &ReportFilter) -> Select<asset_request::Entity> {
        let mut query = asset_request::Entity::find()
            .join(JoinType::InnerJoin, asset_request::Relation::Asset.def());

        if let Some(name) = &filter.department {
            query = query
                .join(JoinType::InnerJoin, asset::Relation::Department.def())
                .filter(department::Column::Name.eq(name.clone()));
        }
        if let Some(category) = filter.category {
            query = query.filter(asset::Column::Category.eq(category));
        }
        if let Some(status) = filter.status {
            query = query.filter(asset::Column::Status.eq(status));
        }
        if let Some(start) = filter.start_date {
            query = query.filter(
                asset_request::Column::RequestDate.gte(start.and_time(NaiveTime::MIN).and_utc()),
            );
        }
        if let Some(end) = filter.end_date {
            if let Some(end_of_day) = end.and_hms_opt(23, 59, 59) {
                query = query
                    .filter(asset_request::Column::RequestDate.lte(end_of_day.and_utc()));
            }
        }

        query
    }

    /// Variant of `asset_query` that also loads each asset's department.
    /// The department-name filter is applied to the related table directly,
    /// so the join is never duplicated.
    fn asset_query_with_department(
        filter: &ReportFilter,
    ) -> SelectTwo<asset::Entity, department::Entity> {
        let mut query = asset::Entity::find().find_also_related(department::Entity);

        if let Some(name) = &filter.department {
            query = query.filter(department::Column::Name.eq(name.clone()));
        }
        if let Some(category) = filter.category {
            query = query.filter(asset::Column::Category.eq(category));
        }
        if let Some(status) = filter.status {
            query = query.filter(asset::Column::Status.eq(status));
        }
        if let Some(start) = filter.start_date {
            query = query.filter(asset::Column::PurchaseDate.gte(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(asset::Column::PurchaseDate.lte(end));
        }

        query
    }

    /// Generates the summary report over the filtered sets.
    #[instrument(skip(self))]
    pub async fn asset_summary(
        &self,
        filter: &ReportFilter,
    ) -> Result<AssetSummaryReport, ServiceError> {
        let db = &*self.db_pool;

        let total_assets = Self::asset_query(filter).count(db).await?;

        let in_use = Self::asset_query(filter)
            .filter(asset::Column::Status.eq(AssetStatus::InUse))
            .count(db)
            .await?;

        let assets = Self::asset_query(filter).all(db).await?;
        let total_value: Decimal = assets
            .iter()
            .filter_map(|a| a.purchase_cost)
            .sum();

        let utilization_rate = if total_assets > 0 {
            (in_use as f64 / total_assets as f64) * 100.0
        } else {
            0.0
        };

        let resolved = Self::request_query(filter)
            .filter(asset_request::Column::Status.ne(RequestStatus::Pending))
            .all(db)
            .await?;

        let avg_decision_hours = if resolved.is_empty() {
            0.0
        } else {
            let total_secs: i64 = resolved
                .iter()
                .filter_map(|r| {
                    r.approval_date
                        .map(|decided| (decided - r.request_date).num_seconds())
                })
                .sum();
            (total_secs as f64 / resolved.len() as f64) / 3600.0
        };

        Ok(AssetSummaryReport {
            total_assets,
            total_value,
            utilization_rate,
            avg_decision_hours,
            resolved_requests: resolved.len() as u64,
        })
    }

    /// Groups the filtered assets by the requested key, with counts.
    #[instrument(skip(self))]
    pub async fn distribution(
        &self,
        filter: &ReportFilter,
        key: DistributionKey,
    ) -> Result<Vec<DistributionBucket>, ServiceError> {
        let db = &*self.db_pool;

        let rows = Self::asset_query_with_department(filter).all(db).await?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for (asset_model, department_model) in &rows {
            let label = match key {
                DistributionKey::Category => asset_model.category.label().to_string(),
                DistributionKey::Status => asset_model.status.label().to_string(),
                DistributionKey::Department => department_model
                    .as_ref()
                    .map(|d| d.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
            };
            *counts.entry(label).or_insert(0) += 1;
        }

        let mut buckets: Vec<DistributionBucket> = counts
            .into_iter()
            .map(|(label, count)| DistributionBucket { label, count })
            .collect();
        buckets.sort_by(|a, b| a.label.cmp(&b.label));

        Ok(buckets)
    }

    /// Produces the flat row sequence for external renderers.
    #[instrument(skip(self))]
    pub async fn asset_rows(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<AssetReportRow>, ServiceError> {
        let db = &*self.db_pool;

        let rows = Self::asset_query_with_department(filter)
            .order_by_asc(asset::Column::AssetNo)
            .all(db)
            .await?;

        let assigned_ids: Vec<Uuid> = rows
            .iter()
            .filter_map(|(asset_model, _)| asset_model.assigned_to)
            .collect();
        let users: HashMap<Uuid, user::Model> = user::Entity::find()
            .filter(user::Column::Id.is_in(assigned_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(rows
            .into_iter()
            .map(|(asset_model, department_model)| AssetReportRow {
                asset_no: asset_model.asset_no,
                category: asset_model.category.label().to_string(),
                status: asset_model.status.label().to_string(),
                department: department_model
                    .map(|d| d.name)
                    .unwrap_or_else(|| "Unknown".to_string()),
                assigned_to: asset_model
                    .assigned_to
                    .and_then(|id| users.get(&id))
                    .map(|u| u.username.clone()),
                purchase_date: asset_model.purchase_date,
                purchase_cost: asset_model.purchase_cost,
            })
            .collect())
    }

    /// Headline counts and recent activity for the dashboard.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardSummary, ServiceError> {
        let db = &*self.db_pool;

        let total_assets = asset::Entity::find().count(db).await?;
        let available_assets = asset::Entity::find()
            .filter(asset::Column::Status.eq(AssetStatus::Available))
            .count(db)
            .await?;
        let assigned_assets = asset::Entity::find()
            .filter(asset::Column::Status.eq(AssetStatus::InUse))
            .count(db)
            .await?;
        let pending_requests = asset_request::Entity::find()
            .filter(asset_request::Column::Status.eq(RequestStatus::Pending))
            .count(db)
            .await?;

        let recent_assets = asset::Entity::find()
            .order_by_desc(asset::Column::CreatedAt)
            .limit(5)
            .all(db)
            .await?;
        let recent_requests = asset_request::Entity::find()
            .order_by_desc(asset_request::Column::RequestDate)
            .limit(5)
            .all(db)
            .await?;

        Ok(DashboardSummary {
            total_assets,
            available_assets,
            assigned_assets,
            pending_requests,
            recent_assets,
            recent_requests,
        })
    }
}
