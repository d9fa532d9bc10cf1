use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{
    asset,
    asset::{AssetCategory, AssetStatus},
    department,
};
use crate::errors::{self, ServiceError};
use crate::events::{Event, EventSender};
use crate::services::asset_numbers::{AssetNumberGenerator, MAX_GENERATION_ATTEMPTS};

/// Input for creating an asset. Department and category are required to
/// allocate the asset number; everything else is descriptive.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAssetInput {
    pub department_id: Option<Uuid>,
    pub category: Option<AssetCategory>,
    #[validate(length(max = 100))]
    pub serial_no: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_cost: Option<Decimal>,
    /// Depreciation rate in %
    pub depreciation: Option<Decimal>,
    #[validate(length(max = 255))]
    pub supplier: Option<String>,
    #[validate(length(max = 100))]
    pub warranty: Option<String>,
    #[validate(length(max = 100))]
    pub condition: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub status: Option<AssetStatus>,
    pub assigned_to: Option<Uuid>,
}

/// Input for updating an asset. Present fields are applied; `asset_no` has no
/// mutation path.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAssetInput {
    pub department_id: Option<Uuid>,
    pub category: Option<AssetCategory>,
    pub status: Option<AssetStatus>,
    pub assigned_to: Option<Uuid>,
    #[validate(length(max = 100))]
    pub serial_no: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_cost: Option<Decimal>,
    pub depreciation: Option<Decimal>,
    #[validate(length(max = 255))]
    pub supplier: Option<String>,
    #[validate(length(max = 100))]
    pub warranty: Option<String>,
    #[validate(length(max = 100))]
    pub condition: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
}

/// Filters for the asset listing; combined as a logical AND.
#[derive(Debug, Clone, Default)]
pub struct AssetListFilter {
    /// Free-text search over asset number, serial number and description
    pub q: Option<String>,
    pub category: Option<AssetCategory>,
    pub status: Option<AssetStatus>,
    pub department_id: Option<Uuid>,
}

/// Service for managing assets
#[derive(Clone)]
pub struct AssetService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    numbers: AssetNumberGenerator,
}

impl AssetService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        numbers: AssetNumberGenerator,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            numbers,
        }
    }

    pub fn number_generator(&self) -> &AssetNumberGenerator {
        &self.numbers
    }

    /// Creates a new asset, allocating its asset number inside the same
    /// transaction as the insert.
    ///
    /// A uniqueness violation on the insert means a concurrent creator won
    /// the number race; the transaction is rolled back and the whole
    /// generate-and-insert cycle retries, bounded by
    /// `MAX_GENERATION_ATTEMPTS`.
    #[instrument(skip(self, input), fields(department_id = ?input.department_id, category = ?input.category))]
    pub async fn create_asset(&self, input: CreateAssetInput) -> Result<asset::Model, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let department_id = input.department_id.ok_or_else(|| {
            ServiceError::MissingAttribute(
                "department is required to generate an asset number".to_string(),
            )
        })?;
        let category = input.category.ok_or_else(|| {
            ServiceError::MissingAttribute(
                "category is required to generate an asset number".to_string(),
            )
        })?;

        let db = &*self.db_pool;

        for attempt in 0..MAX_GENERATION_ATTEMPTS {
            let txn = db.begin().await.map_err(|e| {
                error!(error = %e, "Failed to start transaction for asset creation");
                ServiceError::DatabaseError(e)
            })?;

            let department = department::Entity::find_by_id(department_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Department {} not found", department_id))
                })?;

            let asset_no = self
                .numbers
                .next_number(&txn, Some(&department), Some(category))
                .await?;

            let now = Utc::now();
            let active = asset::ActiveModel {
                id: Set(Uuid::new_v4()),
                asset_no: Set(asset_no.clone()),
                category: Set(category),
                status: Set(input.status.unwrap_or(AssetStatus::Available)),
                department_id: Set(department.id),
                assigned_to: Set(input.assigned_to),
                serial_no: Set(input.serial_no.clone()),
                purchase_date: Set(input.purchase_date),
                purchase_cost: Set(input.purchase_cost),
                depreciation: Set(input.depreciation),
                supplier: Set(input.supplier.clone()),
                warranty: Set(input.warranty.clone()),
                condition: Set(input.condition.clone()),
                description: Set(input.description.clone()),
                image_path: Set(input.image_path.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            };

            match active.insert(&txn).await {
                Ok(model) => {
                    txn.commit().await.map_err(|e| {
                        error!(error = %e, "Failed to commit asset creation");
                        ServiceError::DatabaseError(e)
                    })?;

                    info!(asset_id = %model.id, asset_no = %model.asset_no, "Asset created");

                    if let Some(event_sender) = &self.event_sender {
                        let _ = event_sender
                            .send(Event::AssetCreated {
                                asset_id: model.id,
                                asset_no: model.asset_no.clone(),
                            })
                            .await;
                    }

                    return Ok(model);
                }
                Err(e) if errors::is_unique_violation(&e) => {
                    warn!(
                        attempt,
                        asset_no = %asset_no,
                        "Asset number collided at insert; retrying"
                    );
                    let _ = txn.rollback().await;
                    continue;
                }
                Err(e) => {
                    error!(error = %e, "Failed to insert asset");
                    return Err(ServiceError::DatabaseError(e));
                }
            }
        }

        Err(ServiceError::NumberExhausted(format!(
            "could not allocate a unique asset number after {} attempts",
            MAX_GENERATION_ATTEMPTS
        )))
    }

    #[instrument(skip(self))]
    pub async fn get_asset(&self, id: Uuid) -> Result<asset::Model, ServiceError> {
        asset::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Asset {} not found", id)))
    }

    /// Lists assets with filters and pagination, newest first.
    #[instrument(skip(self))]
    pub async fn list_assets(
        &self,
        filter: AssetListFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<asset::Model>, u64), ServiceError> {
        let mut query = asset::Entity::find().order_by_desc(asset::Column::CreatedAt);

        if let Some(q) = filter.q.as_deref().filter(|q| !q.trim().is_empty()) {
            let pattern = format!("%{}%", q.trim());
            query = query.filter(
                Condition::any()
                    .add(asset::Column::AssetNo.like(pattern.clone()))
                    .add(asset::Column::SerialNo.like(pattern.clone()))
                    .add(asset::Column::Description.like(pattern)),
            );
        }
        if let Some(category) = filter.category {
            query = query.filter(asset::Column::Category.eq(category));
        }
        if let Some(status) = filter.status {
            query = query.filter(asset::Column::Status.eq(status));
        }
        if let Some(department_id) = filter.department_id {
            query = query.filter(asset::Column::DepartmentId.eq(department_id));
        }

        let paginator = query.paginate(&*self.db_pool, per_page.max(1));
        let total = paginator.num_items().await?;
        let assets = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((assets, total))
    }

    /// Applies an update to an asset. The asset number is immutable and is
    /// never part of the update surface.
    #[instrument(skip(self, input))]
    pub async fn update_asset(
        &self,
        id: Uuid,
        input: UpdateAssetInput,
    ) -> Result<asset::Model, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let asset = self.get_asset(id).await?;
        let mut active: asset::ActiveModel = asset.into();

        if let Some(department_id) = input.department_id {
            department::Entity::find_by_id(department_id)
                .one(&*self.db_pool)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Department {} not found", department_id))
                })?;
            active.department_id = Set(department_id);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(assigned_to) = input.assigned_to {
            active.assigned_to = Set(Some(assigned_to));
        }
        if let Some(serial_no) = input.serial_no {
            active.serial_no = Set(Some(serial_no));
        }
        if let Some(purchase_date) = input.purchase_date {
            active.purchase_date = Set(Some(purchase_date));
        }
        if let Some(purchase_cost) = input.purchase_cost {
            active.purchase_cost = Set(Some(purchase_cost));
        }
        if let Some(depreciation) = input.depreciation {
            active.depreciation = Set(Some(depreciation));
        }
        if let Some(supplier) = input.supplier {
            active.supplier = Set(Some(supplier));
        }
        if let Some(warranty) = input.warranty {
            active.warranty = Set(Some(warranty));
        }
        if let Some(condition) = input.condition {
            active.condition = Set(Some(condition));
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(image_path) = input.image_path {
            active.image_path = Set(Some(image_path));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db_pool).await?;

        info!(asset_id = %updated.id, "Asset updated");

        if let Some(event_sender) = &self.event_sender {
            let _ = event_sender.send(Event::AssetUpdated(updated.id)).await;
        }

        Ok(updated)
    }

    /// Deletes an asset. Its requests and stock-take items go with it via FK
    /// cascade.
    #[instrument(skip(self))]
    pub async fn delete_asset(&self, id: Uuid) -> Result<(), ServiceError> {
        let asset = self.get_asset(id).await?;

        asset::Entity::delete_by_id(asset.id)
            .exec(&*self.db_pool)
            .await?;

        info!(asset_id = %id, asset_no = %asset.asset_no, "Asset deleted");

        if let Some(event_sender) = &self.event_sender {
            let _ = event_sender.send(Event::AssetDeleted(id)).await;
        }

        Ok(())
    }
}
