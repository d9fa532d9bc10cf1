use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{
    asset, department, stock_take,
    stock_take::StockTakeStatus,
    stock_take_item,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// One submitted count for a stock-take item.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CountEntry {
    pub item_id: Uuid,
    pub actual_quantity: i32,
    pub notes: Option<String>,
}

/// Aggregate numbers for a stock-take session.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockTakeSummary {
    pub total_items: usize,
    pub counted_items: usize,
    pub pending_items: usize,
    pub mismatched_items: usize,
}

/// Derives a session's status from its items.
///
/// A counted mismatch wins immediately (first one found in iteration order);
/// otherwise the session is complete once every item has been counted. An
/// item counted as 0 is a mismatch, not an uncounted item.
pub fn derive_status(items: &[stock_take_item::Model]) -> StockTakeStatus {
    for item in items {
        if item.counted && item.actual_quantity != item.expected_quantity {
            return StockTakeStatus::Discrepancy;
        }
    }

    if items.iter().all(|item| item.counted) {
        StockTakeStatus::Completed
    } else {
        StockTakeStatus::InProgress
    }
}

pub fn summarize(items: &[stock_take_item::Model]) -> StockTakeSummary {
    let total_items = items.len();
    let counted_items = items.iter().filter(|item| item.counted).count();
    let mismatched_items = items
        .iter()
        .filter(|item| item.counted && item.actual_quantity != item.expected_quantity)
        .count();

    StockTakeSummary {
        total_items,
        counted_items,
        pending_items: total_items - counted_items,
        mismatched_items,
    }
}

/// Service for per-department stock-take reconciliation sessions
#[derive(Clone)]
pub struct StockTakeService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl StockTakeService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Opens a session, snapshotting every asset currently in the department
    /// into one item each with an expected quantity of 1.
    #[instrument(skip(self, notes))]
    pub async fn open(
        &self,
        department_id: Uuid,
        created_by: Uuid,
        notes: Option<String>,
    ) -> Result<(stock_take::Model, Vec<stock_take_item::Model>), ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for stock take");
            ServiceError::DatabaseError(e)
        })?;

        department::Entity::find_by_id(department_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Department {} not found", department_id))
            })?;

        let now = Utc::now();
        let stock_take_model = stock_take::ActiveModel {
            id: Set(Uuid::new_v4()),
            department_id: Set(department_id),
            status: Set(StockTakeStatus::InProgress),
            notes: Set(notes),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let assets = asset::Entity::find()
            .filter(asset::Column::DepartmentId.eq(department_id))
            .all(&txn)
            .await?;

        let items: Vec<stock_take_item::ActiveModel> = assets
            .iter()
            .map(|asset| stock_take_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                stock_take_id: Set(stock_take_model.id),
                asset_id: Set(asset.id),
                expected_quantity: Set(1),
                actual_quantity: Set(0),
                counted: Set(false),
                notes: Set(None),
            })
            .collect();

        if !items.is_empty() {
            stock_take_item::Entity::insert_many(items).exec(&txn).await?;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit stock take creation");
            ServiceError::DatabaseError(e)
        })?;

        let items = self.items_for(stock_take_model.id).await?;

        info!(
            stock_take_id = %stock_take_model.id,
            department_id = %department_id,
            item_count = items.len(),
            "Stock take opened"
        );

        if let Some(event_sender) = &self.event_sender {
            let _ = event_sender
                .send(Event::StockTakeOpened {
                    stock_take_id: stock_take_model.id,
                    department_id,
                    item_count: items.len(),
                })
                .await;
        }

        Ok((stock_take_model, items))
    }

    /// Records a batch of counts, then re-derives the session status from the
    /// full item set. Statuses are not monotonic: editing a previously
    /// mismatched count back to its expected value moves the session out of
    /// `discrepancy` again.
    #[instrument(skip(self, entries), fields(entry_count = entries.len()))]
    pub async fn record_counts(
        &self,
        stock_take_id: Uuid,
        entries: Vec<CountEntry>,
    ) -> Result<(stock_take::Model, Vec<stock_take_item::Model>), ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for stock take counts");
            ServiceError::DatabaseError(e)
        })?;

        let stock_take_model = stock_take::Entity::find_by_id(stock_take_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Stock take {} not found", stock_take_id))
            })?;

        for entry in &entries {
            if entry.actual_quantity < 0 {
                return Err(ServiceError::ValidationError(
                    "actual_quantity must not be negative".to_string(),
                ));
            }

            let item = stock_take_item::Entity::find_by_id(entry.item_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Stock take item {} not found", entry.item_id))
                })?;

            if item.stock_take_id != stock_take_id {
                return Err(ServiceError::InvalidOperation(format!(
                    "item {} does not belong to stock take {}",
                    entry.item_id, stock_take_id
                )));
            }

            let mut active: stock_take_item::ActiveModel = item.into();
            active.actual_quantity = Set(entry.actual_quantity);
            active.counted = Set(true);
            if let Some(notes) = entry.notes.clone() {
                active.notes = Set(Some(notes));
            }
            active.update(&txn).await?;
        }

        let items = stock_take_item::Entity::find()
            .filter(stock_take_item::Column::StockTakeId.eq(stock_take_id))
            .all(&txn)
            .await?;

        let new_status = derive_status(&items);
        let old_status = stock_take_model.status;

        let stock_take_model = if new_status != old_status {
            let mut active: stock_take::ActiveModel = stock_take_model.into();
            active.status = Set(new_status);
            active.updated_at = Set(Utc::now());
            active.update(&txn).await?
        } else {
            stock_take_model
        };

        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit stock take counts");
            ServiceError::DatabaseError(e)
        })?;

        if new_status != old_status {
            info!(
                stock_take_id = %stock_take_id,
                old_status = %old_status,
                new_status = %new_status,
                "Stock take status changed"
            );

            if let Some(event_sender) = &self.event_sender {
                let _ = event_sender
                    .send(Event::StockTakeStatusChanged {
                        stock_take_id,
                        old_status: old_status.to_string(),
                        new_status: new_status.to_string(),
                    })
                    .await;
            }
        }

        Ok((stock_take_model, items))
    }

    #[instrument(skip(self))]
    pub async fn get_with_items(
        &self,
        id: Uuid,
    ) -> Result<(stock_take::Model, Vec<stock_take_item::Model>), ServiceError> {
        let stock_take_model = stock_take::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Stock take {} not found", id)))?;

        let items = self.items_for(id).await?;
        Ok((stock_take_model, items))
    }

    /// Lists sessions with pagination, newest first.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<stock_take::Model>, u64), ServiceError> {
        let paginator = stock_take::Entity::find()
            .order_by_desc(stock_take::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page.max(1));

        let total = paginator.num_items().await?;
        let stock_takes = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((stock_takes, total))
    }

    async fn items_for(&self, stock_take_id: Uuid) -> Result<Vec<stock_take_item::Model>, ServiceError> {
        stock_take_item::Entity::find()
            .filter(stock_take_item::Column::StockTakeId.eq(stock_take_id))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn item(counted: bool, actual: i32) -> stock_take_item::Model {
        stock_take_item::Model {
            id: Uuid::new_v4(),
            stock_take_id: Uuid::new_v4(),
            asset_id: Uuid::new_v4(),
            expected_quantity: 1,
            actual_quantity: actual,
            counted,
            notes: None,
        }
    }

    #[test_case(&[(true, 1), (true, 1)], StockTakeStatus::Completed; "all counted and matching")]
    #[test_case(&[(true, 1), (true, 2)], StockTakeStatus::Discrepancy; "overcount is a mismatch")]
    #[test_case(&[(true, 1), (true, 0)], StockTakeStatus::Discrepancy; "counted zero is a mismatch")]
    #[test_case(&[(true, 1), (false, 0)], StockTakeStatus::InProgress; "uncounted item keeps session open")]
    #[test_case(&[(false, 0), (true, 3)], StockTakeStatus::Discrepancy; "mismatch wins over uncounted")]
    fn status_derivation(spec: &[(bool, i32)], expected: StockTakeStatus) {
        let items: Vec<_> = spec
            .iter()
            .map(|&(counted, actual)| item(counted, actual))
            .collect();
        assert_eq!(derive_status(&items), expected);
    }

    #[test]
    fn empty_item_set_derives_completed() {
        assert_eq!(derive_status(&[]), StockTakeStatus::Completed);
    }

    #[test]
    fn summary_counts_items() {
        let items = vec![item(true, 1), item(true, 0), item(false, 0)];
        let summary = summarize(&items);
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.counted_items, 2);
        assert_eq!(summary.pending_items, 1);
        assert_eq!(summary.mismatched_items, 1);
    }
}
