use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{
    asset,
    asset::AssetStatus,
    asset_request,
    asset_request::RequestStatus,
    user,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Outcome of an administrator's decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestDecision {
    Approve,
    Reject,
}

/// A request joined with its asset and requesting user, for management views.
#[derive(Debug, Clone, Serialize)]
pub struct RequestWithContext {
    pub request: asset_request::Model,
    pub asset: Option<asset::Model>,
    pub requester: Option<user::Model>,
}

/// Service for the asset-assignment request workflow
#[derive(Clone)]
pub struct RequestService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl RequestService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Whether the user has an unresolved request for the asset. The asset
    /// detail page uses the negation as its `can_request` flag.
    #[instrument(skip(self))]
    pub async fn has_pending_request(
        &self,
        asset_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, ServiceError> {
        let existing = asset_request::Entity::find()
            .filter(asset_request::Column::AssetId.eq(asset_id))
            .filter(asset_request::Column::UserId.eq(user_id))
            .filter(asset_request::Column::Status.eq(RequestStatus::Pending))
            .one(&*self.db_pool)
            .await?;
        Ok(existing.is_some())
    }

    /// Submits an assignment request for an asset.
    ///
    /// The duplicate guard is a query, not a unique constraint, so two
    /// concurrent submissions can both pass it; that window is accepted.
    #[instrument(skip(self, purpose))]
    pub async fn submit(
        &self,
        asset_id: Uuid,
        user_id: Uuid,
        purpose: Option<String>,
    ) -> Result<asset_request::Model, ServiceError> {
        let db = &*self.db_pool;

        asset::Entity::find_by_id(asset_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Asset {} not found", asset_id)))?;

        if self.has_pending_request(asset_id, user_id).await? {
            return Err(ServiceError::DuplicateRequest(format!(
                "a pending request for asset {} already exists for this user",
                asset_id
            )));
        }

        let model = asset_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            asset_id: Set(asset_id),
            user_id: Set(user_id),
            purpose: Set(purpose),
            status: Set(RequestStatus::Pending),
            request_date: Set(Utc::now()),
            approval_date: Set(None),
        };

        let request = model.insert(db).await.map_err(|e| {
            error!(error = %e, asset_id = %asset_id, "Failed to create asset request");
            ServiceError::DatabaseError(e)
        })?;

        info!(request_id = %request.id, asset_id = %asset_id, user_id = %user_id, "Asset request submitted");

        if let Some(event_sender) = &self.event_sender {
            let _ = event_sender
                .send(Event::RequestSubmitted {
                    request_id: request.id,
                    asset_id,
                    user_id,
                })
                .await;
        }

        Ok(request)
    }

    /// Decides a pending request.
    ///
    /// Approval atomically marks the asset as assigned to the requester and
    /// `in_use` in the same transaction. Rejection never touches the asset.
    /// Either way `approval_date` is stamped and the request becomes
    /// terminal; deciding it again is an invalid operation.
    ///
    /// There is deliberately no guard against the asset having been
    /// reassigned by a concurrent approval: last write wins.
    #[instrument(skip(self))]
    pub async fn decide(
        &self,
        request_id: Uuid,
        decision: RequestDecision,
    ) -> Result<asset_request::Model, ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for request decision");
            ServiceError::DatabaseError(e)
        })?;

        let request = asset_request::Entity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Request {} not found", request_id)))?;

        if request.status.is_terminal() {
            return Err(ServiceError::InvalidOperation(format!(
                "request {} has already been {}",
                request_id, request.status
            )));
        }

        let now = Utc::now();
        let asset_id = request.asset_id;
        let requester = request.user_id;

        let mut active: asset_request::ActiveModel = request.into();
        active.status = Set(match decision {
            RequestDecision::Approve => RequestStatus::Approved,
            RequestDecision::Reject => RequestStatus::Rejected,
        });
        active.approval_date = Set(Some(now));

        let updated = active.update(&txn).await?;

        if decision == RequestDecision::Approve {
            let asset = asset::Entity::find_by_id(asset_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Asset {} not found", asset_id)))?;

            let mut asset_active: asset::ActiveModel = asset.into();
            asset_active.assigned_to = Set(Some(requester));
            asset_active.status = Set(AssetStatus::InUse);
            asset_active.updated_at = Set(now);
            asset_active.update(&txn).await?;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, request_id = %request_id, "Failed to commit request decision");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            request_id = %request_id,
            asset_id = %asset_id,
            approved = decision == RequestDecision::Approve,
            "Asset request decided"
        );

        if let Some(event_sender) = &self.event_sender {
            let _ = event_sender
                .send(Event::RequestDecided {
                    request_id,
                    asset_id,
                    approved: decision == RequestDecision::Approve,
                })
                .await;
        }

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_request(&self, id: Uuid) -> Result<asset_request::Model, ServiceError> {
        asset_request::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Request {} not found", id)))
    }

    /// Lists requests, optionally restricted to one status, with asset and
    /// requester context, newest first.
    #[instrument(skip(self))]
    pub async fn list_with_context(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<RequestWithContext>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = asset_request::Entity::find()
            .order_by_desc(asset_request::Column::RequestDate)
            .find_also_related(asset::Entity);

        if let Some(status) = status {
            query = query.filter(asset_request::Column::Status.eq(status));
        }

        let rows = query.all(db).await?;

        let user_ids: Vec<Uuid> = rows.iter().map(|(request, _)| request.user_id).collect();
        let users: HashMap<Uuid, user::Model> = user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(rows
            .into_iter()
            .map(|(request, asset)| {
                let requester = users.get(&request.user_id).cloned();
                RequestWithContext {
                    request,
                    asset,
                    requester,
                }
            })
            .collect())
    }

    /// Bulk-deletes every resolved (non-pending) request. Irreversible; there
    /// is no archival.
    #[instrument(skip(self))]
    pub async fn clear_resolved(&self) -> Result<u64, ServiceError> {
        let result = asset_request::Entity::delete_many()
            .filter(asset_request::Column::Status.ne(RequestStatus::Pending))
            .exec(&*self.db_pool)
            .await?;

        info!(removed = result.rows_affected, "Cleared resolved request history");

        if let Some(event_sender) = &self.event_sender {
            let _ = event_sender
                .send(Event::RequestHistoryCleared {
                    removed: result.rows_affected,
                })
                .await;
        }

        Ok(result.rows_affected)
    }
}
