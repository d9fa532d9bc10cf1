use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::department;
use crate::errors::{self, ServiceError};
use crate::events::{Event, EventSender};

/// Service for managing departments
#[derive(Clone)]
pub struct DepartmentService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl DepartmentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a new department with a unique, non-empty name
    #[instrument(skip(self))]
    pub async fn create_department(&self, name: &str) -> Result<department::Model, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "department name must not be empty".to_string(),
            ));
        }

        let model = department::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(Utc::now()),
        };

        let department = model.insert(&*self.db_pool).await.map_err(|e| {
            if errors::is_unique_violation(&e) {
                ServiceError::Conflict(format!("department '{}' already exists", name))
            } else {
                error!(error = %e, "Failed to create department");
                ServiceError::DatabaseError(e)
            }
        })?;

        info!(department_id = %department.id, name = %department.name, "Department created");

        if let Some(event_sender) = &self.event_sender {
            let _ = event_sender
                .send(Event::DepartmentCreated(department.id))
                .await;
        }

        Ok(department)
    }

    #[instrument(skip(self))]
    pub async fn get_department(&self, id: Uuid) -> Result<department::Model, ServiceError> {
        department::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Department {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<department::Model>, ServiceError> {
        department::Entity::find()
            .filter(department::Column::Name.eq(name))
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::from)
    }

    #[instrument(skip(self))]
    pub async fn list_departments(&self) -> Result<Vec<department::Model>, ServiceError> {
        department::Entity::find()
            .order_by_asc(department::Column::Name)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::from)
    }

    /// Renames a department
    #[instrument(skip(self))]
    pub async fn update_department(
        &self,
        id: Uuid,
        name: &str,
    ) -> Result<department::Model, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "department name must not be empty".to_string(),
            ));
        }

        let department = self.get_department(id).await?;

        let mut active: department::ActiveModel = department.into();
        active.name = Set(name.to_string());

        active.update(&*self.db_pool).await.map_err(|e| {
            if errors::is_unique_violation(&e) {
                ServiceError::Conflict(format!("department '{}' already exists", name))
            } else {
                ServiceError::DatabaseError(e)
            }
        })
    }

    /// Deletes a department. Assets in it (and their requests and stock-take
    /// items) go with it via FK cascade.
    #[instrument(skip(self))]
    pub async fn delete_department(&self, id: Uuid) -> Result<(), ServiceError> {
        let department = self.get_department(id).await?;

        department::Entity::delete_by_id(department.id)
            .exec(&*self.db_pool)
            .await?;

        info!(department_id = %id, "Department deleted");

        if let Some(event_sender) = &self.event_sender {
            let _ = event_sender.send(Event::DepartmentDeleted(id)).await;
        }

        Ok(())
    }
}
