use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{entities::task, models::is_unique_violation};
pub use crate::types::TaskStatus;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Task not found")]
    TaskNotFound,
    #[error("Task already saved")]
    DuplicateTitle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub topic: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub user_id: String,
    pub title: String,
    pub topic: Option<String>,
}

impl Task {
    fn from_model(model: task::Model) -> Self {
        Self {
            id: model.uuid,
            user_id: model.user_id,
            title: model.title,
            topic: model.topic,
            status: model.status,
            created_at: model.created_at.into(),
        }
    }

    pub async fn find_by_owner<C: ConnectionTrait>(
        db: &C,
        subject_id: &str,
    ) -> Result<Vec<Self>, DbErr> {
        let records = task::Entity::find()
            .filter(task::Column::UserId.eq(subject_id))
            .order_by_desc(task::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id_and_owner<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        subject_id: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .filter(task::Column::UserId.eq(subject_id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    /// Saves a task with status `incomplete`. The unique index on
    /// (user_id, title) is the duplicate guard; a violation maps to
    /// [`TaskError::DuplicateTitle`] without any pre-read.
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateTask,
        task_id: Uuid,
    ) -> Result<Self, TaskError> {
        let active = task::ActiveModel {
            uuid: Set(task_id),
            user_id: Set(data.user_id.clone()),
            title: Set(data.title.clone()),
            topic: Set(data.topic.clone()),
            status: Set(TaskStatus::Incomplete),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        match active.insert(db).await {
            Ok(model) => Ok(Self::from_model(model)),
            Err(err) if is_unique_violation(&err) => Err(TaskError::DuplicateTitle),
            Err(err) => Err(TaskError::Database(err)),
        }
    }

    /// Every mutation is scoped by id AND owner; a non-owned id reads as
    /// missing rather than forbidden.
    pub async fn set_status<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        subject_id: &str,
        status: TaskStatus,
    ) -> Result<Self, TaskError> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .filter(task::Column::UserId.eq(subject_id))
            .one(db)
            .await?
            .ok_or(TaskError::TaskNotFound)?;

        let mut active: task::ActiveModel = record.into();
        active.status = Set(status);
        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        subject_id: &str,
    ) -> Result<(), TaskError> {
        let result = task::Entity::delete_many()
            .filter(task::Column::Uuid.eq(id))
            .filter(task::Column::UserId.eq(subject_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(TaskError::TaskNotFound);
        }
        Ok(())
    }
}
