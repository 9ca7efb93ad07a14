use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{entities::user, models::is_unique_violation};

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("User not found")]
    UserNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub external_subject_id: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile claims extracted from a verified credential.
#[derive(Debug, Clone)]
pub struct UserClaims {
    pub subject_id: String,
    pub email: String,
    pub name: Option<String>,
}

impl User {
    fn from_model(model: user::Model) -> Self {
        Self {
            id: model.uuid,
            email: model.email,
            external_subject_id: model.external_subject_id,
            name: model.name,
            created_at: model.created_at.into(),
        }
    }

    pub async fn find_by_subject<C: ConnectionTrait>(
        db: &C,
        subject_id: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::ExternalSubjectId.eq(subject_id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    /// Idempotent upsert-by-lookup: the first verification of a subject
    /// inserts the row, every later one returns it unchanged. Claim drift
    /// (a changed email or display name) is never written back.
    pub async fn ensure<C: ConnectionTrait>(
        db: &C,
        claims: &UserClaims,
    ) -> Result<Self, UserError> {
        if let Some(existing) = Self::find_by_subject(db, &claims.subject_id).await? {
            return Ok(existing);
        }

        let active = user::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            email: Set(claims.email.clone()),
            external_subject_id: Set(claims.subject_id.clone()),
            name: Set(claims.name.clone()),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        match active.insert(db).await {
            Ok(model) => {
                tracing::info!(subject_id = %claims.subject_id, "Created user record");
                Ok(Self::from_model(model))
            }
            Err(err) if is_unique_violation(&err) => {
                // Lost a concurrent first-login race; the row exists now.
                Self::find_by_subject(db, &claims.subject_id)
                    .await?
                    .ok_or(UserError::UserNotFound)
            }
            Err(err) => Err(UserError::Database(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{Database, EntityTrait};
    use sea_orm_migration::MigratorTrait;

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    fn claims(subject_id: &str, email: &str) -> UserClaims {
        UserClaims {
            subject_id: subject_id.to_string(),
            email: email.to_string(),
            name: Some("Dev".to_string()),
        }
    }

    #[tokio::test]
    async fn ensure_is_idempotent_per_subject() {
        let db = setup_db().await;

        let first = User::ensure(&db, &claims("subject-1", "dev@example.com"))
            .await
            .unwrap();
        let second = User::ensure(&db, &claims("subject-1", "dev@example.com"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);

        let rows = user::Entity::find().all(&db).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn ensure_does_not_propagate_claim_drift() {
        let db = setup_db().await;

        User::ensure(&db, &claims("subject-1", "old@example.com"))
            .await
            .unwrap();
        let revisit = User::ensure(&db, &claims("subject-1", "new@example.com"))
            .await
            .unwrap();

        assert_eq!(revisit.email, "old@example.com");
    }

    #[tokio::test]
    async fn ensure_separates_distinct_subjects() {
        let db = setup_db().await;

        let a = User::ensure(&db, &claims("subject-1", "a@example.com"))
            .await
            .unwrap();
        let b = User::ensure(&db, &claims("subject-2", "b@example.com"))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(user::Entity::find().all(&db).await.unwrap().len(), 2);
    }
}
