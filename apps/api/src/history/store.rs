use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::history::{HistoryRecord, HistoryRecordRow};
use crate::models::user::UserProfile;

/// Durable storage for history records and profiles. Every query is scoped to one user.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn insert_record(&self, record: &HistoryRecord) -> Result<(), AppError>;

    /// Newest first.
    async fn list_records(&self, user_id: Uuid, limit: i64) -> Result<Vec<HistoryRecord>, AppError>;

    async fn count_records(&self, user_id: Uuid) -> Result<i64, AppError>;

    /// Returns false when the user owns no record with this id.
    async fn delete_record(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError>;

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<UserProfile, AppError>;
}

pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn insert_record(&self, record: &HistoryRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO history_records (id, user_id, kind, title, score, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.kind.as_str())
        .bind(&record.title)
        .bind(Json(&record.score))
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_records(&self, user_id: Uuid, limit: i64) -> Result<Vec<HistoryRecord>, AppError> {
        let rows = sqlx::query_as::<_, HistoryRecordRow>(
            r#"
            SELECT id, user_id, kind, title, score, created_at
            FROM history_records
            WHERE user_id = $1
            ORDER BY created_at DESC, id
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(HistoryRecord::try_from).collect()
    }

    async fn count_records(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM history_records WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete_record(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM history_records WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT user_id, display_name, email, professional_title, bio, updated_at
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<UserProfile, AppError> {
        let stored = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, display_name, email, professional_title, bio, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                email = EXCLUDED.email,
                professional_title = EXCLUDED.professional_title,
                bio = EXCLUDED.bio,
                updated_at = EXCLUDED.updated_at
            RETURNING user_id, display_name, email, professional_title, bio, updated_at
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.display_name)
        .bind(&profile.email)
        .bind(&profile.professional_title)
        .bind(&profile.bio)
        .bind(profile.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }
}
