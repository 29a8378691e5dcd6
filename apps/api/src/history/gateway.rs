//! Persistence gateway: the only path by which history records and profiles are
//! written. Every successful write is followed by a change event on the feed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::{stream, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::history::feed::{ChangeEvent, ChangeFeed, ChangeStream};
use crate::history::store::HistoryStore;
use crate::models::history::{DashboardSummary, HistoryRecord, HistoryScore, NewHistoryRecord};
use crate::models::user::{ProfileUpdate, UserProfile};

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 200;
const DASHBOARD_RECENT: i64 = 3;

pub struct PersistenceGateway {
    store: Arc<dyn HistoryStore>,
    feed: Arc<dyn ChangeFeed>,
    subscription_ttl: Duration,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn HistoryStore>, feed: Arc<dyn ChangeFeed>, subscription_ttl: Duration) -> Self {
        Self {
            store,
            feed,
            subscription_ttl,
        }
    }

    pub async fn create_record(&self, user_id: Uuid, new: NewHistoryRecord) -> Result<HistoryRecord, AppError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title cannot be empty".to_string()));
        }
        if let HistoryScore::Number(score) = new.score {
            if !score.is_finite() {
                return Err(AppError::Validation("score must be a finite number".to_string()));
            }
        }

        let record = HistoryRecord {
            id: Uuid::new_v4(),
            user_id,
            kind: new.kind,
            title: title.to_string(),
            score: new.score,
            created_at: Utc::now(),
        };
        self.store.insert_record(&record).await?;
        info!("Stored {} history record {} for user {user_id}", record.kind.as_str(), record.id);

        self.publish(user_id, ChangeEvent::RecordAdded { record: record.clone() }).await;
        Ok(record)
    }

    /// Deletes one of the caller's own records. Another user's id is indistinguishable
    /// from a missing one.
    pub async fn delete_record(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_record(user_id, id).await? {
            return Err(AppError::NotFound(format!("history record {id} not found")));
        }
        info!("Deleted history record {id} for user {user_id}");
        self.publish(user_id, ChangeEvent::RecordRemoved { id }).await;
        Ok(())
    }

    pub async fn list_records(&self, user_id: Uuid, limit: Option<i64>) -> Result<Vec<HistoryRecord>, AppError> {
        let limit = match limit {
            None => DEFAULT_LIST_LIMIT,
            Some(n) if n > 0 => n.min(MAX_LIST_LIMIT),
            Some(n) => return Err(AppError::Validation(format!("limit must be positive, got {n}"))),
        };
        self.store.list_records(user_id, limit).await
    }

    pub async fn dashboard(&self, user_id: Uuid) -> Result<DashboardSummary, AppError> {
        let total_analyses = self.store.count_records(user_id).await?;
        let recent_records = self.store.list_records(user_id, DASHBOARD_RECENT).await?;
        Ok(DashboardSummary {
            total_analyses,
            recent_score: recent_records.first().map(|r| r.score.clone()),
            recent_records,
        })
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        self.store
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile for user {user_id} not found")))
    }

    /// Merges `update` over the stored profile, creating it on first write.
    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<UserProfile, AppError> {
        if update.is_empty() {
            return Err(AppError::Validation("profile update has no fields".to_string()));
        }
        let now = Utc::now();
        let current = self
            .store
            .get_profile(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::blank(user_id, now));
        let profile = self.store.upsert_profile(&current.merge(update, now)).await?;

        self.publish(user_id, ChangeEvent::ProfileUpdated { profile: profile.clone() }).await;
        Ok(profile)
    }

    /// A snapshot of the newest records followed by live changes, ending after the
    /// subscription lifetime. The feed is joined before the snapshot is read so no
    /// write between the two is missed.
    pub async fn subscribe(&self, user_id: Uuid) -> Result<ChangeStream, AppError> {
        let changes = self.feed.subscribe(user_id).await?;
        let records = self.store.list_records(user_id, DEFAULT_LIST_LIMIT).await?;
        let snapshot = ChangeEvent::Snapshot { records };

        Ok(stream::once(async move { snapshot })
            .chain(changes)
            .take_until(tokio::time::sleep(self.subscription_ttl))
            .boxed())
    }

    async fn publish(&self, user_id: Uuid, event: ChangeEvent) {
        if let Err(e) = self.feed.publish(user_id, &event).await {
            warn!("Failed to publish {} for user {user_id}: {e}", event.name());
        }
    }
}
