//! In-memory `HistoryStore` for gateway and router tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::history::store::HistoryStore;
use crate::models::history::HistoryRecord;
use crate::models::user::UserProfile;

#[derive(Default)]
pub struct MemoryHistoryStore {
    records: Mutex<Vec<HistoryRecord>>,
    profiles: Mutex<HashMap<Uuid, UserProfile>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn insert_record(&self, record: &HistoryRecord) -> Result<(), AppError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn list_records(&self, user_id: Uuid, limit: i64) -> Result<Vec<HistoryRecord>, AppError> {
        let mut records: Vec<HistoryRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }

    async fn count_records(&self, user_id: Uuid) -> Result<i64, AppError> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().filter(|r| r.user_id == user_id).count() as i64)
    }

    async fn delete_record(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(records.len() < before)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<UserProfile, AppError> {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.user_id, profile.clone());
        Ok(profile.clone())
    }
}
