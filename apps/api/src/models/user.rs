use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub professional_title: Option<String>,
    pub bio: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update. Absent and `null` fields leave the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub professional_title: Option<String>,
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.email.is_none()
            && self.professional_title.is_none()
            && self.bio.is_none()
    }
}

impl UserProfile {
    pub fn blank(user_id: Uuid, now: DateTime<Utc>) -> Self {
        UserProfile {
            user_id,
            display_name: None,
            email: None,
            professional_title: None,
            bio: None,
            updated_at: now,
        }
    }

    /// Overwrites every field present in `update`; the newest write wins.
    pub fn merge(self, update: ProfileUpdate, now: DateTime<Utc>) -> Self {
        UserProfile {
            user_id: self.user_id,
            display_name: update.display_name.or(self.display_name),
            email: update.email.or(self.email),
            professional_title: update.professional_title.or(self.professional_title),
            bio: update.bio.or(self.bio),
            updated_at: now,
        }
    }
}
