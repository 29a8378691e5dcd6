use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

/// Which analysis produced a history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    JobMatch,
    AtsScan,
    Optimization,
}

impl AnalysisKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisKind::JobMatch => "job_match",
            AnalysisKind::AtsScan => "ats_scan",
            AnalysisKind::Optimization => "optimization",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "job_match" => Some(AnalysisKind::JobMatch),
            "ats_scan" => Some(AnalysisKind::AtsScan),
            "optimization" => Some(AnalysisKind::Optimization),
            _ => None,
        }
    }
}

/// Headline score of an analysis: a number, or a short label such as "Strong".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryScore {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, FromRow)]
pub struct HistoryRecordRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub score: Json<HistoryScore>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: AnalysisKind,
    pub title: String,
    pub score: HistoryScore,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<HistoryRecordRow> for HistoryRecord {
    type Error = AppError;

    fn try_from(row: HistoryRecordRow) -> Result<Self, Self::Error> {
        let kind = AnalysisKind::parse(&row.kind).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "history record {} has unknown kind '{}'",
                row.id,
                row.kind
            ))
        })?;
        Ok(HistoryRecord {
            id: row.id,
            user_id: row.user_id,
            kind,
            title: row.title,
            score: row.score.0,
            created_at: row.created_at,
        })
    }
}

/// Caller-supplied part of a history record; id and timestamp are stamped on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHistoryRecord {
    pub kind: AnalysisKind,
    pub title: String,
    pub score: HistoryScore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_analyses: i64,
    pub recent_score: Option<HistoryScore>,
    pub recent_records: Vec<HistoryRecord>,
}
