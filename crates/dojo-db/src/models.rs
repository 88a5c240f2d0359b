use chrono::{DateTime, NaiveDate, Utc};
use dojo_common::challenges::ChallengeType;
use dojo_common::{DailyChallengeCompletion, ProgressRecord, ShareRecord, ShareStatus, UserBadge};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{DbError, Result};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbUser {
    pub id: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbUseCase {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUseCase {
    pub id: String,
    pub title: String,
    pub labels: Vec<String>,
}

impl NewUseCase {
    pub fn new(title: &str, labels: &[&str]) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbProgress {
    pub user_id: String,
    pub use_case_id: String,
    pub seen_at: Option<DateTime<Utc>>,
    pub done_at: Option<DateTime<Utc>>,
    pub share_count: i64,
}

impl From<DbProgress> for ProgressRecord {
    fn from(row: DbProgress) -> Self {
        Self {
            user_id: row.user_id,
            use_case_id: row.use_case_id,
            seen_at: row.seen_at,
            done_at: row.done_at,
            // CHECK constraint keeps this non-negative
            share_count: u32::try_from(row.share_count).unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbShare {
    pub id: String,
    pub sharer_id: String,
    pub recipient_id: String,
    pub use_case_id: String,
    pub status: String, // "pending", "confirmed", "denied"
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbShare> for ShareRecord {
    type Error = DbError;

    fn try_from(row: DbShare) -> Result<Self> {
        let status: ShareStatus = row.status.parse()?;
        Ok(Self {
            id: row.id,
            sharer_id: row.sharer_id,
            recipient_id: row.recipient_id,
            use_case_id: row.use_case_id,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShare {
    pub id: String,
    pub sharer_id: String,
    pub recipient_id: String,
    pub use_case_id: String,
    pub created_at: DateTime<Utc>,
}

impl NewShare {
    pub fn new(sharer_id: &str, recipient_id: &str, use_case_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sharer_id: sharer_id.to_string(),
            recipient_id: recipient_id.to_string(),
            use_case_id: use_case_id.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbSubmission {
    pub id: String,
    pub user_id: String,
    pub use_case_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbComment {
    pub id: String,
    pub user_id: String,
    pub use_case_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbUserBadge {
    pub user_id: String,
    pub badge_id: String,
    pub earned_at: DateTime<Utc>,
}

impl From<DbUserBadge> for UserBadge {
    fn from(row: DbUserBadge) -> Self {
        Self { user_id: row.user_id, badge_id: row.badge_id, earned_at: row.earned_at }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbChallengeCompletion {
    pub user_id: String,
    pub challenge_date: NaiveDate,
    pub challenge_type: String,
    pub completed_at: DateTime<Utc>,
}

impl TryFrom<DbChallengeCompletion> for DailyChallengeCompletion {
    type Error = DbError;

    fn try_from(row: DbChallengeCompletion) -> Result<Self> {
        let challenge_type: ChallengeType = row.challenge_type.parse()?;
        Ok(Self {
            user_id: row.user_id,
            challenge_date: row.challenge_date,
            challenge_type,
            completed_at: row.completed_at,
        })
    }
}
