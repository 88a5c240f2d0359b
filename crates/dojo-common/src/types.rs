use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::challenges::ChallengeType;
use crate::error::Error;

/// Number of shares after which an applied use case counts as completed.
pub const COMPLETION_SHARE_THRESHOLD: u32 = 2;

/// A user's progress on a single use case.
///
/// Created on first interaction and advanced in place as the user learns,
/// applies and shares the use case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: String,
    pub use_case_id: String,
    /// When the user first learned the use case
    pub seen_at: Option<DateTime<Utc>>,
    /// When the user first applied the use case
    pub done_at: Option<DateTime<Utc>>,
    pub share_count: u32,
}

impl ProgressRecord {
    pub fn new(user_id: impl Into<String>, use_case_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            use_case_id: use_case_id.into(),
            seen_at: None,
            done_at: None,
            share_count: 0,
        }
    }

    pub fn is_learned(&self) -> bool {
        self.seen_at.is_some()
    }

    pub fn is_applied(&self) -> bool {
        self.done_at.is_some()
    }

    /// Applied and shared with at least two people
    pub fn is_completed(&self) -> bool {
        self.is_applied() && self.share_count >= COMPLETION_SHARE_THRESHOLD
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareStatus {
    Pending,
    Confirmed,
    Denied,
}

impl ShareStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareStatus::Pending => "pending",
            ShareStatus::Confirmed => "confirmed",
            ShareStatus::Denied => "denied",
        }
    }
}

impl fmt::Display for ShareStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShareStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ShareStatus::Pending),
            "confirmed" => Ok(ShareStatus::Confirmed),
            "denied" => Ok(ShareStatus::Denied),
            other => Err(Error::UnknownShareStatus(other.to_string())),
        }
    }
}

/// One user teaching a use case to another. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub id: String,
    pub sharer_id: String,
    pub recipient_id: String,
    pub use_case_id: String,
    pub status: ShareStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBadge {
    pub user_id: String,
    pub badge_id: String,
    pub earned_at: DateTime<Utc>,
}

/// At most one per (user, challenge_date)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyChallengeCompletion {
    pub user_id: String,
    pub challenge_date: NaiveDate,
    pub challenge_type: ChallengeType,
    pub completed_at: DateTime<Utc>,
}
