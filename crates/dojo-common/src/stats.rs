use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::utc_day_window;
use crate::types::{ProgressRecord, ShareRecord, ShareStatus};

/// Aggregate view of a user's activity, rebuilt from stored facts on every
/// evaluation and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatisticsSnapshot {
    pub learned_count: u64,
    pub applied_count: u64,
    pub completed_count: u64,
    pub shared_count: u64,
    pub submitted_count: u64,
    pub distinct_people_taught: u64,
    /// Category labels of every completed use case
    pub labels_covered: BTreeSet<String>,
    pub learned_today: u64,
}

/// Facts read from the activity store for one user.
#[derive(Debug, Clone, Default)]
pub struct UserFacts {
    pub progress: Vec<ProgressRecord>,
    /// Shares the user sent
    pub shares: Vec<ShareRecord>,
    pub submitted_count: u64,
    /// Labels keyed by use case id
    pub labels: HashMap<String, Vec<String>>,
}

impl UserStatisticsSnapshot {
    pub fn from_facts(facts: &UserFacts, today: NaiveDate) -> Self {
        let (day_start, day_end) = utc_day_window(today);
        let mut snapshot = Self { submitted_count: facts.submitted_count, ..Self::default() };

        for row in &facts.progress {
            if let Some(seen_at) = row.seen_at {
                snapshot.learned_count += 1;
                if seen_at >= day_start && seen_at < day_end {
                    snapshot.learned_today += 1;
                }
            }
            if row.is_applied() {
                snapshot.applied_count += 1;
            }
            if row.is_completed() {
                snapshot.completed_count += 1;
                if let Some(labels) = facts.labels.get(&row.use_case_id) {
                    snapshot.labels_covered.extend(labels.iter().cloned());
                }
            }
        }

        snapshot.shared_count =
            facts.shares.iter().filter(|s| s.status != ShareStatus::Denied).count() as u64;

        let taught: BTreeSet<&str> = facts
            .shares
            .iter()
            .filter(|s| s.status == ShareStatus::Confirmed)
            .map(|s| s.recipient_id.as_str())
            .collect();
        snapshot.distinct_people_taught = taught.len() as u64;

        snapshot
    }
}
