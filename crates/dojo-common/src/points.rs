// Points Calculator
//
// Turns per-use-case progress into a points breakdown. Pure; inputs are
// assumed to be already-validated counts.

use serde::{Deserialize, Serialize};

use crate::config::PointsConfig;
use crate::types::{ProgressRecord, COMPLETION_SHARE_THRESHOLD};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsBreakdown {
    pub learned: u64,
    pub applied: u64,
    pub shared: u64,
    pub submitted: u64,
    pub teaching: u64,
    pub bonuses: u64,
    pub total: u64,

    pub learned_count: u64,
    pub applied_count: u64,
    pub shared_count: u64,
    pub submitted_count: u64,
    pub teaching_count: u64,
    pub viral_count: u64,
    /// Shares beyond the first two on any use case
    pub extra_share_count: u64,
}

impl PointsBreakdown {
    /// Adds teaching credits earned through other users' confirmations.
    pub fn with_teaching_credits(mut self, credits: u64, config: &PointsConfig) -> Self {
        self.teaching_count = credits;
        self.teaching = credits * u64::from(config.teaching_points);
        self.total = self.learned + self.applied + self.shared + self.submitted + self.teaching + self.bonuses;
        self
    }
}

pub fn compute_breakdown(
    progress: &[ProgressRecord],
    submitted_count: u64,
    viral_count: u64,
    config: &PointsConfig,
) -> PointsBreakdown {
    let mut breakdown = PointsBreakdown::default();
    let mut extra_share_bonus = 0u64;

    for row in progress {
        if row.is_learned() {
            breakdown.learned_count += 1;
            breakdown.learned += u64::from(config.learned_points);
        }
        if row.is_applied() {
            breakdown.applied_count += 1;
            breakdown.applied += u64::from(config.applied_points);
        }
        if row.share_count >= 1 {
            breakdown.shared_count += 1;
            breakdown.shared += u64::from(config.shared_points);
        }
        if row.share_count > COMPLETION_SHARE_THRESHOLD {
            let extra = u64::from(row.share_count - COMPLETION_SHARE_THRESHOLD);
            breakdown.extra_share_count += extra;
            extra_share_bonus += extra * u64::from(config.extra_share_points_per_unit);
        }
    }

    breakdown.submitted_count = submitted_count;
    breakdown.submitted = submitted_count * u64::from(config.submission_points);

    breakdown.viral_count = viral_count;
    breakdown.bonuses = viral_count * u64::from(config.viral_bonus_points) + extra_share_bonus;

    breakdown.total =
        breakdown.learned + breakdown.applied + breakdown.shared + breakdown.submitted + breakdown.bonuses;

    breakdown
}
