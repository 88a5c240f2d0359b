use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string() }
    }
}

/// Point values awarded per activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsConfig {
    pub learned_points: u32,
    pub applied_points: u32,
    pub shared_points: u32,
    /// Awarded for every share of a use case beyond the second
    pub extra_share_points_per_unit: u32,
    pub submission_points: u32,
    /// Awarded per confirmed share, i.e. per person who acknowledged being taught
    pub teaching_points: u32,
    pub viral_bonus_points: u32,
    /// Distinct sharers needed before a submission counts as viral
    pub viral_threshold: u32,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            learned_points: 10,
            applied_points: 25,
            shared_points: 15,
            extra_share_points_per_unit: 5,
            submission_points: 50,
            teaching_points: 20,
            viral_bonus_points: 100,
            viral_threshold: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// How many days back the streak walk may go
    pub streak_lookback_days: u32,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self { streak_lookback_days: 90 }
    }
}
