// Daily Challenges
//
// Challenge pools, the deterministic per-day selection and streak
// arithmetic. Completion detection against stored activity lives in the
// engine; everything here is pure.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{daily_selection_index, date_key, is_workday, previous_workday};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Salt mixed into the daily hash so each pool rotates independently
    pub fn salt(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn pool(&self) -> &'static [ChallengeDefinition] {
        match self {
            Difficulty::Easy => EASY_POOL,
            Difficulty::Medium => MEDIUM_POOL,
            Difficulty::Hard => HARD_POOL,
        }
    }
}

/// Each type maps to one kind of activity signal in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    Learn,
    Upvote,
    Comment,
    Apply,
    Share,
    LearnThree,
    Submit,
    TeachTwo,
    Complete,
}

impl ChallengeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeType::Learn => "learn",
            ChallengeType::Upvote => "upvote",
            ChallengeType::Comment => "comment",
            ChallengeType::Apply => "apply",
            ChallengeType::Share => "share",
            ChallengeType::LearnThree => "learn_three",
            ChallengeType::Submit => "submit",
            ChallengeType::TeachTwo => "teach_two",
            ChallengeType::Complete => "complete",
        }
    }
}

impl fmt::Display for ChallengeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallengeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "learn" => Ok(ChallengeType::Learn),
            "upvote" => Ok(ChallengeType::Upvote),
            "comment" => Ok(ChallengeType::Comment),
            "apply" => Ok(ChallengeType::Apply),
            "share" => Ok(ChallengeType::Share),
            "learn_three" => Ok(ChallengeType::LearnThree),
            "submit" => Ok(ChallengeType::Submit),
            "teach_two" => Ok(ChallengeType::TeachTwo),
            "complete" => Ok(ChallengeType::Complete),
            other => Err(Error::UnknownChallengeType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChallengeDefinition {
    #[serde(rename = "type")]
    pub challenge_type: ChallengeType,
    pub difficulty: Difficulty,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const EASY_POOL: &[ChallengeDefinition] = &[
    ChallengeDefinition {
        challenge_type: ChallengeType::Learn,
        difficulty: Difficulty::Easy,
        title: "Learn something new",
        description: "Open and learn any use case today",
        icon: "📖",
    },
    ChallengeDefinition {
        challenge_type: ChallengeType::Upvote,
        difficulty: Difficulty::Easy,
        title: "Show some love",
        description: "Upvote a use case you found useful",
        icon: "👍",
    },
    ChallengeDefinition {
        challenge_type: ChallengeType::Comment,
        difficulty: Difficulty::Easy,
        title: "Join the conversation",
        description: "Leave a comment on a use case",
        icon: "💬",
    },
];

pub const MEDIUM_POOL: &[ChallengeDefinition] = &[
    ChallengeDefinition {
        challenge_type: ChallengeType::Apply,
        difficulty: Difficulty::Medium,
        title: "Put it to work",
        description: "Apply a use case in your own work",
        icon: "🛠️",
    },
    ChallengeDefinition {
        challenge_type: ChallengeType::Share,
        difficulty: Difficulty::Medium,
        title: "Pass it on",
        description: "Share a use case with a colleague",
        icon: "🤝",
    },
    ChallengeDefinition {
        challenge_type: ChallengeType::LearnThree,
        difficulty: Difficulty::Medium,
        title: "Triple play",
        description: "Learn three use cases today",
        icon: "🎯",
    },
];

pub const HARD_POOL: &[ChallengeDefinition] = &[
    ChallengeDefinition {
        challenge_type: ChallengeType::Submit,
        difficulty: Difficulty::Hard,
        title: "Add to the catalogue",
        description: "Submit a new use case",
        icon: "💡",
    },
    ChallengeDefinition {
        challenge_type: ChallengeType::TeachTwo,
        difficulty: Difficulty::Hard,
        title: "Teach a crowd",
        description: "Share with two different people today",
        icon: "🎓",
    },
    ChallengeDefinition {
        challenge_type: ChallengeType::Complete,
        difficulty: Difficulty::Hard,
        title: "Close the loop",
        description: "Share a use case you have applied until it is complete",
        icon: "🏁",
    },
];

pub fn find_challenge(challenge_type: ChallengeType) -> Option<&'static ChallengeDefinition> {
    Difficulty::ALL
        .iter()
        .flat_map(|difficulty| difficulty.pool().iter())
        .find(|def| def.challenge_type == challenge_type)
}

/// The day's easy, medium and hard challenge, in that order.
///
/// Depends only on the date, so every caller agrees on the set without
/// storing it anywhere.
pub fn select_daily_challenges(date: NaiveDate) -> [ChallengeDefinition; 3] {
    let key = date_key(date);
    Difficulty::ALL.map(|difficulty| {
        let pool = difficulty.pool();
        pool[daily_selection_index(&key, difficulty.salt(), pool.len())]
    })
}

/// First challenge, in selection order, for which `satisfied` holds.
pub fn first_satisfied<F>(challenges: &[ChallengeDefinition], mut satisfied: F) -> Option<ChallengeType>
where
    F: FnMut(ChallengeType) -> bool,
{
    challenges.iter().map(|c| c.challenge_type).find(|t| satisfied(*t))
}

/// What a user sees for the day's challenges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyChallengeStatus {
    pub date: NaiveDate,
    /// Empty on non-workdays
    pub challenges: Vec<ChallengeDefinition>,
    pub completed_type: Option<ChallengeType>,
    pub streak: u32,
    pub is_workday: bool,
}

/// Consecutive workdays with a completion, counted backwards.
///
/// The walk starts at `today` when it is a workday that is already
/// completed, otherwise at the previous workday, so an unfinished today
/// does not break the streak. Non-workdays are skipped. The walk never
/// goes further back than `lookback_days`.
pub fn current_streak(today: NaiveDate, completed: &HashSet<NaiveDate>, lookback_days: u32) -> u32 {
    let earliest = today - Duration::days(i64::from(lookback_days));

    let mut day = if is_workday(today) && completed.contains(&today) {
        today
    } else {
        previous_workday(today)
    };

    let mut streak = 0;
    while day >= earliest && completed.contains(&day) {
        streak += 1;
        day = previous_workday(day);
    }
    streak
}
