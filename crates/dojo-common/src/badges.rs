// Badge Rule Engine
//
// A fixed, ordered table of badge rules evaluated against a statistics
// snapshot. Predicates only read counters that never decrease, so a badge
// that qualifies once keeps qualifying.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::stats::UserStatisticsSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    Learning,
    Applying,
    Mastery,
    Teaching,
    Contributing,
}

pub type BadgePredicate = fn(&UserStatisticsSnapshot) -> bool;

#[derive(Clone, Copy)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: BadgeCategory,
    pub predicate: BadgePredicate,
}

impl BadgeDefinition {
    pub fn qualifies(&self, stats: &UserStatisticsSnapshot) -> bool {
        (self.predicate)(stats)
    }
}

impl std::fmt::Debug for BadgeDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BadgeDefinition")
            .field("id", &self.id)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

pub const BADGES: &[BadgeDefinition] = &[
    BadgeDefinition {
        id: "first_steps",
        name: "First Steps",
        description: "Learned your first use case",
        icon: "👣",
        category: BadgeCategory::Learning,
        predicate: |s| s.learned_count >= 1,
    },
    BadgeDefinition {
        id: "curious_mind",
        name: "Curious Mind",
        description: "Learned 5 use cases",
        icon: "🔍",
        category: BadgeCategory::Learning,
        predicate: |s| s.learned_count >= 5,
    },
    BadgeDefinition {
        id: "knowledge_seeker",
        name: "Knowledge Seeker",
        description: "Learned 20 use cases",
        icon: "📚",
        category: BadgeCategory::Learning,
        predicate: |s| s.learned_count >= 20,
    },
    BadgeDefinition {
        id: "speed_learner",
        name: "Speed Learner",
        description: "Learned 3 use cases in a single day",
        icon: "⚡",
        category: BadgeCategory::Learning,
        predicate: |s| s.learned_today >= 3,
    },
    BadgeDefinition {
        id: "hands_on",
        name: "Hands On",
        description: "Applied your first use case",
        icon: "🛠️",
        category: BadgeCategory::Applying,
        predicate: |s| s.applied_count >= 1,
    },
    BadgeDefinition {
        id: "practitioner",
        name: "Practitioner",
        description: "Applied 10 use cases",
        icon: "⚙️",
        category: BadgeCategory::Applying,
        predicate: |s| s.applied_count >= 10,
    },
    BadgeDefinition {
        id: "finisher",
        name: "Finisher",
        description: "Completed a use case end to end",
        icon: "🏁",
        category: BadgeCategory::Mastery,
        predicate: |s| s.completed_count >= 1,
    },
    BadgeDefinition {
        id: "completionist",
        name: "Completionist",
        description: "Completed 10 use cases",
        icon: "🏆",
        category: BadgeCategory::Mastery,
        predicate: |s| s.completed_count >= 10,
    },
    BadgeDefinition {
        id: "explorer",
        name: "Explorer",
        description: "Completed use cases across 3 categories",
        icon: "🧭",
        category: BadgeCategory::Mastery,
        predicate: |s| s.labels_covered.len() >= 3,
    },
    BadgeDefinition {
        id: "polymath",
        name: "Polymath",
        description: "Completed use cases across 6 categories",
        icon: "🌐",
        category: BadgeCategory::Mastery,
        predicate: |s| s.labels_covered.len() >= 6,
    },
    BadgeDefinition {
        id: "first_share",
        name: "First Share",
        description: "Shared a use case with a colleague",
        icon: "🤝",
        category: BadgeCategory::Teaching,
        predicate: |s| s.shared_count >= 1,
    },
    BadgeDefinition {
        id: "mentor",
        name: "Mentor",
        description: "Taught 5 different people",
        icon: "🎓",
        category: BadgeCategory::Teaching,
        predicate: |s| s.distinct_people_taught >= 5,
    },
    BadgeDefinition {
        id: "evangelist",
        name: "Evangelist",
        description: "Taught 20 different people",
        icon: "📣",
        category: BadgeCategory::Teaching,
        predicate: |s| s.distinct_people_taught >= 20,
    },
    BadgeDefinition {
        id: "contributor",
        name: "Contributor",
        description: "Submitted a new use case",
        icon: "💡",
        category: BadgeCategory::Contributing,
        predicate: |s| s.submitted_count >= 1,
    },
    BadgeDefinition {
        id: "prolific_contributor",
        name: "Prolific Contributor",
        description: "Submitted 5 use cases",
        icon: "🚀",
        category: BadgeCategory::Contributing,
        predicate: |s| s.submitted_count >= 5,
    },
];

pub fn find_badge(id: &str) -> Option<&'static BadgeDefinition> {
    BADGES.iter().find(|badge| badge.id == id)
}

/// Ids of badges the user qualifies for but has not yet earned, in table order.
pub fn evaluate<S: AsRef<str>>(stats: &UserStatisticsSnapshot, already_earned: &[S]) -> Vec<&'static str> {
    evaluate_with(BADGES, stats, already_earned)
}

pub fn evaluate_with<S: AsRef<str>>(
    table: &'static [BadgeDefinition],
    stats: &UserStatisticsSnapshot,
    already_earned: &[S],
) -> Vec<&'static str> {
    let earned: HashSet<&str> = already_earned.iter().map(|id| id.as_ref()).collect();

    table
        .iter()
        .filter(|badge| !earned.contains(badge.id))
        .filter(|badge| badge.qualifies(stats))
        .map(|badge| badge.id)
        .collect()
}
