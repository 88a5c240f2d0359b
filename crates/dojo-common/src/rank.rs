use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankDefinition {
    pub min_points: u64,
    pub name: String,
    pub description: String,
}

impl RankDefinition {
    pub fn new(min_points: u64, name: &str, description: &str) -> Self {
        Self { min_points, name: name.to_string(), description: description.to_string() }
    }
}

/// The next tier above the current point total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextRank {
    pub rank: RankDefinition,
    pub remaining: u64,
}

/// Ordered rank tiers. Always non-empty, starts at zero points and ascends
/// strictly, so every point total resolves to a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankLadder {
    entries: Vec<RankDefinition>,
}

impl RankLadder {
    pub fn new(entries: Vec<RankDefinition>) -> Result<Self> {
        validate_ladder(&entries)?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[RankDefinition] {
        &self.entries
    }

    pub fn current(&self, points: u64) -> &RankDefinition {
        // validated non-empty with a zero-point base
        current_rank(points, &self.entries).unwrap_or(&self.entries[0])
    }

    pub fn next(&self, points: u64) -> Option<NextRank> {
        next_rank(points, &self.entries)
    }

    /// Percentage (0-100) of the way from the current tier to the next.
    /// Holders of the top tier are at 100.
    pub fn progress_percent(&self, points: u64) -> u8 {
        let current = self.current(points);
        match self.next(points) {
            None => 100,
            Some(next) => {
                let span = next.rank.min_points - current.min_points;
                let into = points - current.min_points;
                ((into * 100) / span).min(100) as u8
            }
        }
    }
}

impl Default for RankLadder {
    fn default() -> Self {
        Self { entries: default_ladder() }
    }
}

pub fn default_ladder() -> Vec<RankDefinition> {
    vec![
        RankDefinition::new(0, "Newcomer", "Just getting started"),
        RankDefinition::new(100, "Explorer", "Learning the ropes"),
        RankDefinition::new(300, "Practitioner", "Putting use cases to work"),
        RankDefinition::new(750, "Advocate", "Spreading good practice"),
        RankDefinition::new(1500, "Expert", "A go-to person for the team"),
        RankDefinition::new(3000, "Luminary", "Shaping how the organisation works"),
    ]
}

pub fn validate_ladder(entries: &[RankDefinition]) -> Result<()> {
    let first = entries
        .first()
        .ok_or_else(|| Error::InvalidRankLadder("ladder must have at least one rank".to_string()))?;

    if first.min_points != 0 {
        return Err(Error::InvalidRankLadder(format!(
            "first rank '{}' must start at 0 points, not {}",
            first.name, first.min_points
        )));
    }

    if let Some(pair) = entries.windows(2).find(|pair| pair[1].min_points <= pair[0].min_points) {
        return Err(Error::InvalidRankLadder(format!(
            "rank '{}' ({}) must require more points than '{}' ({})",
            pair[1].name, pair[1].min_points, pair[0].name, pair[0].min_points
        )));
    }

    Ok(())
}

/// The highest entry whose threshold is at most `points`.
pub fn current_rank(points: u64, ladder: &[RankDefinition]) -> Option<&RankDefinition> {
    let mut current = None;
    for entry in ladder {
        if entry.min_points <= points {
            current = Some(entry);
        }
    }
    current
}

/// The first entry above `points`, or `None` at the top tier.
pub fn next_rank(points: u64, ladder: &[RankDefinition]) -> Option<NextRank> {
    ladder
        .iter()
        .find(|entry| entry.min_points > points)
        .map(|entry| NextRank { rank: entry.clone(), remaining: entry.min_points - points })
}
