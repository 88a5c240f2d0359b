use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use dojo_common::badges;
use dojo_common::calendar::{is_workday, utc_day_window};
use dojo_common::challenges::{current_streak, select_daily_challenges, DailyChallengeStatus};
use dojo_common::config::{ChallengeConfig, PointsConfig};
use dojo_common::points::{compute_breakdown, PointsBreakdown};
use dojo_common::rank::{NextRank, RankDefinition, RankLadder};
use dojo_common::stats::{UserFacts, UserStatisticsSnapshot};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::notification_manager::{Notification, NotificationManager};
use crate::store::ActivityStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankStatus {
    pub points: u64,
    pub current: RankDefinition,
    pub next: Option<NextRank>,
    pub progress_percent: u8,
}

/// Everything the presentation layer shows for one user.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user_id: String,
    pub points: PointsBreakdown,
    pub rank: RankStatus,
    pub badges: Vec<String>,
    pub new_badges: Vec<String>,
    pub daily_challenge: DailyChallengeStatus,
}

/// Derives game state from an activity store.
///
/// Holds no per-user state; every call rebuilds what it needs from the
/// store, so one instance can serve any number of concurrent requests.
pub struct GamificationService<S> {
    store: S,
    points: PointsConfig,
    ladder: RankLadder,
    challenges: ChallengeConfig,
    notifier: Option<NotificationManager>,
}

impl<S: ActivityStore> GamificationService<S> {
    pub fn new(store: S, config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            store,
            points: config.points.clone(),
            ladder: config.rank_ladder()?,
            challenges: config.challenges.clone(),
            notifier: None,
        })
    }

    pub fn with_notifier(mut self, notifier: NotificationManager) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ladder(&self) -> &RankLadder {
        &self.ladder
    }

    pub async fn statistics(&self, user_id: &str, now: DateTime<Utc>) -> Result<UserStatisticsSnapshot> {
        let facts = UserFacts {
            progress: self.store.progress(user_id).await?,
            shares: self.store.shares_sent(user_id).await?,
            submitted_count: self.store.submitted_count(user_id).await?,
            labels: self.store.use_case_labels(user_id).await?,
        };

        Ok(UserStatisticsSnapshot::from_facts(&facts, now.date_naive()))
    }

    pub async fn points(&self, user_id: &str) -> Result<PointsBreakdown> {
        let progress = self.store.progress(user_id).await?;
        let submitted = self.store.submitted_count(user_id).await?;
        let viral = self.store.viral_count(user_id, self.points.viral_threshold).await?;
        let teaching = self.store.teaching_credit_count(user_id).await?;

        let breakdown = compute_breakdown(&progress, submitted, viral, &self.points)
            .with_teaching_credits(teaching, &self.points);

        debug!("Points for {}: {}", user_id, breakdown.total);
        Ok(breakdown)
    }

    pub fn rank_for_points(&self, points: u64) -> RankStatus {
        RankStatus {
            points,
            current: self.ladder.current(points).clone(),
            next: self.ladder.next(points),
            progress_percent: self.ladder.progress_percent(points),
        }
    }

    pub async fn rank(&self, user_id: &str) -> Result<RankStatus> {
        let points = self.points(user_id).await?;
        Ok(self.rank_for_points(points.total))
    }

    /// Awards every badge the user newly qualifies for and returns the ids
    /// this call actually inserted. A badge recorded concurrently by another
    /// evaluation is skipped silently.
    pub async fn evaluate_badges(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<String>> {
        let stats = self.statistics(user_id, now).await?;
        let already_earned = self.store.earned_badges(user_id).await?;

        let mut awarded = Vec::new();
        for badge_id in badges::evaluate(&stats, already_earned.as_slice()) {
            let inserted = self
                .store
                .award_badge(user_id, badge_id, now)
                .await
                .with_context(|| format!("Failed to award badge {} to {}", badge_id, user_id))?;

            if inserted {
                info!("{} earned badge {}", user_id, badge_id);
                self.notify(Notification::badge_earned(user_id, badge_id, now));
                awarded.push(badge_id.to_string());
            }
        }

        Ok(awarded)
    }

    /// Today's challenges, detecting and recording a completion when the
    /// user's activity for the UTC day satisfies one of them.
    ///
    /// Challenges are probed in selection order (easy, medium, hard) and the
    /// first satisfied one is recorded.
    pub async fn daily_challenge_status(&self, user_id: &str, now: DateTime<Utc>) -> Result<DailyChallengeStatus> {
        let today = now.date_naive();

        if !is_workday(today) {
            debug!("{} is not a workday, no daily challenge", today);
            return Ok(DailyChallengeStatus {
                date: today,
                challenges: Vec::new(),
                completed_type: None,
                streak: self.streak(user_id, today).await?,
                is_workday: false,
            });
        }

        let challenges = select_daily_challenges(today);
        let mut completed_type = self.store.completion(user_id, today).await?;
        let mut newly_completed = false;

        if completed_type.is_none() {
            let (start, end) = utc_day_window(today);

            for challenge in &challenges {
                let satisfied = self
                    .store
                    .has_activity(user_id, challenge.challenge_type, start, end)
                    .await?;
                if !satisfied {
                    continue;
                }

                newly_completed = self
                    .store
                    .record_completion(user_id, today, challenge.challenge_type, now)
                    .await?;

                // a concurrent check may have recorded a different type first
                completed_type = self.store.completion(user_id, today).await?;
                break;
            }
        }

        let streak = self.streak(user_id, today).await?;

        if newly_completed {
            if let Some(challenge_type) = completed_type {
                info!("{} completed daily challenge {} (streak {})", user_id, challenge_type, streak);
                self.notify(Notification::ChallengeCompleted {
                    user_id: user_id.to_string(),
                    challenge_type,
                    streak,
                });
            }
        }

        Ok(DailyChallengeStatus {
            date: today,
            challenges: challenges.to_vec(),
            completed_type,
            streak,
            is_workday: true,
        })
    }

    pub async fn streak(&self, user_id: &str, today: NaiveDate) -> Result<u32> {
        let lookback = self.challenges.streak_lookback_days;
        let since = today - Duration::days(i64::from(lookback));

        let completed: HashSet<NaiveDate> =
            self.store.completion_dates(user_id, since, today).await?.into_iter().collect();

        Ok(current_streak(today, &completed, lookback))
    }

    pub async fn profile(&self, user_id: &str, now: DateTime<Utc>) -> Result<UserProfile> {
        let daily_challenge = self.daily_challenge_status(user_id, now).await?;
        let new_badges = self.evaluate_badges(user_id, now).await?;
        let points = self.points(user_id).await?;
        let rank = self.rank_for_points(points.total);
        let badges = self.store.earned_badges(user_id).await?;

        Ok(UserProfile { user_id: user_id.to_string(), points, rank, badges, new_badges, daily_challenge })
    }

    fn notify(&self, notification: Notification) {
        if let Some(notifier) = &self.notifier {
            notifier.send(notification);
        }
    }
}
