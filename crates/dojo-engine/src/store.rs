use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dojo_common::challenges::ChallengeType;
use dojo_common::{ProgressRecord, ShareRecord};
use dojo_db::queries::{
    BadgeQueries, ChallengeQueries, ProgressQueries, ShareQueries, SubmissionQueries, UseCaseQueries,
};
use dojo_db::Database;
use std::collections::HashMap;
use tracing::warn;

/// Everything the engine reads from and writes to durable storage.
///
/// The two writes are insert-if-absent: they return `true` only when the
/// call created the row, and a conflicting row is not an error.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>>;

    async fn shares_sent(&self, user_id: &str) -> Result<Vec<ShareRecord>>;

    async fn submitted_count(&self, user_id: &str) -> Result<u64>;

    /// Confirmed shares sent by the user
    async fn teaching_credit_count(&self, user_id: &str) -> Result<u64>;

    /// The user's submissions shared by at least `threshold` other people
    async fn viral_count(&self, user_id: &str, threshold: u32) -> Result<u64>;

    /// Labels of the use cases the user has progress on, keyed by use case id
    async fn use_case_labels(&self, user_id: &str) -> Result<HashMap<String, Vec<String>>>;

    async fn earned_badges(&self, user_id: &str) -> Result<Vec<String>>;

    async fn award_badge(&self, user_id: &str, badge_id: &str, earned_at: DateTime<Utc>) -> Result<bool>;

    /// The type recorded for `date`. A row whose type cannot be read back is
    /// reported as `None` rather than an error.
    async fn completion(&self, user_id: &str, date: NaiveDate) -> Result<Option<ChallengeType>>;

    async fn completion_dates(
        &self,
        user_id: &str,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<NaiveDate>>;

    async fn record_completion(
        &self,
        user_id: &str,
        date: NaiveDate,
        challenge_type: ChallengeType,
        completed_at: DateTime<Utc>,
    ) -> Result<bool>;

    async fn has_activity(
        &self,
        user_id: &str,
        challenge_type: ChallengeType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool>;
}

fn non_negative(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[async_trait]
impl ActivityStore for Database {
    async fn progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>> {
        let rows = ProgressQueries::list_for_user(self, user_id).await?;
        Ok(rows.into_iter().map(ProgressRecord::from).collect())
    }

    async fn shares_sent(&self, user_id: &str) -> Result<Vec<ShareRecord>> {
        let rows = ShareQueries::list_sent_by(self, user_id).await?;
        let shares = rows.into_iter().map(ShareRecord::try_from).collect::<dojo_db::Result<Vec<_>>>()?;
        Ok(shares)
    }

    async fn submitted_count(&self, user_id: &str) -> Result<u64> {
        Ok(non_negative(SubmissionQueries::count_for_user(self, user_id).await?))
    }

    async fn teaching_credit_count(&self, user_id: &str) -> Result<u64> {
        Ok(non_negative(ShareQueries::count_confirmed_sent_by(self, user_id).await?))
    }

    async fn viral_count(&self, user_id: &str, threshold: u32) -> Result<u64> {
        let count = SubmissionQueries::count_viral_for_user(self, user_id, i64::from(threshold)).await?;
        Ok(non_negative(count))
    }

    async fn use_case_labels(&self, user_id: &str) -> Result<HashMap<String, Vec<String>>> {
        Ok(UseCaseQueries::labels_for_user_progress(self, user_id).await?)
    }

    async fn earned_badges(&self, user_id: &str) -> Result<Vec<String>> {
        let rows = BadgeQueries::list_for_user(self, user_id).await?;
        Ok(rows.into_iter().map(|row| row.badge_id).collect())
    }

    async fn award_badge(&self, user_id: &str, badge_id: &str, earned_at: DateTime<Utc>) -> Result<bool> {
        Ok(BadgeQueries::award(self, user_id, badge_id, earned_at).await?)
    }

    async fn completion(&self, user_id: &str, date: NaiveDate) -> Result<Option<ChallengeType>> {
        let Some(row) = ChallengeQueries::get_completion(self, user_id, date).await? else {
            return Ok(None);
        };

        match row.challenge_type.parse() {
            Ok(challenge_type) => Ok(Some(challenge_type)),
            Err(e) => {
                // the row still holds the (user, date) slot and counts toward the streak
                warn!("Ignoring stored completion for {} on {}: {}", user_id, date, e);
                Ok(None)
            }
        }
    }

    async fn completion_dates(
        &self,
        user_id: &str,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        Ok(ChallengeQueries::completion_dates(self, user_id, since, until).await?)
    }

    async fn record_completion(
        &self,
        user_id: &str,
        date: NaiveDate,
        challenge_type: ChallengeType,
        completed_at: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(ChallengeQueries::record_completion(self, user_id, date, challenge_type, completed_at).await?)
    }

    async fn has_activity(
        &self,
        user_id: &str,
        challenge_type: ChallengeType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(ChallengeQueries::has_activity(self, user_id, challenge_type, start, end).await?)
    }
}
