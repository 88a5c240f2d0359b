use crate::connection::Database;
use crate::error::{DbError, Result};
use crate::models::DbChallengeCompletion;
use chrono::{DateTime, NaiveDate, Utc};
use dojo_common::challenges::ChallengeType;
use dojo_common::ShareStatus;

pub struct ChallengeQueries;

impl ChallengeQueries {
    /// Records the day's completion. Keyed on (user, date) with conflicts
    /// ignored: only the first detection of the day creates a row, and the
    /// return value tells whether this call was it.
    pub async fn record_completion(
        db: &Database,
        user_id: &str,
        date: NaiveDate,
        challenge_type: ChallengeType,
        completed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let pool = db.pool()?;

        let result = sqlx::query(
            r#"
            INSERT INTO daily_challenge_completions (user_id, challenge_date, challenge_type, completed_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id, challenge_date) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(challenge_type.as_str())
        .bind(completed_at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn get_completion(
        db: &Database,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DbChallengeCompletion>> {
        let pool = db.pool()?;

        sqlx::query_as::<_, DbChallengeCompletion>(
            "SELECT * FROM daily_challenge_completions WHERE user_id = ? AND challenge_date = ?",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(pool)
        .await
        .map_err(DbError::Sqlx)
    }

    /// Completion dates in `[since, until]`, newest first.
    pub async fn completion_dates(
        db: &Database,
        user_id: &str,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let pool = db.pool()?;

        sqlx::query_scalar(
            r#"
            SELECT challenge_date FROM daily_challenge_completions
            WHERE user_id = ? AND challenge_date >= ? AND challenge_date <= ?
            ORDER BY challenge_date DESC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(until)
        .fetch_all(pool)
        .await
        .map_err(DbError::Sqlx)
    }

    /// Whether the user produced the activity behind `challenge_type` in
    /// `[start, end)`.
    pub async fn has_activity(
        db: &Database,
        user_id: &str,
        challenge_type: ChallengeType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool> {
        let pool = db.pool()?;

        let sql = activity_probe(challenge_type);
        let mut query = sqlx::query_scalar::<_, bool>(sql).bind(user_id).bind(start).bind(end);
        if challenge_type == ChallengeType::Complete {
            query = query.bind(ShareStatus::Denied.as_str());
        }

        query.fetch_one(pool).await.map_err(DbError::Sqlx)
    }
}

/// One probe per challenge type. Every probe binds user, window start and
/// window end, in that order.
fn activity_probe(challenge_type: ChallengeType) -> &'static str {
    match challenge_type {
        ChallengeType::Learn => {
            "SELECT EXISTS(SELECT 1 FROM progress WHERE user_id = ? AND seen_at >= ? AND seen_at < ?)"
        }
        ChallengeType::Upvote => {
            "SELECT EXISTS(SELECT 1 FROM upvotes WHERE user_id = ? AND created_at >= ? AND created_at < ?)"
        }
        ChallengeType::Comment => {
            "SELECT EXISTS(SELECT 1 FROM comments WHERE user_id = ? AND created_at >= ? AND created_at < ?)"
        }
        ChallengeType::Apply => {
            "SELECT EXISTS(SELECT 1 FROM progress WHERE user_id = ? AND done_at >= ? AND done_at < ?)"
        }
        ChallengeType::Share => {
            "SELECT EXISTS(SELECT 1 FROM shares WHERE sharer_id = ? AND created_at >= ? AND created_at < ?)"
        }
        ChallengeType::LearnThree => {
            "SELECT COUNT(*) >= 3 FROM progress WHERE user_id = ? AND seen_at >= ? AND seen_at < ?"
        }
        ChallengeType::Submit => {
            "SELECT EXISTS(SELECT 1 FROM submissions WHERE user_id = ? AND created_at >= ? AND created_at < ?)"
        }
        ChallengeType::TeachTwo => {
            "SELECT COUNT(DISTINCT recipient_id) >= 2 FROM shares WHERE sharer_id = ? AND created_at >= ? AND created_at < ?"
        }
        ChallengeType::Complete => {
            r#"
            SELECT EXISTS(
                SELECT 1 FROM shares s
                JOIN progress p ON p.user_id = s.sharer_id AND p.use_case_id = s.use_case_id
                WHERE s.sharer_id = ? AND s.created_at >= ? AND s.created_at < ?
                  AND s.status != ?
                  AND p.done_at IS NOT NULL AND p.share_count >= 2
            )
            "#
        }
    }
}
