use crate::connection::Database;
use crate::error::{DbError, Result};
use crate::models::DbSubmission;
use chrono::{DateTime, Utc};
use dojo_common::ShareStatus;
use uuid::Uuid;

pub struct SubmissionQueries;

impl SubmissionQueries {
    pub async fn create(
        db: &Database,
        user_id: &str,
        use_case_id: &str,
        at: DateTime<Utc>,
    ) -> Result<DbSubmission> {
        let pool = db.pool()?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO submissions (id, user_id, use_case_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(use_case_id)
        .bind(at)
        .execute(pool)
        .await?;

        sqlx::query_as::<_, DbSubmission>("SELECT * FROM submissions WHERE id = ?")
            .bind(&id)
            .fetch_one(pool)
            .await
            .map_err(DbError::Sqlx)
    }

    pub async fn count_for_user(db: &Database, user_id: &str) -> Result<i64> {
        let pool = db.pool()?;

        sqlx::query_scalar("SELECT COUNT(*) FROM submissions WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .map_err(DbError::Sqlx)
    }

    /// Submissions by the user that at least `threshold` other people have
    /// shared (denied shares do not count).
    pub async fn count_viral_for_user(db: &Database, user_id: &str, threshold: i64) -> Result<i64> {
        let pool = db.pool()?;

        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM submissions sub
            WHERE sub.user_id = ?
              AND (
                SELECT COUNT(DISTINCT s.sharer_id) FROM shares s
                WHERE s.use_case_id = sub.use_case_id
                  AND s.sharer_id != sub.user_id
                  AND s.status != ?
              ) >= ?
            "#,
        )
        .bind(user_id)
        .bind(ShareStatus::Denied.as_str())
        .bind(threshold)
        .fetch_one(pool)
        .await
        .map_err(DbError::Sqlx)
    }
}
