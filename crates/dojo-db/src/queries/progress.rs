use crate::connection::Database;
use crate::error::{DbError, Result};
use crate::models::DbProgress;
use chrono::{DateTime, Utc};
use tracing::debug;

pub struct ProgressQueries;

impl ProgressQueries {
    /// Records that the user learned the use case. The first timestamp wins.
    pub async fn mark_seen(
        db: &Database,
        user_id: &str,
        use_case_id: &str,
        at: DateTime<Utc>,
    ) -> Result<DbProgress> {
        let pool = db.pool()?;

        sqlx::query(
            r#"
            INSERT INTO progress (user_id, use_case_id, seen_at, share_count)
            VALUES (?, ?, ?, 0)
            ON CONFLICT (user_id, use_case_id)
            DO UPDATE SET seen_at = COALESCE(progress.seen_at, excluded.seen_at)
            "#,
        )
        .bind(user_id)
        .bind(use_case_id)
        .bind(at)
        .execute(pool)
        .await?;

        debug!("Marked {} seen by {}", use_case_id, user_id);
        Self::get(db, user_id, use_case_id).await
    }

    /// Records that the user applied the use case. The first timestamp wins.
    pub async fn mark_done(
        db: &Database,
        user_id: &str,
        use_case_id: &str,
        at: DateTime<Utc>,
    ) -> Result<DbProgress> {
        let pool = db.pool()?;

        sqlx::query(
            r#"
            INSERT INTO progress (user_id, use_case_id, done_at, share_count)
            VALUES (?, ?, ?, 0)
            ON CONFLICT (user_id, use_case_id)
            DO UPDATE SET done_at = COALESCE(progress.done_at, excluded.done_at)
            "#,
        )
        .bind(user_id)
        .bind(use_case_id)
        .bind(at)
        .execute(pool)
        .await?;

        debug!("Marked {} done by {}", use_case_id, user_id);
        Self::get(db, user_id, use_case_id).await
    }

    pub async fn get(db: &Database, user_id: &str, use_case_id: &str) -> Result<DbProgress> {
        let pool = db.pool()?;

        sqlx::query_as::<_, DbProgress>(
            "SELECT * FROM progress WHERE user_id = ? AND use_case_id = ?",
        )
        .bind(user_id)
        .bind(use_case_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| {
            DbError::NotFound(format!("Progress for {} on {} not found", user_id, use_case_id))
        })
    }

    pub async fn list_for_user(db: &Database, user_id: &str) -> Result<Vec<DbProgress>> {
        let pool = db.pool()?;

        sqlx::query_as::<_, DbProgress>(
            "SELECT * FROM progress WHERE user_id = ? ORDER BY use_case_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(DbError::Sqlx)
    }
}
