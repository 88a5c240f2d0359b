use crate::connection::Database;
use crate::error::{DbError, Result};
use crate::models::DbComment;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Upvotes and comments on use cases.
pub struct EngagementQueries;

impl EngagementQueries {
    /// Returns false when the user had already upvoted the use case.
    pub async fn upvote(
        db: &Database,
        user_id: &str,
        use_case_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let pool = db.pool()?;

        let result = sqlx::query(
            r#"
            INSERT INTO upvotes (user_id, use_case_id, created_at) VALUES (?, ?, ?)
            ON CONFLICT (user_id, use_case_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(use_case_id)
        .bind(at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn comment(
        db: &Database,
        user_id: &str,
        use_case_id: &str,
        body: &str,
        at: DateTime<Utc>,
    ) -> Result<DbComment> {
        let pool = db.pool()?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO comments (id, user_id, use_case_id, body, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(use_case_id)
        .bind(body)
        .bind(at)
        .execute(pool)
        .await?;

        sqlx::query_as::<_, DbComment>("SELECT * FROM comments WHERE id = ?")
            .bind(&id)
            .fetch_one(pool)
            .await
            .map_err(DbError::Sqlx)
    }
}
