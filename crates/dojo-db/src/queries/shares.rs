use crate::connection::Database;
use crate::error::{DbError, Result};
use crate::models::{DbShare, NewShare};
use dojo_common::ShareStatus;
use tracing::debug;

pub struct ShareQueries;

impl ShareQueries {
    /// Appends a pending share and bumps the sharer's share count for the
    /// use case in the same transaction.
    pub async fn create(db: &Database, share: NewShare) -> Result<DbShare> {
        let pool = db.pool()?;
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO shares (id, sharer_id, recipient_id, use_case_id, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&share.id)
        .bind(&share.sharer_id)
        .bind(&share.recipient_id)
        .bind(&share.use_case_id)
        .bind(ShareStatus::Pending.as_str())
        .bind(share.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO progress (user_id, use_case_id, share_count)
            VALUES (?, ?, 1)
            ON CONFLICT (user_id, use_case_id)
            DO UPDATE SET share_count = progress.share_count + 1
            "#,
        )
        .bind(&share.sharer_id)
        .bind(&share.use_case_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!("{} shared {} with {}", share.sharer_id, share.use_case_id, share.recipient_id);
        Self::get_by_id(db, &share.id).await
    }

    pub async fn get_by_id(db: &Database, id: &str) -> Result<DbShare> {
        let pool = db.pool()?;

        sqlx::query_as::<_, DbShare>("SELECT * FROM shares WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Share {} not found", id)))
    }

    pub async fn update_status(db: &Database, id: &str, status: ShareStatus) -> Result<()> {
        let pool = db.pool()?;

        let result = sqlx::query("UPDATE shares SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            Err(DbError::NotFound(format!("Share {} not found", id)))
        } else {
            Ok(())
        }
    }

    pub async fn list_sent_by(db: &Database, sharer_id: &str) -> Result<Vec<DbShare>> {
        let pool = db.pool()?;

        sqlx::query_as::<_, DbShare>(
            "SELECT * FROM shares WHERE sharer_id = ? ORDER BY created_at DESC",
        )
        .bind(sharer_id)
        .fetch_all(pool)
        .await
        .map_err(DbError::Sqlx)
    }

    /// Confirmed shares sent by the user; each is one teaching credit.
    pub async fn count_confirmed_sent_by(db: &Database, sharer_id: &str) -> Result<i64> {
        let pool = db.pool()?;

        sqlx::query_scalar("SELECT COUNT(*) FROM shares WHERE sharer_id = ? AND status = ?")
            .bind(sharer_id)
            .bind(ShareStatus::Confirmed.as_str())
            .fetch_one(pool)
            .await
            .map_err(DbError::Sqlx)
    }
}
