use crate::connection::Database;
use crate::error::{DbError, Result};
use crate::models::DbUserBadge;
use chrono::{DateTime, Utc};

pub struct BadgeQueries;

impl BadgeQueries {
    /// Insert-if-absent. Returns true only for the call that created the row;
    /// a concurrent or repeated award is a no-op.
    pub async fn award(
        db: &Database,
        user_id: &str,
        badge_id: &str,
        earned_at: DateTime<Utc>,
    ) -> Result<bool> {
        let pool = db.pool()?;

        let result = sqlx::query(
            r#"
            INSERT INTO user_badges (user_id, badge_id, earned_at) VALUES (?, ?, ?)
            ON CONFLICT (user_id, badge_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(badge_id)
        .bind(earned_at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn list_for_user(db: &Database, user_id: &str) -> Result<Vec<DbUserBadge>> {
        let pool = db.pool()?;

        sqlx::query_as::<_, DbUserBadge>(
            "SELECT * FROM user_badges WHERE user_id = ? ORDER BY earned_at, badge_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(DbError::Sqlx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{seed_user, setup_test_db};

    #[tokio::test]
    async fn test_award_is_write_once() {
        let (db, _dir) = setup_test_db().await;
        seed_user(&db, "alice").await;

        assert!(BadgeQueries::award(&db, "alice", "first_steps", Utc::now()).await.unwrap());
        assert!(!BadgeQueries::award(&db, "alice", "first_steps", Utc::now()).await.unwrap());

        let badges = BadgeQueries::list_for_user(&db, "alice").await.unwrap();
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].badge_id, "first_steps");
    }

    #[tokio::test]
    async fn test_concurrent_awards_leave_one_row() {
        let (db, _dir) = setup_test_db().await;
        seed_user(&db, "alice").await;

        let now = Utc::now();
        let (a, b) = tokio::join!(
            BadgeQueries::award(&db, "alice", "mentor", now),
            BadgeQueries::award(&db, "alice", "mentor", now),
        );

        assert_eq!(u8::from(a.unwrap()) + u8::from(b.unwrap()), 1);
        assert_eq!(BadgeQueries::list_for_user(&db, "alice").await.unwrap().len(), 1);
    }
}
