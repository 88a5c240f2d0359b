use crate::connection::Database;
use crate::error::{DbError, Result};
use crate::models::DbUser;
use chrono::Utc;

pub struct UserQueries;

impl UserQueries {
    pub async fn create(db: &Database, id: &str, display_name: &str) -> Result<DbUser> {
        let pool = db.pool()?;

        let result = sqlx::query("INSERT INTO users (id, display_name, created_at) VALUES (?, ?, ?)")
            .bind(id)
            .bind(display_name)
            .bind(Utc::now())
            .execute(pool)
            .await;

        match result {
            Ok(_) => Self::get_by_id(db, id).await,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(DbError::Duplicate(format!("User '{}' already exists", id)))
            }
            Err(e) => Err(DbError::Sqlx(e)),
        }
    }

    pub async fn get_by_id(db: &Database, id: &str) -> Result<DbUser> {
        let pool = db.pool()?;

        sqlx::query_as::<_, DbUser>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("User {} not found", id)))
    }
}
