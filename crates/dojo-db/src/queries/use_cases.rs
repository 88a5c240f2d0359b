use std::collections::HashMap;

use crate::connection::Database;
use crate::error::{DbError, Result};
use crate::models::{DbUseCase, NewUseCase};
use chrono::Utc;

pub struct UseCaseQueries;

impl UseCaseQueries {
    /// Inserts the use case and its labels in one transaction.
    pub async fn create(db: &Database, use_case: NewUseCase) -> Result<DbUseCase> {
        let pool = db.pool()?;
        let mut tx = pool.begin().await?;

        let result = sqlx::query("INSERT INTO use_cases (id, title, created_at) VALUES (?, ?, ?)")
            .bind(&use_case.id)
            .bind(&use_case.title)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(DbError::Duplicate(format!("Use case '{}' already exists", use_case.id)));
            }
            Err(e) => return Err(DbError::Sqlx(e)),
        }

        for label in &use_case.labels {
            sqlx::query("INSERT OR IGNORE INTO use_case_labels (use_case_id, label) VALUES (?, ?)")
                .bind(&use_case.id)
                .bind(label)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Self::get_by_id(db, &use_case.id).await
    }

    pub async fn get_by_id(db: &Database, id: &str) -> Result<DbUseCase> {
        let pool = db.pool()?;

        sqlx::query_as::<_, DbUseCase>("SELECT * FROM use_cases WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Use case {} not found", id)))
    }

    pub async fn labels(db: &Database, use_case_id: &str) -> Result<Vec<String>> {
        let pool = db.pool()?;

        sqlx::query_scalar("SELECT label FROM use_case_labels WHERE use_case_id = ? ORDER BY label")
            .bind(use_case_id)
            .fetch_all(pool)
            .await
            .map_err(DbError::Sqlx)
    }

    /// Labels of every use case the user has a progress row for, keyed by use case id.
    pub async fn labels_for_user_progress(
        db: &Database,
        user_id: &str,
    ) -> Result<HashMap<String, Vec<String>>> {
        let pool = db.pool()?;

        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT l.use_case_id, l.label
            FROM use_case_labels l
            JOIN progress p ON p.use_case_id = l.use_case_id
            WHERE p.user_id = ?
            ORDER BY l.use_case_id, l.label
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let mut labels: HashMap<String, Vec<String>> = HashMap::new();
        for (use_case_id, label) in rows {
            labels.entry(use_case_id).or_default().push(label);
        }
        Ok(labels)
    }
}
