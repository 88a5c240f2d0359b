use crate::connection::Database;
use crate::error::Result;
use sqlx::migrate::Migrator;
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

impl Database {
    pub async fn run_migrations(&self) -> Result<()> {
        let pool = self.pool()?;

        info!("Running database migrations");
        MIGRATOR.run(pool).await?;
        info!("Database migrations completed successfully");

        Ok(())
    }

    pub async fn verify_migrations(&self) -> Result<i64> {
        let pool = self.pool()?;

        let version: i64 =
            sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations").fetch_one(pool).await?;

        info!("Current migration version: {}", version);

        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::DatabaseConfig;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_run_migrations() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let config = DatabaseConfig { path: db_path.to_str().unwrap().to_string(), ..Default::default() };

        let db = Database::new(config).await.unwrap();
        db.run_migrations().await.unwrap();

        let pool = db.pool().unwrap();
        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        )
        .fetch_all(pool)
        .await
        .unwrap();

        let table_names: Vec<String> = tables.into_iter().map(|(name,)| name).collect();
        for expected in ["progress", "shares", "user_badges", "daily_challenge_completions"] {
            assert!(table_names.contains(&expected.to_string()), "missing table {}", expected);
        }
    }

    #[tokio::test]
    async fn test_migrations_are_rerunnable() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let config = DatabaseConfig { path: db_path.to_str().unwrap().to_string(), ..Default::default() };

        let db = Database::new(config).await.unwrap();
        db.run_migrations().await.unwrap();
        db.run_migrations().await.unwrap();
        assert!(db.verify_migrations().await.unwrap() > 0);
    }
}
