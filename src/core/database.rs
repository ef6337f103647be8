// src/core/database.rs
//! SQLite persistence for scraped profiles: one record per owner

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::core::FsOps;
use crate::linkedin::serialize::Record;
use crate::types::StoredProfile;

// ===== Core Database Connection Management =====

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create new database connection with automatic setup
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            FsOps::ensure_dir_exists(parent).await?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and run migrations on it
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn profiles(&self) -> ProfileRepository {
        ProfileRepository::new(self.pool.clone())
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS linkedin_profiles (
                owner TEXT PRIMARY KEY NOT NULL,
                data TEXT NOT NULL,
                run_id TEXT NOT NULL,
                last_modified TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_linkedin_profiles_last_modified ON linkedin_profiles(last_modified);",
        )
        .execute(&self.pool)
        .await?;

        info!("Database migrations completed");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

// ===== Profile Store =====

/// Destination of finished scraping runs
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find(&self, owner: &str) -> Result<Option<StoredProfile>>;

    /// Insert or replace the owner's record
    async fn upsert(&self, owner: &str, record: &Record, run_id: Uuid) -> Result<()>;
}

#[derive(Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<StoredProfile>> {
        let profiles = sqlx::query_as::<_, StoredProfile>(
            r#"
            SELECT owner, data, run_id, last_modified
            FROM linkedin_profiles
            ORDER BY owner ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    pub async fn delete(&self, owner: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM linkedin_profiles WHERE owner = ?")
            .bind(owner)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted stored profile for: {}", owner);
        }
        Ok(deleted)
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn find(&self, owner: &str) -> Result<Option<StoredProfile>> {
        let profile = sqlx::query_as::<_, StoredProfile>(
            r#"
            SELECT owner, data, run_id, last_modified
            FROM linkedin_profiles
            WHERE owner = ?
            "#,
        )
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn upsert(&self, owner: &str, record: &Record, run_id: Uuid) -> Result<()> {
        let data = serde_json::to_string(record).context("Failed to encode profile record")?;

        sqlx::query(
            r#"
            INSERT INTO linkedin_profiles (owner, data, run_id, last_modified)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(owner) DO UPDATE SET
                data = excluded.data,
                run_id = excluded.run_id,
                last_modified = excluded.last_modified
            "#,
        )
        .bind(owner)
        .bind(data)
        .bind(run_id.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to store profile for {}", owner))?;

        info!("Stored profile for {} (run {})", owner, run_id);
        Ok(())
    }
}
