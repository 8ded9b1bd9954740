//! Database migrations
//!
//! Manages the SQLite schema for the aggregate store. Migrations are
//! versioned and applied automatically on database connection.

use sqlx::SqlitePool;

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;

/// SQL for creating the migrations tracking table
const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 1: aggregate key-value store
///
/// Each durable aggregate (accounts, articles, newspapers, org settings)
/// is persisted as a single JSON document keyed by its aggregate name.
const MIGRATION_V1: &str = r#"
    CREATE TABLE IF NOT EXISTS aggregates (
        key TEXT PRIMARY KEY NOT NULL
            CHECK (key IN ('accounts', 'articles', 'newspapers', 'org_settings')),
        value TEXT NOT NULL,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Get the current schema version from the database
async fn get_current_version(pool: &SqlitePool) -> anyhow::Result<i32> {
    sqlx::raw_sql(CREATE_MIGRATIONS_TABLE).execute(pool).await?;

    // MAX() yields a single row holding NULL when no migration has run yet
    let row: (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM _migrations")
        .fetch_one(pool)
        .await?;

    Ok(row.0.unwrap_or(0))
}

/// Record that a migration has been applied
async fn record_migration(pool: &SqlitePool, version: i32) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let current_version = get_current_version(pool).await?;

    if current_version >= CURRENT_VERSION {
        tracing::debug!("Database is up to date");
        return Ok(());
    }

    if current_version < 1 {
        tracing::info!("Applying migration v1: aggregate store");
        sqlx::raw_sql(MIGRATION_V1).execute(pool).await?;
        record_migration(pool, 1).await?;
    }

    tracing::info!("Database migrations completed");
    Ok(())
}

/// Get migration status information
pub async fn migration_status(pool: &SqlitePool) -> anyhow::Result<MigrationStatus> {
    let current_version = get_current_version(pool).await?;
    Ok(MigrationStatus {
        current_version,
        target_version: CURRENT_VERSION,
        needs_migration: current_version < CURRENT_VERSION,
    })
}

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Current schema version in the database
    pub current_version: i32,
    /// Target schema version (latest)
    pub target_version: i32,
    /// Whether migrations need to run
    pub needs_migration: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;

    #[tokio::test]
    async fn test_migrations_run_on_connect() {
        let db = Database::in_memory().await.expect("Failed to create database");

        let status = migration_status(db.pool())
            .await
            .expect("Failed to read migration status");
        assert_eq!(status.current_version, CURRENT_VERSION);
        assert!(!status.needs_migration);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::in_memory().await.expect("Failed to create database");

        run_migrations(db.pool())
            .await
            .expect("Second migration run should be a no-op");

        let versions: Vec<(i32,)> = sqlx::query_as("SELECT version FROM _migrations")
            .fetch_all(db.pool())
            .await
            .expect("Failed to list applied migrations");
        assert_eq!(versions.len(), CURRENT_VERSION as usize);
    }

    #[tokio::test]
    async fn test_aggregate_key_is_constrained() {
        let db = Database::in_memory().await.expect("Failed to create database");

        let result = sqlx::query("INSERT INTO aggregates (key, value) VALUES ('bogus', '[]')")
            .execute(db.pool())
            .await;
        assert!(result.is_err(), "Unknown aggregate keys should be rejected");
    }
}
