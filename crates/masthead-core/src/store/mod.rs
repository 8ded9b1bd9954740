//! Durable store - SQLite-backed aggregate persistence
//!
//! Each owning component keeps its collection in memory and writes the
//! whole collection through to this store after every successful mutation.
//!
//! # Architecture
//!
//! - `database`: connection pool management and initialization
//! - `migrations`: schema versioning and automatic migration
//! - [`Store`]: key-value adapter persisting one JSON document per aggregate
//!
//! Write-through failures are logged and swallowed: the in-memory
//! collections stay authoritative for the running session, and a failed
//! write only risks loss on restart (see [`Store::save`]).

pub mod database;
pub mod migrations;

pub use database::{Database, DatabaseConfig, default_database_path};
pub use migrations::{CURRENT_VERSION, MigrationStatus, migration_status, run_migrations};

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::error;

use crate::Result;

/// The four independently persisted aggregate collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Accounts,
    Articles,
    Newspapers,
    OrgSettings,
}

impl Aggregate {
    /// All aggregate keys
    pub const ALL: [Aggregate; 4] = [
        Aggregate::Accounts,
        Aggregate::Articles,
        Aggregate::Newspapers,
        Aggregate::OrgSettings,
    ];

    /// Storage key for this aggregate
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregate::Accounts => "accounts",
            Aggregate::Articles => "articles",
            Aggregate::Newspapers => "newspapers",
            Aggregate::OrgSettings => "org_settings",
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key-value adapter over the `aggregates` table
#[derive(Debug, Clone)]
pub struct Store {
    db: Database,
}

impl Store {
    /// Create a store over an open database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a store over a fresh in-memory database (useful for testing)
    pub async fn in_memory() -> anyhow::Result<Self> {
        Ok(Self::new(Database::in_memory().await?))
    }

    /// Get the underlying database
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Whether the aggregate has ever been written
    ///
    /// An unwritten aggregate is served from defaults on read.
    pub async fn is_written(&self, key: Aggregate) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM aggregates WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.is_some())
    }

    /// Read an aggregate collection, `None` when it was never written
    pub async fn read<T: DeserializeOwned>(&self, key: Aggregate) -> Result<Option<T>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM aggregates WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some((value,)) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    /// Write an aggregate collection, replacing any previous document
    pub async fn write<T: Serialize>(&self, key: Aggregate, value: &T) -> Result<()> {
        let document = serde_json::to_string(value)?;

        sqlx::query(
            r#"
            INSERT INTO aggregates (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key.as_str())
        .bind(&document)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// Write-through entry point used after every successful mutation
    ///
    /// A failed write is logged and not retried; the caller's in-memory
    /// state is kept as authoritative for the running session.
    pub async fn save<T: Serialize>(&self, key: Aggregate, value: &T) {
        if let Err(err) = self.write(key, value).await {
            error!(aggregate = key.as_str(), %err, "write-through failed, keeping in-memory state");
        }
    }
}
