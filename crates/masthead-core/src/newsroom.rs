//! Newsroom facade
//!
//! Wires the four owning components over one durable store. Each component
//! keeps its own collection; cross-component reads go through snapshots
//! taken at call time.

use crate::config::Config;
use crate::editorial::Desk;
use crate::identity::Directory;
use crate::publication::{IssueDraft, PressRoom};
use crate::settings::Organization;
use crate::store::{Database, DatabaseConfig, Store};

/// The running newsroom: all components loaded over a shared store
#[derive(Debug)]
pub struct Newsroom {
    /// Accounts and the active session
    pub directory: Directory,
    /// Articles and their lifecycle
    pub desk: Desk,
    /// Newspaper issues
    pub press: PressRoom,
    /// Organization settings
    pub organization: Organization,
}

impl Newsroom {
    /// Open the newsroom against the configured database
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let db = Database::new(DatabaseConfig::with_path(config.database_path())).await?;
        Self::with_store(Store::new(db)).await
    }

    /// Open a newsroom over a fresh in-memory database (useful for testing)
    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::with_store(Store::in_memory().await?).await
    }

    /// Open a newsroom over an existing store
    ///
    /// Loads every collection from the store, bootstrapping the default
    /// administrator when the account collection is empty.
    pub async fn with_store(store: Store) -> anyhow::Result<Self> {
        let directory = Directory::load(store.clone()).await?;
        let desk = Desk::load(store.clone()).await?;
        let press = PressRoom::load(store.clone()).await?;
        let organization = Organization::load(store).await?;

        Ok(Self {
            directory,
            desk,
            press,
            organization,
        })
    }

    /// Start composing an issue over the current approved pool
    pub fn compose_issue(&self) -> IssueDraft {
        self.press.compose(self.desk.approved())
    }
}
