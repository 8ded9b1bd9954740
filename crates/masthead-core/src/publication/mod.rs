//! Newspaper composition and publication
//!
//! Owns the newspaper collection. Composition happens entirely in memory
//! on an [`IssueDraft`]; only finalization mutates the collection and
//! writes it through to the durable store.

pub mod issue;

pub use issue::{IssueDraft, IssueStatus, Layout, Newspaper};

use tracing::info;

use crate::editorial::Article;
use crate::identity::Account;
use crate::policy::{self, Capability};
use crate::store::{Aggregate, Store};
use crate::{Error, Result};

/// The newspaper collection and its publication operations
#[derive(Debug)]
pub struct PressRoom {
    store: Store,
    newspapers: Vec<Newspaper>,
}

impl PressRoom {
    /// Load the newspaper collection; absent storage defaults to empty
    pub async fn load(store: Store) -> Result<Self> {
        let newspapers = store.read(Aggregate::Newspapers).await?.unwrap_or_default();
        Ok(Self { store, newspapers })
    }

    /// All issues, oldest first
    pub fn issues(&self) -> &[Newspaper] {
        &self.newspapers
    }

    /// Find an issue by id
    pub fn get(&self, id: &str) -> Option<&Newspaper> {
        self.newspapers.iter().find(|n| n.id == id)
    }

    /// Start composing an issue over a snapshot of the approved pool
    ///
    /// The snapshot is taken at call time; the draft does not observe
    /// later article changes.
    pub fn compose(&self, approved_pool: Vec<Article>) -> IssueDraft {
        IssueDraft::new(approved_pool)
    }

    /// Finalize a composed issue
    ///
    /// Requires the publish capability, a non-empty title, and at least
    /// one selected article. A refused draft appends nothing.
    pub async fn publish(&mut self, actor: &Account, draft: IssueDraft) -> Result<Newspaper> {
        if !policy::has_capability(actor, Capability::PublishNewspaper) {
            return Err(Error::PermissionDenied(format!(
                "{} may not publish newspapers",
                actor.role
            )));
        }
        if draft.title.trim().is_empty() {
            return Err(Error::Validation("newspaper title is required".to_string()));
        }
        if draft.selection().is_empty() {
            return Err(Error::Validation(
                "select at least one article before publishing".to_string(),
            ));
        }

        let issue = draft.into_newspaper();
        let published = issue.clone();

        info!(id = %published.id, title = %published.title, "newspaper published");
        self.newspapers.push(issue);
        self.store.save(Aggregate::Newspapers, &self.newspapers).await;
        Ok(published)
    }
}
