//! Organization configuration
//!
//! A singleton of display metadata and the category taxonomy. Defaults are
//! substituted in memory when nothing is stored yet; the first explicit
//! save is what persists them.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::identity::Account;
use crate::policy::{self, Capability};
use crate::store::{Aggregate, Store};
use crate::{Error, Result};

/// Organization display metadata and category taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgSettings {
    /// Organization display name
    pub name: String,
    /// Subtitle or slogan shown under the name
    pub subtitle: String,
    /// Ordered category labels; order is display-significant
    pub categories: Vec<String>,
}

impl Default for OrgSettings {
    fn default() -> Self {
        Self {
            name: "Our Newspaper".to_string(),
            subtitle: "Stories written together".to_string(),
            categories: vec![
                "General News".to_string(),
                "Events".to_string(),
                "Interviews".to_string(),
                "Culture & Life".to_string(),
                "Opinion".to_string(),
                "Misc".to_string(),
            ],
        }
    }
}

impl OrgSettings {
    /// Append a category label, enforcing uniqueness on insert
    ///
    /// Returns whether the label was added.
    pub fn add_category(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if label.is_empty() || self.categories.contains(&label) {
            return false;
        }
        self.categories.push(label);
        true
    }

    /// Remove a category label
    ///
    /// Returns whether the label was present. Existing articles keep their
    /// category; the taxonomy is only consulted at save time.
    pub fn remove_category(&mut self, label: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c != label);
        self.categories.len() != before
    }
}

/// The settings singleton and its configuration operation
#[derive(Debug)]
pub struct Organization {
    store: Store,
    settings: OrgSettings,
}

impl Organization {
    /// Load the stored settings, falling back to defaults in memory
    pub async fn load(store: Store) -> Result<Self> {
        let settings = store
            .read(Aggregate::OrgSettings)
            .await?
            .unwrap_or_default();
        Ok(Self { store, settings })
    }

    /// Current settings
    pub fn settings(&self) -> &OrgSettings {
        &self.settings
    }

    /// Replace the settings wholesale
    ///
    /// Admin only. Duplicate category labels are collapsed to their first
    /// occurrence so the stored taxonomy stays unique.
    pub async fn update(&mut self, actor: &Account, mut settings: OrgSettings) -> Result<()> {
        if !policy::has_capability(actor, Capability::ManageOrgSettings) {
            return Err(Error::PermissionDenied(format!(
                "{} may not change organization settings",
                actor.role
            )));
        }

        let mut unique = Vec::with_capacity(settings.categories.len());
        for category in settings.categories.drain(..) {
            if !unique.contains(&category) {
                unique.push(category);
            }
        }
        settings.categories = unique;

        info!(name = %settings.name, "organization settings updated");
        self.settings = settings;
        self.store.save(Aggregate::OrgSettings, &self.settings).await;
        Ok(())
    }
}
