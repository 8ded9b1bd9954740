//! Newspaper issue entities

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::editorial::Article;
use crate::{Error, Result};

/// Page layout of a newspaper issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Classic,
    Magazine,
    Grid,
}

impl Layout {
    /// Convert to string for storage and CLI input
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Classic => "classic",
            Layout::Magazine => "magazine",
            Layout::Grid => "grid",
        }
    }

    /// Parse from storage or CLI string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "classic" => Some(Layout::Classic),
            "magazine" => Some(Layout::Magazine),
            "grid" => Some(Layout::Grid),
            _ => None,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether an issue is still being composed or has been finalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    #[default]
    Draft,
    Published,
}

impl IssueStatus {
    /// Convert to string for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Draft => "draft",
            IssueStatus::Published => "published",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A published newspaper issue
///
/// Immutable once published: nothing adds or removes articles, changes the
/// layout, or alters the status afterward. The article list references
/// articles that were approved at the moment of inclusion; later changes to
/// those articles never rewrite an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Newspaper {
    /// Unique issue identifier
    pub id: String,
    /// Issue title
    pub title: String,
    /// Calendar date printed on the issue, independent of when it was finalized
    pub publish_date: NaiveDate,
    /// Included articles, in selection order
    pub article_ids: Vec<String>,
    /// Page layout
    pub layout: Layout,
    /// Draft while composing, published once finalized
    pub status: IssueStatus,
    /// When the issue was finalized
    pub published_at: Option<DateTime<Utc>>,
}

impl Newspaper {
    /// Resolve the issue's article references against the current collection
    ///
    /// Articles deleted since publication are silently skipped; a dangling
    /// reference is expected, not an error. Stored order is preserved.
    pub fn resolve<'a>(&self, articles: &'a [Article]) -> Vec<&'a Article> {
        self.article_ids
            .iter()
            .filter_map(|id| articles.iter().find(|a| &a.id == id))
            .collect()
    }
}

/// An in-memory issue being composed; nothing is persisted until it is
/// finalized
///
/// The draft carries its own snapshot of the approved pool, taken at
/// compose time. Later article changes are not reflected until the caller
/// composes a fresh draft.
#[derive(Debug, Clone)]
pub struct IssueDraft {
    /// Issue title
    pub title: String,
    /// Calendar date printed on the issue
    pub publish_date: NaiveDate,
    /// Page layout
    pub layout: Layout,
    selection: Vec<String>,
    pool: Vec<Article>,
}

impl IssueDraft {
    /// Start composing an issue over a snapshot of the approved pool
    pub fn new(pool: Vec<Article>) -> Self {
        Self {
            title: String::new(),
            publish_date: Utc::now().date_naive(),
            layout: Layout::default(),
            selection: Vec::new(),
            pool,
        }
    }

    /// Set the issue title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the printed publish date
    pub fn with_publish_date(mut self, date: NaiveDate) -> Self {
        self.publish_date = date;
        self
    }

    /// Set the page layout
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// The approved pool snapshot this draft selects from
    pub fn pool(&self) -> &[Article] {
        &self.pool
    }

    /// Selected article ids, in insertion order
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Toggle an article in or out of the selection
    ///
    /// Returns whether the article is selected afterward. Only articles
    /// from the draft's approved pool can be selected.
    pub fn toggle_article(&mut self, id: &str) -> Result<bool> {
        if !self.pool.iter().any(|a| a.id == id) {
            return Err(Error::ArticleNotFound(id.to_string()));
        }

        if let Some(index) = self.selection.iter().position(|s| s == id) {
            self.selection.remove(index);
            Ok(false)
        } else {
            self.selection.push(id.to_string());
            Ok(true)
        }
    }

    /// The selected articles, resolved from the cached pool in selection order
    pub fn selected_articles(&self) -> Vec<&Article> {
        self.selection
            .iter()
            .filter_map(|id| self.pool.iter().find(|a| &a.id == id))
            .collect()
    }

    /// Finalize into a published issue record
    pub(crate) fn into_newspaper(self) -> Newspaper {
        Newspaper {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            publish_date: self.publish_date,
            article_ids: self.selection,
            layout: self.layout,
            status: IssueStatus::Published,
            published_at: Some(Utc::now()),
        }
    }
}
