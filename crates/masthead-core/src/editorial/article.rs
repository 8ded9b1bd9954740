//! Article entity and lifecycle states

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::identity::Account;

/// Lifecycle state of an article
///
/// Reviews move a pending article one way to approved or rejected; there
/// is no re-review of a decided article. A rejected article re-enters the
/// flow through the normal edit and submit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl ArticleStatus {
    /// Convert to string for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Pending => "pending",
            ArticleStatus::Approved => "approved",
            ArticleStatus::Rejected => "rejected",
        }
    }

    /// Parse from storage string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ArticleStatus::Draft),
            "pending" => Some(ArticleStatus::Pending),
            "approved" => Some(ArticleStatus::Approved),
            "rejected" => Some(ArticleStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Caller-supplied article content, used on create and on edit
#[derive(Debug, Clone, Default)]
pub struct ArticleFields {
    /// Article headline
    pub title: String,
    /// Opaque markup blob produced by the editing surface
    pub body: String,
    /// Category label; must be in the org taxonomy at save time
    pub category: String,
    /// Optional cover image reference
    pub cover_image: Option<String>,
}

/// A newsroom article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique article identifier
    pub id: String,
    /// Article headline
    pub title: String,
    /// Opaque markup blob; never interpreted by the core
    pub body: String,
    /// Author display name, denormalized at creation time
    pub author: String,
    /// Ownership key; articles are never transferred to another author
    pub author_id: String,
    /// Category label
    pub category: String,
    /// Optional cover image reference
    pub cover_image: Option<String>,
    /// Lifecycle state
    pub status: ArticleStatus,
    /// When the article was created
    pub created_at: DateTime<Utc>,
    /// When the article content was last edited
    pub updated_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Create a new draft authored by the given account
    pub fn new(author: &Account, fields: ArticleFields) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: fields.title,
            body: fields.body,
            author: author.name.clone(),
            author_id: author.id.clone(),
            category: fields.category,
            cover_image: fields.cover_image,
            status: ArticleStatus::Draft,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}
