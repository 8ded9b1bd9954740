//! Error types for Masthead

use thiserror::Error;

use crate::policy::Role;

/// Result type alias using Masthead's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Masthead error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Validation errors (E100-E199)
    #[error("Validation failed: {0}")]
    Validation(String),

    // Permission errors (E200-E299)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No active session. Log in first with `login <email>`.")]
    NoActiveSession,

    // Lookup errors (E300-E399)
    #[error("Account '{0}' not found. Run `users` to see all accounts.")]
    AccountNotFound(String),

    #[error("No {0} account exists to log in as.")]
    NoAccountWithRole(Role),

    #[error("Article '{0}' not found. Run `articles` to see all articles.")]
    ArticleNotFound(String),

    #[error("Newspaper issue '{0}' not found. Run `issues` to see all issues.")]
    IssueNotFound(String),

    // Storage errors (E400-E499)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E100",
            Self::PermissionDenied(_) => "E200",
            Self::NoActiveSession => "E201",
            Self::AccountNotFound(_) => "E300",
            Self::NoAccountWithRole(_) => "E301",
            Self::ArticleNotFound(_) => "E302",
            Self::IssueNotFound(_) => "E303",
            Self::Database(_) => "E400",
            Self::Serialization(_) => "E401",
            Self::Config(_) => "E600",
            Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NoActiveSession => Some("login <email>".to_string()),
            Self::AccountNotFound(_) => Some("users".to_string()),
            Self::ArticleNotFound(_) => Some("articles".to_string()),
            Self::IssueNotFound(_) => Some("issues".to_string()),
            Self::Config(_) => Some("masthead config list".to_string()),
            _ => None,
        }
    }

    /// True for refusals caused by missing required input
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True for refusals caused by a failed capability or ownership check
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_) | Self::NoActiveSession)
    }

    /// True when the addressed account, article, or issue does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_)
                | Self::NoAccountWithRole(_)
                | Self::ArticleNotFound(_)
                | Self::IssueNotFound(_)
        )
    }
}
