//! Account entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::policy::Role;

/// Fixed identity of the bootstrap administrator
///
/// Seeded whenever the durable account collection is empty, so the system
/// is never left without an administrator.
pub const DEFAULT_ADMIN_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Email the bootstrap administrator logs in with
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@newspaper.com";

/// A newsroom member account
///
/// The role is the only attribute that changes after creation, and only
/// through the role-assignment rule. Accounts are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Login key; matched exactly and case-sensitively
    pub email: String,
    /// Newsroom role
    pub role: Role,
    /// Optional external member reference
    pub member_id: Option<String>,
    /// When the account was created
    pub joined_at: DateTime<Utc>,
}

impl Account {
    /// Create a new reporter account
    ///
    /// Self-registration can never grant elevated roles, so every new
    /// account starts as a reporter.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            role: Role::Reporter,
            member_id: None,
            joined_at: Utc::now(),
        }
    }

    /// Set the external member reference
    pub fn with_member_id(mut self, member_id: impl Into<String>) -> Self {
        self.member_id = Some(member_id.into());
        self
    }

    /// Set the role directly (bootstrap and test setup only; normal role
    /// changes go through the assignment rule)
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// The well-known administrator seeded into an empty account store
    pub fn default_admin() -> Self {
        Self {
            id: DEFAULT_ADMIN_ID.to_string(),
            name: "Administrator".to_string(),
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            role: Role::Admin,
            member_id: None,
            joined_at: Utc::now(),
        }
    }
}
