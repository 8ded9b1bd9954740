//! Role capabilities and assignment rules
//!
//! Pure predicates over plain data: every check is a function of the acting
//! account and (where relevant) the subject, with no internal state.
//!
//! Capabilities are allow-list based rather than rank based. Chief editors
//! and editors share the review and publish capabilities, and only account
//! administration separates them, so a numeric role order would not model
//! the rules correctly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::editorial::{Article, ArticleStatus};
use crate::identity::Account;

/// Newsroom role held by an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    ChiefEditor,
    Editor,
    Reporter,
}

impl Role {
    /// All roles, in seniority order for display purposes
    pub const ALL: [Role; 4] = [Role::Admin, Role::ChiefEditor, Role::Editor, Role::Reporter];

    /// Convert to string for storage and CLI input
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ChiefEditor => "chief_editor",
            Role::Editor => "editor",
            Role::Reporter => "reporter",
        }
    }

    /// Parse from storage or CLI string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "chief_editor" => Some(Role::ChiefEditor),
            "editor" => Some(Role::Editor),
            "reporter" => Some(Role::Reporter),
            _ => None,
        }
    }

    /// Human-readable role name
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::ChiefEditor => "Chief Editor",
            Role::Editor => "Editor",
            Role::Reporter => "Reporter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Named permission checked against a fixed role allow-list
///
/// | Capability | Allowed roles |
/// |------------|---------------|
/// | [`ReviewArticles`](Self::ReviewArticles) | admin, chief_editor, editor |
/// | [`PublishNewspaper`](Self::PublishNewspaper) | admin, chief_editor, editor |
/// | [`ManageUsers`](Self::ManageUsers) | admin, chief_editor |
/// | [`ManageOrgSettings`](Self::ManageOrgSettings) | admin |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Approve or reject pending articles
    ReviewArticles,
    /// Compose and finalize newspaper issues
    PublishNewspaper,
    /// View the member roster and change roles
    ManageUsers,
    /// Edit organization name, subtitle, and categories
    ManageOrgSettings,
}

impl Capability {
    /// The fixed allow-list for this capability
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Capability::ReviewArticles | Capability::PublishNewspaper => {
                &[Role::Admin, Role::ChiefEditor, Role::Editor]
            }
            Capability::ManageUsers => &[Role::Admin, Role::ChiefEditor],
            Capability::ManageOrgSettings => &[Role::Admin],
        }
    }
}

/// Check whether the actor's role is in the capability's allow-list
pub fn has_capability(actor: &Account, capability: Capability) -> bool {
    capability.allowed_roles().contains(&actor.role)
}

/// An article may be edited only by its author, and only until it is approved
///
/// Pending and rejected articles stay editable by their author; approved
/// articles are permanently frozen against edits, for everyone.
pub fn can_edit_article(actor: &Account, article: &Article) -> bool {
    actor.id == article.author_id && article.status != ArticleStatus::Approved
}

/// Authors may delete their own articles; admins and chief editors may delete any
pub fn can_delete_article(actor: &Account, article: &Article) -> bool {
    actor.id == article.author_id
        || matches!(actor.role, Role::Admin | Role::ChiefEditor)
}

/// Role-assignment rule
///
/// Admins may assign any role to any account. Chief editors may promote a
/// reporter to editor or demote an editor back to reporter, and nothing
/// else: they cannot touch chief_editor or admin accounts, nor grant those
/// roles. Editors and reporters may never assign roles.
pub fn can_assign_role(actor: &Account, target: &Account, new_role: Role) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::ChiefEditor => match (target.role, new_role) {
            (Role::Reporter, Role::Editor | Role::Reporter) => true,
            (Role::Editor, Role::Reporter) => true,
            _ => false,
        },
        Role::Editor | Role::Reporter => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editorial::ArticleFields;

    fn account(role: Role) -> Account {
        Account::new(role.display_name(), format!("{}@example.com", role)).with_role(role)
    }

    fn article_by(author: &Account, status: ArticleStatus) -> Article {
        let mut article = Article::new(
            author,
            ArticleFields {
                title: "Title".to_string(),
                body: "<p>body</p>".to_string(),
                category: "General News".to_string(),
                cover_image: None,
            },
        );
        article.status = status;
        article
    }

    #[test]
    fn test_role_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_capability_allow_lists() {
        let admin = account(Role::Admin);
        let chief = account(Role::ChiefEditor);
        let editor = account(Role::Editor);
        let reporter = account(Role::Reporter);

        for cap in [Capability::ReviewArticles, Capability::PublishNewspaper] {
            assert!(has_capability(&admin, cap));
            assert!(has_capability(&chief, cap));
            assert!(has_capability(&editor, cap));
            assert!(!has_capability(&reporter, cap));
        }

        assert!(has_capability(&admin, Capability::ManageUsers));
        assert!(has_capability(&chief, Capability::ManageUsers));
        assert!(!has_capability(&editor, Capability::ManageUsers));
        assert!(!has_capability(&reporter, Capability::ManageUsers));

        assert!(has_capability(&admin, Capability::ManageOrgSettings));
        assert!(!has_capability(&chief, Capability::ManageOrgSettings));
        assert!(!has_capability(&editor, Capability::ManageOrgSettings));
        assert!(!has_capability(&reporter, Capability::ManageOrgSettings));
    }

    #[test]
    fn test_edit_guard_freezes_approved_articles() {
        let author = account(Role::Reporter);
        let other = account(Role::Admin);

        for status in [
            ArticleStatus::Draft,
            ArticleStatus::Pending,
            ArticleStatus::Rejected,
        ] {
            let article = article_by(&author, status);
            assert!(can_edit_article(&author, &article));
            assert!(!can_edit_article(&other, &article));
        }

        // Approved is frozen for everyone, the author included
        let approved = article_by(&author, ArticleStatus::Approved);
        assert!(!can_edit_article(&author, &approved));
        assert!(!can_edit_article(&other, &approved));
    }

    #[test]
    fn test_delete_guard() {
        let author = account(Role::Reporter);
        let article = article_by(&author, ArticleStatus::Draft);

        assert!(can_delete_article(&author, &article));
        assert!(can_delete_article(&account(Role::Admin), &article));
        assert!(can_delete_article(&account(Role::ChiefEditor), &article));
        // Editors may delete only their own articles
        assert!(!can_delete_article(&account(Role::Editor), &article));
        assert!(!can_delete_article(&account(Role::Reporter), &article));
    }

    #[test]
    fn test_assign_role_exhaustive_table() {
        // The only permitted (actor, target, new_role) triples besides the
        // admin blanket rule.
        let chief_allowed = [
            (Role::Reporter, Role::Editor),
            (Role::Reporter, Role::Reporter),
            (Role::Editor, Role::Reporter),
        ];

        for actor_role in Role::ALL {
            for target_role in Role::ALL {
                for new_role in Role::ALL {
                    let actor = account(actor_role);
                    let target = account(target_role);
                    let expected = match actor_role {
                        Role::Admin => true,
                        Role::ChiefEditor => chief_allowed.contains(&(target_role, new_role)),
                        Role::Editor | Role::Reporter => false,
                    };
                    assert_eq!(
                        can_assign_role(&actor, &target, new_role),
                        expected,
                        "actor={actor_role} target={target_role} new={new_role}"
                    );
                }
            }
        }
    }
}
