//! Identity and session management
//!
//! Owns the account collection and the currently active session. The
//! session is process-scoped and ephemeral: only the account collection is
//! persisted, so a restart always begins logged out.

pub mod account;

pub use account::{Account, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_ID};

use tracing::info;

use crate::policy::{self, Role};
use crate::store::{Aggregate, Store};
use crate::{Error, Result};

/// The account roster plus the active session
#[derive(Debug)]
pub struct Directory {
    store: Store,
    accounts: Vec<Account>,
    /// Id of the logged-in account; resolved against the roster on read so
    /// a role change is visible to the session immediately
    active: Option<String>,
}

impl Directory {
    /// Load the account collection, seeding the default administrator when
    /// the durable store is empty
    pub async fn load(store: Store) -> Result<Self> {
        let accounts: Vec<Account> = store.read(Aggregate::Accounts).await?.unwrap_or_default();

        let accounts = if accounts.is_empty() {
            let seeded = vec![Account::default_admin()];
            info!(email = DEFAULT_ADMIN_EMAIL, "seeding default administrator");
            store.save(Aggregate::Accounts, &seeded).await;
            seeded
        } else {
            accounts
        };

        Ok(Self {
            store,
            accounts,
            active: None,
        })
    }

    /// All accounts
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Find an account by id
    pub fn get(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    /// The account behind the active session, if any
    pub fn current(&self) -> Option<&Account> {
        self.active.as_deref().and_then(|id| self.get(id))
    }

    /// Establish a session by email (case-sensitive exact match)
    pub fn login(&mut self, email: &str) -> Result<Account> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.email == email)
            .cloned()
            .ok_or_else(|| Error::AccountNotFound(email.to_string()))?;
        info!(email, "session established");
        self.active = Some(account.id.clone());
        Ok(account)
    }

    /// Establish a session as the first account holding the given role
    ///
    /// A demo affordance carried over from the login page; fails with a
    /// not-found outcome when no account holds the role.
    pub fn quick_login(&mut self, role: Role) -> Result<Account> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.role == role)
            .cloned()
            .ok_or(Error::NoAccountWithRole(role))?;
        info!(%role, email = %account.email, "quick session established");
        self.active = Some(account.id.clone());
        Ok(account)
    }

    /// Clear the active session; a no-op when already logged out
    pub fn logout(&mut self) {
        self.active = None;
    }

    /// Register a new reporter account
    ///
    /// The role is fixed to reporter regardless of caller input. Email
    /// uniqueness is deliberately not enforced. The new account is not
    /// logged in.
    pub async fn signup(
        &mut self,
        name: &str,
        email: &str,
        member_id: Option<String>,
    ) -> Result<Account> {
        if name.trim().is_empty() {
            return Err(Error::Validation("name is required".to_string()));
        }
        if email.trim().is_empty() {
            return Err(Error::Validation("email is required".to_string()));
        }
        if !is_valid_email(email) {
            return Err(Error::Validation(format!("'{email}' is not a valid email")));
        }

        let mut account = Account::new(name, email);
        if let Some(member_id) = member_id {
            account = account.with_member_id(member_id);
        }

        info!(email, "account registered");
        self.accounts.push(account.clone());
        self.store.save(Aggregate::Accounts, &self.accounts).await;
        Ok(account)
    }

    /// Change a target account's role, as decided by the assignment rule
    ///
    /// The actor is the session account. Refusals leave the roster
    /// untouched.
    pub async fn assign_role(&mut self, target_id: &str, new_role: Role) -> Result<()> {
        let actor = self.current().cloned().ok_or(Error::NoActiveSession)?;

        let target = self
            .accounts
            .iter_mut()
            .find(|a| a.id == target_id)
            .ok_or_else(|| Error::AccountNotFound(target_id.to_string()))?;

        if !policy::can_assign_role(&actor, target, new_role) {
            return Err(Error::PermissionDenied(format!(
                "{} may not assign {} to {}",
                actor.role, new_role, target.name
            )));
        }

        info!(account = %target.email, %new_role, "role assigned");
        target.role = new_role;
        self.store.save(Aggregate::Accounts, &self.accounts).await;
        Ok(())
    }
}

/// Minimal email shape check: one `@`, a host with a dot, no whitespace
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() => match domain.rsplit_once('.') {
            Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
            None => false,
        },
        _ => false,
    }
}
