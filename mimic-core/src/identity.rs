//! Identity resolution
//!
//! Maps usernames to roles and checks credentials. The portal has no real
//! authentication; the default directory is a static table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PortalError, PortalResult};
use crate::types::{Role, Viewer};

/// Username -> role lookup and credential check
pub trait IdentityResolver: Send + Sync {
    /// Role for a known username
    fn resolve_role(&self, username: &str) -> Option<Role>;

    /// Role for a matching username/password pair
    fn authenticate(&self, username: &str, password: &str) -> Option<Role>;

    /// Resolve a caller or fail with `Forbidden`
    fn viewer(&self, username: &str) -> PortalResult<Viewer> {
        self.resolve_role(username)
            .map(|role| Viewer::new(username, role))
            .ok_or_else(|| PortalError::forbidden(format!("unknown user: {}", username)))
    }
}

/// A directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub password: String,
    pub role: Role,
}

/// Static credential table
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    accounts: HashMap<String, Account>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// alice (user), bob (manager), admin (admin)
    pub fn standard() -> Self {
        let mut directory = Self::new();
        directory
            .add("alice", "pass", Role::User)
            .add("bob", "pass", Role::Manager)
            .add("admin", "admin", Role::Admin);
        directory
    }

    pub fn add(&mut self, username: &str, password: &str, role: Role) -> &mut Self {
        self.accounts.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                role,
            },
        );
        self
    }
}

impl IdentityResolver for StaticDirectory {
    fn resolve_role(&self, username: &str) -> Option<Role> {
        self.accounts.get(username).map(|a| a.role)
    }

    fn authenticate(&self, username: &str, password: &str) -> Option<Role> {
        self.accounts
            .get(username)
            .filter(|a| a.password == password)
            .map(|a| a.role)
    }
}
