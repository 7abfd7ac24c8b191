//! Eligibility policy and role-gated access rules
//!
//! Every role-dependent branch in the portal goes through this module:
//! which application versions a role may be approved for, and which
//! records and files a role may see or change.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{PortalError, PortalResult};
use crate::types::Role;

/// Role-gated capabilities outside the eligibility matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Approve or reject pending requests
    DecideRequests,
    /// Deploy approved requests and advance tickets
    ManageTickets,
    /// See every user's requests, tickets and logs
    ViewAllRecords,
    /// Read and download non-public files
    ReadPrivateFiles,
}

/// Capabilities granted to a role
pub fn capabilities(role: Role) -> HashSet<Capability> {
    let mut caps = HashSet::new();

    match role {
        Role::User => {}
        Role::Manager | Role::Admin => {
            caps.insert(Capability::DecideRequests);
            caps.insert(Capability::ManageTickets);
            caps.insert(Capability::ViewAllRecords);
            caps.insert(Capability::ReadPrivateFiles);
        }
    }

    caps
}

/// Check a single capability
pub fn has_capability(role: Role, capability: Capability) -> bool {
    capabilities(role).contains(&capability)
}

/// Public files are open to all; private ones need [`Capability::ReadPrivateFiles`]
pub fn can_access(role: Role, is_public: bool) -> bool {
    is_public || has_capability(role, Capability::ReadPrivateFiles)
}

/// Managers and admins see everyone's records, users only their own
pub fn sees_all_records(role: Role) -> bool {
    has_capability(role, Capability::ViewAllRecords)
}

/// Require a capability or fail with `Forbidden`
pub fn require(role: Role, capability: Capability) -> PortalResult<()> {
    if has_capability(role, capability) {
        Ok(())
    } else {
        Err(PortalError::forbidden(format!(
            "role {} lacks {:?}",
            role, capability
        )))
    }
}

/// Role -> application -> allowed versions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EligibilityMatrix {
    rules: BTreeMap<Role, BTreeMap<String, BTreeSet<String>>>,
}

impl EligibilityMatrix {
    /// Empty matrix: nothing is eligible
    pub fn new() -> Self {
        Self::default()
    }

    /// Default matrix over a catalog: users get Zoom 5.0 and latest,
    /// managers get every Zoom and MS Excel version, admins get everything.
    /// Applications missing from the catalog are skipped.
    pub fn standard(catalog: &Catalog) -> Self {
        let mut matrix = Self::new();

        if catalog.get("Zoom").is_some() {
            matrix.allow(Role::User, "Zoom", ["5.0", "latest"]);
        }
        for name in ["Zoom", "MS Excel"] {
            if let Some(app) = catalog.get(name) {
                matrix.allow(Role::Manager, name, app.versions.iter().cloned());
            }
        }
        for app in catalog.list_applications() {
            matrix.allow(Role::Admin, &app.name, app.versions.iter().cloned());
        }

        matrix
    }

    /// Grant versions of an application to a role
    pub fn allow<I, S>(&mut self, role: Role, app: &str, versions: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules
            .entry(role)
            .or_default()
            .entry(app.to_string())
            .or_default()
            .extend(versions.into_iter().map(Into::into));
        self
    }

    /// Table lookup. Unknown role or application is never eligible.
    pub fn is_eligible(&self, role: Role, app: &str, version: &str) -> bool {
        self.rules
            .get(&role)
            .and_then(|apps| apps.get(app))
            .map(|versions| versions.contains(version))
            .unwrap_or(false)
    }

    /// Versions a role may be approved for
    pub fn allowed_versions(&self, role: Role, app: &str) -> Vec<&str> {
        self.rules
            .get(&role)
            .and_then(|apps| apps.get(app))
            .map(|versions| versions.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Applications with at least one eligible version for a role
    pub fn applications_for(&self, role: Role) -> Vec<&str> {
        self.rules
            .get(&role)
            .map(|apps| {
                apps.iter()
                    .filter(|(_, versions)| !versions.is_empty())
                    .map(|(app, _)| app.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every granted version must exist in the catalog
    pub fn validate(&self, catalog: &Catalog) -> PortalResult<()> {
        for (role, apps) in &self.rules {
            for (app, versions) in apps {
                let application = catalog.get(app).ok_or_else(|| {
                    PortalError::invalid_input(format!(
                        "eligibility for {} references unknown application {}",
                        role, app
                    ))
                })?;
                if let Some(missing) = versions.iter().find(|v| !application.has_version(v)) {
                    return Err(PortalError::invalid_input(format!(
                        "eligibility for {} references {} {} which is not in the catalog",
                        role, app, missing
                    )));
                }
            }
        }
        Ok(())
    }

    /// Grants held by a lower role but not by a higher one.
    ///
    /// Admin is expected to cover manager, and manager to cover user.
    pub fn hierarchy_gaps(&self) -> Vec<String> {
        let mut gaps = Vec::new();
        for pair in Role::ALL.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            let Some(apps) = self.rules.get(&lower) else {
                continue;
            };
            for (app, versions) in apps {
                for version in versions {
                    if !self.is_eligible(higher, app, version) {
                        gaps.push(format!(
                            "{} may use {} {} but {} may not",
                            lower, app, version, higher
                        ));
                    }
                }
            }
        }
        gaps
    }
}
