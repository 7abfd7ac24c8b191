//! Installable application descriptor

use serde::{Deserialize, Serialize};

/// Application offered through the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    /// Versions in listing order; the last one is the latest
    pub versions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Application {
    pub fn new<I, S>(name: impl Into<String>, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            versions: versions.into_iter().map(Into::into).collect(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check whether a version is listed
    pub fn has_version(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }

    /// Last listed version
    pub fn latest_version(&self) -> Option<&str> {
        self.versions.last().map(String::as_str)
    }
}
