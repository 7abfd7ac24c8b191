//! Application catalog
//!
//! Static registry of installable applications. Built once at startup and
//! never mutated afterwards.

use crate::error::{PortalError, PortalResult};
use crate::types::Application;

/// Minimum similarity for a fuzzy name match
const FUZZY_THRESHOLD: f64 = 0.5;

/// Application catalog ordered by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    applications: Vec<Application>,
}

impl Catalog {
    /// Build a catalog, rejecting blank names, empty or duplicated version
    /// lists and duplicated applications
    pub fn new(mut applications: Vec<Application>) -> PortalResult<Self> {
        for app in &applications {
            if app.name.trim().is_empty() {
                return Err(PortalError::invalid_input("application name is empty"));
            }
            if app.versions.is_empty() {
                return Err(PortalError::invalid_input(format!(
                    "application {} has no versions",
                    app.name
                )));
            }
            for (i, version) in app.versions.iter().enumerate() {
                if version.trim().is_empty() || app.versions[..i].contains(version) {
                    return Err(PortalError::invalid_input(format!(
                        "application {} has an empty or duplicate version",
                        app.name
                    )));
                }
            }
        }

        applications.sort_by(|a, b| a.name.cmp(&b.name));
        if applications.windows(2).any(|w| w[0].name == w[1].name) {
            return Err(PortalError::invalid_input("duplicate application name"));
        }

        Ok(Self { applications })
    }

    /// The catalog a fresh portal ships with
    pub fn standard() -> Self {
        let mut applications = vec![
            Application::new("MS Excel", ["2016", "2019", "2021"])
                .with_description("Spreadsheet editor"),
            Application::new("MS Word", ["2016", "2019", "2021"])
                .with_description("Word processor"),
            Application::new("Slack", ["4.20", "4.21", "latest"])
                .with_description("Team messaging"),
            Application::new("Zoom", ["5.0", "5.1", "latest"])
                .with_description("Video conferencing"),
        ];
        applications.sort_by(|a, b| a.name.cmp(&b.name));
        Self { applications }
    }

    /// All applications, ordered by name
    pub fn list_applications(&self) -> &[Application] {
        &self.applications
    }

    /// Exact lookup
    pub fn get(&self, name: &str) -> Option<&Application> {
        self.applications.iter().find(|a| a.name == name)
    }

    /// Versions of an application in listing order
    pub fn versions_of(&self, name: &str) -> PortalResult<&[String]> {
        self.get(name)
            .map(|a| a.versions.as_slice())
            .ok_or_else(|| PortalError::not_found("Application", name))
    }

    /// Last listed version
    pub fn latest_version(&self, name: &str) -> PortalResult<&str> {
        self.get(name)
            .and_then(Application::latest_version)
            .ok_or_else(|| PortalError::not_found("Application", name))
    }

    /// Check an (app, version) pair exists. Unknown names are input errors here,
    /// since the caller supplied them.
    pub fn validate_selection(&self, app: &str, version: &str) -> PortalResult<&Application> {
        let application = self
            .get(app)
            .ok_or_else(|| PortalError::invalid_input(format!("unknown application: {}", app)))?;
        if !application.has_version(version) {
            return Err(PortalError::invalid_input(format!(
                "version {} is not offered for {}",
                version, app
            )));
        }
        Ok(application)
    }

    /// Resolve loosely typed input to a catalog name.
    ///
    /// Tries an exact match, then case-insensitive equality, then substring
    /// containment either way, then the closest name by edit distance.
    pub fn resolve_name(&self, input: &str) -> Option<&Application> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(app) = self.get(input.trim()) {
            return Some(app);
        }
        if let Some(app) = self
            .applications
            .iter()
            .find(|a| a.name.to_lowercase() == needle)
        {
            return Some(app);
        }
        if let Some(app) = self.applications.iter().find(|a| {
            let name = a.name.to_lowercase();
            name.contains(&needle) || needle.contains(&name)
        }) {
            return Some(app);
        }

        self.applications
            .iter()
            .map(|a| (a, similarity(&a.name.to_lowercase(), &needle)))
            .filter(|(_, score)| *score >= FUZZY_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(a, _)| a)
    }
}

/// Normalized Levenshtein similarity in [0, 1]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    1.0 - prev[b.len()] as f64 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_ordered_by_name() {
        let catalog = Catalog::standard();
        let names: Vec<&str> = catalog
            .list_applications()
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["MS Excel", "MS Word", "Slack", "Zoom"]);
    }

    #[test]
    fn test_versions_and_latest() {
        let catalog = Catalog::standard();
        assert_eq!(
            catalog.versions_of("Zoom").unwrap(),
            &["5.0".to_string(), "5.1".to_string(), "latest".to_string()]
        );
        assert_eq!(catalog.latest_version("MS Word").unwrap(), "2021");
        assert!(matches!(
            catalog.versions_of("Photoshop"),
            Err(PortalError::NotFound { .. })
        ));
    }

    #[test]
    fn test_validate_selection() {
        let catalog = Catalog::standard();
        assert!(catalog.validate_selection("Zoom", "5.1").is_ok());
        assert!(matches!(
            catalog.validate_selection("Zoom", "9.9"),
            Err(PortalError::InvalidInput(_))
        ));
        assert!(matches!(
            catalog.validate_selection("Teams", "1.0"),
            Err(PortalError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_bad_catalogs() {
        assert!(Catalog::new(vec![Application::new("Zoom", Vec::<String>::new())]).is_err());
        assert!(Catalog::new(vec![Application::new("Zoom", ["1", "1"])]).is_err());
        assert!(Catalog::new(vec![
            Application::new("Zoom", ["1"]),
            Application::new("Zoom", ["2"]),
        ])
        .is_err());
        assert!(Catalog::new(vec![Application::new("Zoom", ["1"])]).is_ok());
    }

    #[test]
    fn test_resolve_name() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.resolve_name("zoom").unwrap().name, "Zoom");
        assert_eq!(catalog.resolve_name("word").unwrap().name, "MS Word");
        assert_eq!(catalog.resolve_name("Slak").unwrap().name, "Slack");
        assert!(catalog.resolve_name("photoshop").is_none());
        assert!(catalog.resolve_name("  ").is_none());
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("zoom", "zoom"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert!(similarity("slack", "slak") > 0.7);
        assert!(similarity("abc", "xyz") < 0.1);
    }
}
