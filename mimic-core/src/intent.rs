//! Free-text intent detection
//!
//! A classifier turns chat input into an [`IntentHint`]. Hints are untrusted:
//! callers validate the extracted application and version against the
//! catalog exactly as they would explicit input.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the user appears to want
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Install or download an application
    Install,
    /// Fetch a shared document
    File,
    /// Anything else
    Chat,
}

/// Classifier output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentHint {
    pub kind: IntentKind,
    pub app: Option<String>,
    pub version: Option<String>,
    pub file: Option<String>,
}

impl IntentHint {
    pub fn chat() -> Self {
        Self {
            kind: IntentKind::Chat,
            app: None,
            version: None,
            file: None,
        }
    }

    pub fn install(app: impl Into<String>, version: Option<String>) -> Self {
        Self {
            kind: IntentKind::Install,
            app: Some(app.into()),
            version,
            file: None,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            kind: IntentKind::File,
            app: None,
            version: None,
            file: Some(name.into()),
        }
    }
}

/// Classifier failures. Callers degrade to a chat echo.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed classifier output: {0}")]
    Malformed(String),
}

/// Free text -> intent hint
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<IntentHint, ClassifierError>;
}

static COMMAND_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:please\s+)?(?:install|download|get)\s+(?P<target>.+?)(?:\s+(?:version\s+)?(?P<version>v?\d[\w.]*|latest))?\s*[!?]?\s*$",
    )
    .expect("Invalid command regex")
});

static FILENAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w\-]+\.[A-Za-z0-9]{2,5}$").expect("Invalid filename regex"));

/// Regex-based classifier for "install <app> [version]" and
/// "download <file.ext>" commands
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous classification, shared with the async trait impl
    pub fn classify_text(&self, text: &str) -> IntentHint {
        let Some(caps) = COMMAND_PATTERN.captures(text) else {
            return IntentHint::chat();
        };
        let Some(target) = caps.name("target").map(|m| m.as_str().trim()) else {
            return IntentHint::chat();
        };

        if FILENAME_PATTERN.is_match(target) {
            return IntentHint::file(target);
        }

        let version = caps.name("version").map(|m| {
            let v = m.as_str().trim_end_matches('.');
            let v = v.strip_prefix(['v', 'V']).unwrap_or(v);
            if v.eq_ignore_ascii_case("latest") {
                "latest".to_string()
            } else {
                v.to_string()
            }
        });

        IntentHint::install(target, version)
    }
}

#[async_trait]
impl IntentClassifier for RuleBasedClassifier {
    async fn classify(&self, text: &str) -> Result<IntentHint, ClassifierError> {
        Ok(self.classify_text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_with_version() {
        let hint = RuleBasedClassifier::new().classify_text("install MS Word 2019");
        assert_eq!(hint, IntentHint::install("MS Word", Some("2019".into())));
    }

    #[test]
    fn test_install_without_version() {
        let hint = RuleBasedClassifier::new().classify_text("Please install zoom");
        assert_eq!(hint, IntentHint::install("zoom", None));
    }

    #[test]
    fn test_download_variants() {
        let classifier = RuleBasedClassifier::new();
        assert_eq!(
            classifier.classify_text("download slack latest"),
            IntentHint::install("slack", Some("latest".into()))
        );
        assert_eq!(
            classifier.classify_text("get Zoom version 5.1"),
            IntentHint::install("Zoom", Some("5.1".into()))
        );
        assert_eq!(
            classifier.classify_text("install Zoom v5.0"),
            IntentHint::install("Zoom", Some("5.0".into()))
        );
    }

    #[test]
    fn test_file_intent() {
        let hint = RuleBasedClassifier::new().classify_text("download VPN_Guide.pdf");
        assert_eq!(hint, IntentHint::file("VPN_Guide.pdf"));
    }

    #[test]
    fn test_chat_fallback() {
        let classifier = RuleBasedClassifier::new();
        assert_eq!(classifier.classify_text("hello there"), IntentHint::chat());
        assert_eq!(classifier.classify_text("install"), IntentHint::chat());
    }

    #[tokio::test]
    async fn test_trait_classify() {
        let classifier: &dyn IntentClassifier = &RuleBasedClassifier::new();
        let hint = classifier.classify("install Slack 4.21").await.unwrap();
        assert_eq!(hint.kind, IntentKind::Install);
        assert_eq!(hint.version.as_deref(), Some("4.21"));
    }
}
