//! Shared documents offered for download

use serde::{Deserialize, Serialize};

/// A downloadable document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub file_id: u64,
    pub filename: String,
    pub category: String,
    pub is_public: bool,
}

impl FileEntry {
    pub fn new(
        file_id: u64,
        filename: impl Into<String>,
        category: impl Into<String>,
        is_public: bool,
    ) -> Self {
        Self {
            file_id,
            filename: filename.into(),
            category: category.into(),
            is_public,
        }
    }
}

/// Downloaded file contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDownload {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Documents shipped with a fresh portal
pub fn default_files() -> Vec<FileEntry> {
    vec![
        FileEntry::new(1, "Employee_Handbook.pdf", "general", true),
        FileEntry::new(2, "VPN_Guide.pdf", "general", true),
        FileEntry::new(3, "Finance_Q3.xlsx", "finance", false),
        FileEntry::new(4, "Prod_DB_Creds.txt", "sensitive", false),
    ]
}
