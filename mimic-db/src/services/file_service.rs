//! File Service
//!
//! Role-gated access to shared documents. Downloads return placeholder
//! content and are recorded as `file` log entries.

use std::sync::Arc;

use mimic_core::catalog::similarity;
use mimic_core::error::{PortalError, PortalResult};
use mimic_core::logging::operations;
use mimic_core::policy;
use mimic_core::types::{FileDownload, FileEntry, LogEvent, LogType, Viewer};

use super::AuditService;

const NAME_MATCH_THRESHOLD: f64 = 0.6;

#[derive(Clone)]
pub struct FileService {
    files: Arc<Vec<FileEntry>>,
    audit: AuditService,
}

impl FileService {
    pub fn new(files: Vec<FileEntry>, audit: AuditService) -> Self {
        Self {
            files: Arc::new(files),
            audit,
        }
    }

    /// Files the viewer may access, optionally narrowed by a case-insensitive
    /// search over filename and category
    pub fn list_files(&self, viewer: &Viewer, search: Option<&str>) -> Vec<FileEntry> {
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        self.files
            .iter()
            .filter(|f| policy::can_access(viewer.role, f.is_public))
            .filter(|f| match needle {
                Some(ref n) => {
                    f.filename.to_lowercase().contains(n) || f.category.to_lowercase().contains(n)
                }
                None => true,
            })
            .cloned()
            .collect()
    }

    /// Closest accessible file to a loosely typed name
    pub fn find_by_name(&self, viewer: &Viewer, name: &str) -> PortalResult<FileEntry> {
        let needle = name.trim().to_lowercase();
        let candidates: Vec<&FileEntry> = self.files.iter().collect();

        let found = candidates
            .iter()
            .find(|f| f.filename.to_lowercase() == needle)
            .or_else(|| {
                candidates
                    .iter()
                    .map(|f| (f, similarity(&f.filename.to_lowercase(), &needle)))
                    .filter(|(_, score)| *score >= NAME_MATCH_THRESHOLD)
                    .max_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(f, _)| f)
            })
            .ok_or_else(|| PortalError::not_found("File", name))?;

        self.check_access(viewer, found)?;
        Ok((*found).clone())
    }

    fn check_access(&self, viewer: &Viewer, file: &FileEntry) -> PortalResult<()> {
        if policy::can_access(viewer.role, file.is_public) {
            return Ok(());
        }
        tracing::warn!(
            actor_id = %viewer.username,
            role = viewer.role.as_str(),
            operation = operations::ACCESS_DENY,
            "Private file access denied"
        );
        Err(PortalError::forbidden(format!(
            "{} requires manager or admin",
            file.filename
        )))
    }

    /// Download by id
    pub async fn download(&self, viewer: &Viewer, file_id: u64) -> PortalResult<FileDownload> {
        let file = self
            .files
            .iter()
            .find(|f| f.file_id == file_id)
            .ok_or_else(|| PortalError::not_found("File", file_id.to_string()))?;
        self.check_access(viewer, file)?;

        tracing::info!(
            actor_id = %viewer.username,
            operation = operations::FILE_DOWNLOAD,
            "File downloaded"
        );

        self.audit
            .record(
                LogEvent::new(
                    &viewer.username,
                    LogType::File,
                    format!("Downloaded {}", file.filename),
                )
                .with_status("Downloaded"),
            )
            .await;

        Ok(FileDownload {
            filename: file.filename.clone(),
            content: format!("Dummy file: {}", file.filename).into_bytes(),
        })
    }

    /// Every file, regardless of role
    pub fn all(&self) -> &[FileEntry] {
        &self.files
    }
}
