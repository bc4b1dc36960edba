//! File storage for uploaded form attachments.
//!
//! Attachments live under the uploads root in one subdirectory per form
//! type. Stored names are prefixed with a timestamp and the submitting
//! form's identifier so they never collide.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use tracing::{debug, info};

use normtrack_core::types::FormType;

use crate::error::StoreError;

/// Details about one stored attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentInfo {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    /// Path relative to the uploads root.
    pub relative_path: String,
}

/// Filesystem-backed store for uploaded attachments.
pub struct AttachmentStore {
    base_dir: PathBuf,
}

impl AttachmentStore {
    /// Open a store over the uploads root, creating the per-form-type
    /// directories if needed.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        for form_type in [
            FormType::SopProduction,
            FormType::Hirarc,
            FormType::InternalAudit,
        ] {
            std::fs::create_dir_all(base_dir.join(form_type.dir_name()))?;
        }
        Ok(Self { base_dir })
    }

    /// Save an uploaded file and return its path relative to the uploads
    /// root.
    ///
    /// The stored name is `<yyyymmdd_hhmmss>_<identifier>_<original-name>`
    /// with spaces replaced by underscores.
    pub fn save(
        &self,
        original_name: &str,
        bytes: &[u8],
        form_type: FormType,
        identifier: &str,
    ) -> Result<String, StoreError> {
        let dir = self.base_dir.join(form_type.dir_name());
        std::fs::create_dir_all(&dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let clean_name = original_name.replace(' ', "_");
        let clean_id = identifier.replace(' ', "_");
        let file_name = format!("{}_{}_{}", timestamp, clean_id, clean_name);
        let path = dir.join(&file_name);

        std::fs::write(&path, bytes)?;
        info!(
            "Stored attachment {} ({} bytes)",
            path.display(),
            bytes.len()
        );
        Ok(format!("{}/{}", form_type.dir_name(), file_name))
    }

    /// Absolute path for a stored attachment.
    ///
    /// Rejects relative paths that would escape the uploads root.
    pub fn path_of(&self, relative: &str) -> Result<PathBuf, StoreError> {
        let rel = Path::new(relative);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::RootDir))
        {
            return Err(StoreError::InvalidPath(relative.to_string()));
        }
        Ok(self.base_dir.join(rel))
    }

    /// Delete an attachment. Returns `true` if a file was removed.
    pub fn delete(&self, relative: &str) -> Result<bool, StoreError> {
        let path = self.path_of(relative)?;
        if path.exists() {
            std::fs::remove_file(&path)?;
            debug!("Deleted attachment {}", relative);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// List stored attachments, optionally restricted to one form type.
    ///
    /// Returns paths relative to the uploads root.
    pub fn list(&self, form_type: Option<FormType>) -> Result<Vec<String>, StoreError> {
        let search_root = match form_type {
            Some(ft) => self.base_dir.join(ft.dir_name()),
            None => self.base_dir.clone(),
        };
        let mut files = Vec::new();
        if search_root.exists() {
            collect_files(&search_root, &self.base_dir, &mut files)?;
        }
        files.sort();
        Ok(files)
    }

    /// Metadata for one stored attachment.
    pub fn info(&self, relative: &str) -> Result<AttachmentInfo, StoreError> {
        let path = self.path_of(relative)?;
        if !path.exists() {
            return Err(StoreError::AttachmentNotFound(relative.to_string()));
        }
        let meta = std::fs::metadata(&path)?;
        let modified: DateTime<Utc> = meta.modified()?.into();
        Ok(AttachmentInfo {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: meta.len(),
            modified,
            relative_path: relative.to_string(),
        })
    }

    /// Move an attachment into another form type's directory.
    ///
    /// Returns the new relative path.
    pub fn relocate(
        &self,
        relative: &str,
        new_form_type: FormType,
    ) -> Result<String, StoreError> {
        let current = self.path_of(relative)?;
        if !current.exists() {
            return Err(StoreError::AttachmentNotFound(relative.to_string()));
        }
        let file_name = current
            .file_name()
            .ok_or_else(|| StoreError::InvalidPath(relative.to_string()))?
            .to_os_string();

        let new_dir = self.base_dir.join(new_form_type.dir_name());
        std::fs::create_dir_all(&new_dir)?;
        let new_path = new_dir.join(&file_name);
        std::fs::rename(&current, &new_path)?;

        Ok(format!(
            "{}/{}",
            new_form_type.dir_name(),
            file_name.to_string_lossy()
        ))
    }

    /// Remove attachments older than `days` days. Returns the removed count.
    pub fn cleanup_older_than(&self, days: u32) -> Result<usize, StoreError> {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
        let mut removed = 0;
        let mut files = Vec::new();
        collect_files(&self.base_dir, &self.base_dir, &mut files)?;
        for relative in files {
            let path = self.base_dir.join(&relative);
            let modified: DateTime<Utc> = std::fs::metadata(&path)?.modified()?.into();
            if modified < cutoff {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        if removed > 0 {
            info!("Cleanup removed {} attachments older than {} days", removed, days);
        }
        Ok(removed)
    }
}

/// Recursively collect regular files under `dir` as paths relative to `base`.
fn collect_files(dir: &Path, base: &Path, out: &mut Vec<String>) -> Result<(), StoreError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, base, out)?;
        } else if path.is_file() {
            // The records file lives next to the attachment dirs; skip it.
            if path.extension().map(|e| e == "json").unwrap_or(false) && path.parent() == Some(base)
            {
                continue;
            }
            let relative = path
                .strip_prefix(base)
                .map_err(|_| StoreError::InvalidPath(path.display().to_string()))?;
            out.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}
