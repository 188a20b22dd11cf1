//! Storage for files attached to records through multipart forms.

use std::path::{Path, PathBuf};

use crate::errors::AppError;

/// URL prefix under which stored files are served.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Writes uploaded files below a root directory, one folder per resource.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store one file and return the public URL recorded in the record field.
    pub async fn save(&self, resource: &str, file_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        let dir = self.root.join(sanitize_file_name(resource));
        tokio::fs::create_dir_all(&dir).await?;

        let stored = format!("{}-{}", uuid::Uuid::new_v4().simple(), sanitize_file_name(file_name));
        tokio::fs::write(dir.join(&stored), bytes).await?;

        tracing::info!(resource, file = %stored, size = bytes.len(), "upload stored");
        Ok(format!("{}/{}/{}", UPLOADS_ROUTE, sanitize_file_name(resource), stored))
    }
}

/// Reduce a client-supplied name to a safe single path component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}
