use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::error::StashError;

/// Build the object key for an upload:
/// `{year}/{branch}/{subject}/{type}[/{examYear}_{examType}]/{millis}_{name}`.
/// The millisecond timestamp keeps keys unique per upload; segments are
/// sanitized so user-supplied names cannot escape the store.
pub fn object_key(
    year: &str,
    branch: &str,
    subject: &str,
    r#type: &str,
    exam: Option<(&str, &str)>,
    original_name: &str,
    millis: i64,
) -> String {
    let mut segments = vec![
        sanitize(year),
        sanitize(branch),
        sanitize(subject),
        sanitize(r#type),
    ];

    if let Some((exam_year, exam_type)) = exam {
        segments.push(sanitize(&format!("{exam_year}_{exam_type}")));
    }

    segments.push(format!("{millis}_{}", sanitize(original_name)));
    segments.join("/")
}

fn sanitize(segment: &str) -> String {
    segment
        .replace(['/', '\\'], "_")
        .replace("..", "_")
        .trim()
        .to_string()
}

/// Filesystem-backed object store standing in for the external storage
/// service. Keys are slash-separated paths under the base directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
    max_size: usize,
}

impl BlobStore {
    pub async fn new(root: PathBuf, max_size: usize) -> Result<Self, StashError> {
        fs::create_dir_all(&root).await.map_err(|e| {
            StashError::Storage(format!(
                "Failed to create storage directory '{}': {e}",
                root.display()
            ))
        })?;

        info!(path = %root.display(), "Object store initialized");

        Ok(Self { root, max_size })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn put(&self, key: &str, data: &[u8]) -> Result<(), StashError> {
        if data.is_empty() {
            return Err(StashError::Storage("Empty file".to_string()));
        }
        if data.len() > self.max_size {
            return Err(StashError::Validation(format!(
                "File size exceeds {}MB limit",
                self.max_size / (1024 * 1024)
            )));
        }

        let path = self.safe_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&path, data)
            .await
            .map_err(|e| StashError::Storage(format!("Failed to write object {key}: {e}")))?;

        debug!(key, size = data.len(), "Stored object");
        Ok(())
    }

    #[cfg(test)]
    pub async fn get(&self, key: &str) -> Result<Vec<u8>, StashError> {
        let path = self.safe_path(key)?;

        if !path.exists() {
            return Err(StashError::NotFound(format!("No such object: {key}")));
        }

        fs::read(&path)
            .await
            .map_err(|e| StashError::Storage(format!("Failed to read object {key}: {e}")))
    }

    pub async fn delete(&self, key: &str) -> Result<(), StashError> {
        let path = self.safe_path(key)?;

        if !path.exists() {
            return Err(StashError::NotFound(format!("No such object: {key}")));
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| StashError::Storage(format!("Failed to delete object {key}: {e}")))?;

        debug!(key, "Deleted object");
        Ok(())
    }

    pub async fn exists(&self, key: &str) -> bool {
        self.safe_path(key).map(|p| p.exists()).unwrap_or(false)
    }

    /// Resolve a key below the store root, rejecting traversal components.
    fn safe_path(&self, key: &str) -> Result<PathBuf, StashError> {
        let mut resolved = self.root.clone();

        for component in Path::new(key).components() {
            match component {
                std::path::Component::Normal(c) => resolved.push(c),
                std::path::Component::ParentDir => {
                    return Err(StashError::Validation("Path traversal detected".to_string()));
                }
                _ => {}
            }
        }

        if !resolved.starts_with(&self.root) {
            return Err(StashError::Validation("Path traversal detected".to_string()));
        }

        Ok(resolved)
    }
}
