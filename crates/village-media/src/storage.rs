use async_trait::async_trait;
use rand::Rng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

use crate::image::{validate_image_magic_bytes, ImageKind};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

/// Trait defining operations all storage backends must implement.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store an uploaded image and return its path relative to the storage root.
    async fn store_image(
        &self,
        kind: ImageKind,
        original_name: &str,
        data: &[u8],
    ) -> Result<String, StorageError>;

    async fn file_exists(&self, relative_path: &str) -> bool;

    async fn delete_file(&self, relative_path: &str) -> Result<(), StorageError>;
}

// ─── Local Filesystem Backend ──────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn full_path(&self, relative_path: &str) -> PathBuf {
        self.base_path.join(relative_path)
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn store_image(
        &self,
        kind: ImageKind,
        original_name: &str,
        data: &[u8],
    ) -> Result<String, StorageError> {
        if !validate_image_magic_bytes(data) {
            return Err(StorageError::InvalidImage(format!(
                "{kind} upload '{original_name}' is not a recognized image format"
            )));
        }

        let dir = self.base_path.join(kind.dir());
        fs::create_dir_all(&dir).await?;

        let mut file_name = stored_file_name(original_name);
        while fs::metadata(dir.join(&file_name)).await.is_ok() {
            file_name = stored_file_name(original_name);
        }

        let final_path = dir.join(&file_name);
        fs::write(&final_path, data).await?;
        tracing::debug!(path = %final_path.display(), bytes = data.len(), "stored {kind} image");

        Ok(format!("{}/{}", kind.dir(), file_name))
    }

    async fn file_exists(&self, relative_path: &str) -> bool {
        fs::metadata(self.full_path(relative_path)).await.is_ok()
    }

    async fn delete_file(&self, relative_path: &str) -> Result<(), StorageError> {
        let path = self.full_path(relative_path);
        if fs::metadata(&path).await.is_ok() {
            fs::remove_file(path).await?;
        }
        Ok(())
    }
}

// ─── Helpers ───────────────────────────────────────────────────────

/// Build a collision-resistant name for an upload: the part of the original
/// name before the first `.`, an underscore, 32 random hex digits, then the
/// original extension.
pub fn stored_file_name(original_name: &str) -> String {
    let base = Path::new(original_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(original_name);

    let stem = sanitize_filename(base.split('.').next().unwrap_or(""));
    let stem = if stem.is_empty() { "upload".to_string() } else { stem };

    let ext = Path::new(base)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", sanitize_filename(e)))
        .unwrap_or_default();

    let suffix: u128 = rand::rng().random();
    format!("{stem}_{suffix:032x}{ext}")
}

pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string();
    // SECURITY: reject path traversal sequences
    if sanitized == ".." || sanitized == "." || sanitized.contains("..") {
        return sanitized.replace("..", "__");
    }
    sanitized
}
