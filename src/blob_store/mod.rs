/// Blob Store
///
/// Keeps uploaded profile images in a flat directory under generated,
/// collision-resistant names of the form `{field}_{epoch_ms}_{original}`.

pub mod disk;

pub use disk::DiskBlobBackend;

use crate::error::{ProfileError, ProfileResult};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// Form field that carries the uploaded image
pub const IMAGE_FIELD: &str = "image";

/// Attempts at finding a free name before giving up
const MAX_NAME_ATTEMPTS: i64 = 32;

/// Blob storage backend trait
///
/// Implementations handle the actual storage of named files.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Write a new blob. Returns false without writing if the name is taken.
    async fn put_new(&self, name: &str, data: &[u8]) -> ProfileResult<bool>;

    /// Delete a blob. A missing blob is an error.
    async fn delete(&self, name: &str) -> ProfileResult<()>;

    /// Check if a blob exists
    async fn exists(&self, name: &str) -> ProfileResult<bool>;
}

/// Upload manager generating stored names on top of a backend
#[derive(Clone)]
pub struct BlobStore {
    backend: Arc<dyn BlobBackend>,
    field: String,
}

impl BlobStore {
    pub fn new(backend: Arc<dyn BlobBackend>) -> Self {
        Self {
            backend,
            field: IMAGE_FIELD.to_string(),
        }
    }

    /// Persist an upload and return its generated stored name
    pub async fn store(&self, data: &[u8], original_name: &str) -> ProfileResult<String> {
        let original = sanitize_original_name(original_name);
        let epoch_ms = Utc::now().timestamp_millis();

        for bump in 0..MAX_NAME_ATTEMPTS {
            let name = stored_name(&self.field, epoch_ms + bump, &original);
            if self.backend.put_new(&name, data).await? {
                tracing::debug!("Stored upload {} ({} bytes)", name, data.len());
                return Ok(name);
            }
        }

        Err(ProfileError::storage(
            format!("no free name for upload {}", original),
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "name collision"),
        ))
    }

    /// Remove a stored file; fails if it does not exist
    pub async fn delete(&self, stored_name: &str) -> ProfileResult<()> {
        check_stored_name(stored_name)?;
        self.backend.delete(stored_name).await
    }

    pub async fn exists(&self, stored_name: &str) -> ProfileResult<bool> {
        check_stored_name(stored_name)?;
        self.backend.exists(stored_name).await
    }
}

/// Build `{field}_{epoch_ms}_{original}`
pub fn stored_name(field: &str, epoch_ms: i64, original: &str) -> String {
    format!("{}_{}_{}", field, epoch_ms, original)
}

/// Reduce a client-supplied filename to its last path component
fn sanitize_original_name(original: &str) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or("")
        .trim();

    if base.is_empty() || base == "." || base == ".." {
        "upload".to_string()
    } else {
        base.to_string()
    }
}

/// Stored names are flat; anything that could walk out of the directory is rejected
fn check_stored_name(name: &str) -> ProfileResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(ProfileError::Validation(format!(
            "Invalid stored file name: {}",
            name
        )));
    }
    Ok(())
}
