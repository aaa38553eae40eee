/// Disk-based blob storage backend
use crate::{
    blob_store::BlobBackend,
    error::{ProfileError, ProfileResult},
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::{fs, io::AsyncWriteExt};

/// Disk storage backend
///
/// Stores blobs directly under the upload directory so they can be served
/// by name as static files.
#[derive(Clone)]
pub struct DiskBlobBackend {
    base_path: PathBuf,
}

impl DiskBlobBackend {
    /// Create a new disk storage backend
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn get_blob_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }
}

#[async_trait]
impl BlobBackend for DiskBlobBackend {
    async fn put_new(&self, name: &str, data: &[u8]) -> ProfileResult<bool> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            ProfileError::storage(format!("create upload directory {:?}", self.base_path), e)
        })?;

        let blob_path = self.get_blob_path(name);
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&blob_path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(ProfileError::storage(format!("create blob {}", name), e)),
        };

        let written = async {
            file.write_all(data).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            // Don't leave a truncated file behind under a name nobody will reference
            let _ = fs::remove_file(&blob_path).await;
            return Err(ProfileError::storage(format!("write blob {}", name), e));
        }

        Ok(true)
    }

    async fn delete(&self, name: &str) -> ProfileResult<()> {
        fs::remove_file(self.get_blob_path(name))
            .await
            .map_err(|e| ProfileError::storage(format!("delete blob {}", name), e))
    }

    async fn exists(&self, name: &str) -> ProfileResult<bool> {
        fs::try_exists(self.get_blob_path(name))
            .await
            .map_err(|e| ProfileError::storage(format!("stat blob {}", name), e))
    }
}
