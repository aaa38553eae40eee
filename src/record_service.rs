/// Record Service
///
/// Coordinates the record store and the blob store for the add, update and
/// delete flows, and owns the file-retention policy:
///
/// - a newly stored upload is removed again if the database write after it fails
/// - a file that has been replaced or whose record is gone is removed best effort;
///   failures are logged and never undo a committed database change
use crate::{
    blob_store::BlobStore,
    error::{ProfileError, ProfileResult},
    record_store::{RecordStore, UserFields, UserRecord},
};
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

/// A file received from the browser
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Orchestrates user record operations
#[derive(Clone)]
pub struct RecordService {
    records: Arc<dyn RecordStore>,
    blobs: Arc<BlobStore>,
}

impl RecordService {
    pub fn new(records: Arc<dyn RecordStore>, blobs: Arc<BlobStore>) -> Self {
        Self { records, blobs }
    }

    /// Create a record for an uploaded image
    pub async fn add(&self, fields: UserFields, upload: Option<Upload>) -> ProfileResult<UserRecord> {
        fields.validate()?;
        let upload =
            upload.ok_or_else(|| ProfileError::Validation("image file is required".to_string()))?;

        let image = self.blobs.store(&upload.data, &upload.file_name).await?;
        let doc = fields.with_image(image.clone());
        let created_at = Utc::now();

        let id = match self.records.insert(&doc, created_at).await {
            Ok(id) => id,
            Err(e) => {
                self.discard(&image, "insert failed").await;
                return Err(e);
            }
        };

        tracing::info!("Added user {} with image {}", id, image);

        Ok(UserRecord {
            id,
            name: doc.name,
            email: doc.email,
            phone: doc.phone,
            image: doc.image,
            created_at,
        })
    }

    /// Update a record's fields, optionally replacing its image.
    ///
    /// The stored record decides which file is the previous image;
    /// `previous_image` is only what the form believed it to be.
    pub async fn update(
        &self,
        id: &str,
        fields: UserFields,
        upload: Option<Upload>,
        previous_image: Option<&str>,
    ) -> ProfileResult<UserRecord> {
        fields.validate()?;

        let current = self
            .records
            .find_by_id(id)
            .await?
            .ok_or_else(|| ProfileError::NotFound(format!("User not found: {}", id)))?;

        if let Some(claimed) = previous_image {
            if !claimed.is_empty() && claimed != current.image {
                tracing::warn!(
                    "Form for user {} sent old image {} but record has {}",
                    id,
                    claimed,
                    current.image
                );
            }
        }

        let new_image = match &upload {
            Some(upload) => Some(self.blobs.store(&upload.data, &upload.file_name).await?),
            None => None,
        };
        let image = new_image.clone().unwrap_or_else(|| current.image.clone());
        let doc = fields.with_image(image);

        let updated = match self.records.update_by_id(id, &doc).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(name) = &new_image {
                    self.discard(name, "update failed").await;
                }
                return Err(e);
            }
        };

        if !updated {
            // Deleted between the lookup and the write
            if let Some(name) = &new_image {
                self.discard(name, "record vanished").await;
            }
            return Err(ProfileError::NotFound(format!("User not found: {}", id)));
        }

        if new_image.is_some() {
            self.discard(&current.image, "image replaced").await;
        }

        tracing::info!("Updated user {}", id);

        Ok(UserRecord {
            id: current.id,
            name: doc.name,
            email: doc.email,
            phone: doc.phone,
            image: doc.image,
            created_at: current.created_at,
        })
    }

    /// Delete a record and then its image
    pub async fn delete(&self, id: &str) -> ProfileResult<UserRecord> {
        let deleted = self
            .records
            .delete_by_id(id)
            .await?
            .ok_or_else(|| ProfileError::NotFound(format!("User not found: {}", id)))?;

        self.discard(&deleted.image, "record deleted").await;

        tracing::info!("Deleted user {}", id);
        Ok(deleted)
    }

    pub async fn list(&self) -> ProfileResult<Vec<UserRecord>> {
        self.records.find_all().await
    }

    pub async fn get_for_edit(&self, id: &str) -> ProfileResult<UserRecord> {
        let record = self
            .records
            .find_by_id(id)
            .await?
            .ok_or_else(|| ProfileError::NotFound(format!("User not found: {}", id)))?;

        // The form still renders; a new upload repairs the record
        match self.blobs.exists(&record.image).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!("User {} references missing image {}", id, record.image),
            Err(e) => tracing::warn!("Could not check image {} of user {}: {}", record.image, id, e),
        }

        Ok(record)
    }

    /// Best-effort file removal
    async fn discard(&self, stored_name: &str, reason: &str) {
        if let Err(e) = self.blobs.delete(stored_name).await {
            tracing::warn!("Could not remove {} ({}): {}", stored_name, reason, e);
        }
    }
}
