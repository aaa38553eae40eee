/// Record Store
///
/// Persistence for the single collection of user profile records.
pub mod models;
pub mod sqlite;

pub use models::*;
pub use sqlite::SqliteRecordStore;

use crate::error::ProfileResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Keyed store over user records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a record and return its new id
    async fn insert(&self, doc: &UserDocument, created_at: DateTime<Utc>) -> ProfileResult<String>;

    /// Fetch a record by id
    async fn find_by_id(&self, id: &str) -> ProfileResult<Option<UserRecord>>;

    /// Fetch every record in store order
    async fn find_all(&self) -> ProfileResult<Vec<UserRecord>>;

    /// Overwrite the mutable fields of a record.
    ///
    /// Returns false when no record has this id.
    async fn update_by_id(&self, id: &str, doc: &UserDocument) -> ProfileResult<bool>;

    /// Remove a record, returning its prior state
    async fn delete_by_id(&self, id: &str) -> ProfileResult<Option<UserRecord>>;
}
