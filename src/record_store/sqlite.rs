/// SQLite-backed record store
use crate::{
    error::{ProfileError, ProfileResult},
    record_store::{RecordStore, UserDocument, UserRecord},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Record store over the `users` table
#[derive(Clone)]
pub struct SqliteRecordStore {
    db: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    fn row_to_record(row: &SqliteRow) -> ProfileResult<UserRecord> {
        let created_at_str: String = row.get("created_at");
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| ProfileError::Internal(format!("Invalid timestamp: {}", e)))?
            .with_timezone(&Utc);

        Ok(UserRecord {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            phone: row.get("phone"),
            image: row.get("image"),
            created_at,
        })
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert(&self, doc: &UserDocument, created_at: DateTime<Utc>) -> ProfileResult<String> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, phone, image, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&doc.name)
        .bind(&doc.email)
        .bind(&doc.phone)
        .bind(&doc.image)
        .bind(created_at.to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(id)
    }

    async fn find_by_id(&self, id: &str) -> ProfileResult<Option<UserRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, phone, image, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn find_all(&self) -> ProfileResult<Vec<UserRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, phone, image, created_at
            FROM users
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn update_by_id(&self, id: &str, doc: &UserDocument) -> ProfileResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = ?, email = ?, phone = ?, image = ?
            WHERE id = ?
            "#,
        )
        .bind(&doc.name)
        .bind(&doc.email)
        .bind(&doc.phone)
        .bind(&doc.image)
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: &str) -> ProfileResult<Option<UserRecord>> {
        let row = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = ?
            RETURNING id, name, email, phone, image, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.as_ref().map(Self::row_to_record).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::memory_pool, record_store::UserFields};

    fn doc(name: &str, image: &str) -> UserDocument {
        UserFields::new(name, "ada@example.com", "555-0100").with_image(image)
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = SqliteRecordStore::new(memory_pool().await);
        let now = Utc::now();

        let id = store.insert(&doc("Ada", "image_1_a.png"), now).await.unwrap();
        let record = store.find_by_id(&id).await.unwrap().unwrap();

        assert_eq!(record.id, id);
        assert_eq!(record.name, "Ada");
        assert_eq!(record.image, "image_1_a.png");
        assert_eq!(record.created_at.timestamp(), now.timestamp());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = SqliteRecordStore::new(memory_pool().await);

        let a = store.insert(&doc("Ada", "a.png"), Utc::now()).await.unwrap();
        let b = store.insert(&doc("Ada", "a.png"), Utc::now()).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(store.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_missing() {
        let store = SqliteRecordStore::new(memory_pool().await);
        assert!(store.find_by_id("nope").await.unwrap().is_none());
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let store = SqliteRecordStore::new(memory_pool().await);
        let created = Utc::now();
        let id = store.insert(&doc("Ada", "old.png"), created).await.unwrap();

        let changed = UserFields::new("Grace", "grace@example.com", "555-0199").with_image("new.png");
        assert!(store.update_by_id(&id, &changed).await.unwrap());

        let record = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(record.name, "Grace");
        assert_eq!(record.email, "grace@example.com");
        assert_eq!(record.image, "new.png");
        assert_eq!(record.created_at.timestamp(), created.timestamp());
    }

    #[tokio::test]
    async fn test_update_missing_reports_false() {
        let store = SqliteRecordStore::new(memory_pool().await);
        assert!(!store.update_by_id("nope", &doc("Ada", "a.png")).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_returns_prior_state() {
        let store = SqliteRecordStore::new(memory_pool().await);
        let id = store.insert(&doc("Ada", "gone.png"), Utc::now()).await.unwrap();

        let deleted = store.delete_by_id(&id).await.unwrap().unwrap();
        assert_eq!(deleted.image, "gone.png");

        assert!(store.find_by_id(&id).await.unwrap().is_none());
        assert!(store.delete_by_id(&id).await.unwrap().is_none());
    }
}
