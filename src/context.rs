/// Application context and dependency injection
use crate::{
    blob_store::{BlobStore, DiskBlobBackend},
    config::ServerConfig,
    db,
    error::{ProfileError, ProfileResult},
    record_service::RecordService,
    record_store::{RecordStore, SqliteRecordStore},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub record_service: Arc<RecordService>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ProfileResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create data directories if they don't exist
        Self::ensure_directories(&config).await?;

        // Initialize the record database
        let db = db::create_pool(&config.storage.database_path, db::DatabaseOptions::default())
            .await?;
        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        tracing::info!("Database ready at {:?}", config.storage.database_path);

        Ok(Self::from_parts(config, db))
    }

    /// Wire the stores and the service around an open pool
    pub fn from_parts(config: ServerConfig, db: SqlitePool) -> Self {
        let record_store: Arc<dyn RecordStore> = Arc::new(SqliteRecordStore::new(db.clone()));
        let blob_store = Arc::new(BlobStore::new(Arc::new(DiskBlobBackend::new(
            config.storage.upload_directory.clone(),
        ))));
        let record_service = Arc::new(RecordService::new(record_store, blob_store));

        Self {
            config: Arc::new(config),
            db,
            record_service,
        }
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> ProfileResult<()> {
        let dirs = vec![
            &config.storage.data_directory,
            &config.storage.upload_directory,
        ];

        for dir in dirs {
            if !dir.exists() {
                tokio::fs::create_dir_all(dir).await.map_err(|e| {
                    ProfileError::Internal(format!("Failed to create directory {:?}: {}", dir, e))
                })?;
            }
        }

        Ok(())
    }

    /// Release the database pool
    pub async fn close(&self) {
        self.db.close().await;
        tracing::info!("Database connections closed");
    }
}
