/// Configuration management for the profile system
use crate::error::{ProfileError, ProfileResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Maximum accepted request body, in bytes
    pub upload_limit: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database_path: PathBuf,
    /// Directory holding uploaded profile images
    pub upload_directory: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ProfileResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("PROFILE_HOSTNAME").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_setting("PORT", &env::var("PORT").unwrap_or_else(|_| "8000".to_string()))?;
        let upload_limit = parse_setting(
            "PROFILE_UPLOAD_LIMIT",
            &env::var("PROFILE_UPLOAD_LIMIT").unwrap_or_else(|_| "10485760".to_string()),
        )?;

        let data_directory: PathBuf = env::var("PROFILE_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database_path = env::var("PROFILE_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("profiles.sqlite"));
        let upload_directory = env::var("PROFILE_UPLOAD_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./public/uploads"));

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                upload_limit,
            },
            storage: StorageConfig {
                data_directory,
                database_path,
                upload_directory,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ProfileResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ProfileError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.service.port == 0 {
            return Err(ProfileError::Validation("Port cannot be 0".to_string()));
        }

        if self.service.upload_limit == 0 {
            return Err(ProfileError::Validation(
                "Upload limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.hostname, self.service.port)
    }
}

/// Parse a numeric setting, naming the variable on failure
fn parse_setting<T: std::str::FromStr>(name: &str, raw: &str) -> ProfileResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| ProfileError::Validation(format!("Invalid value for {}: {}", name, raw)))
}

#[cfg(test)]
pub(crate) fn test_config(root: &std::path::Path) -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "127.0.0.1".to_string(),
            port: 8000,
            upload_limit: 1024 * 1024,
        },
        storage: StorageConfig {
            data_directory: root.to_path_buf(),
            database_path: root.join("profiles.sqlite"),
            upload_directory: root.join("uploads"),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
    }
}
