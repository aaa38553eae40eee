/// Unified error types for the profile system
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type shared by the stores, the record service and the HTTP layer
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Missing required field or file
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record id absent from the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Filesystem failures in the upload directory
    #[error("Storage error: {context}: {source}")]
    StorageIo {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Database errors
    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProfileError {
    pub fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        ProfileError::StorageIo {
            context: context.into(),
            source,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProfileError::Validation(_) => StatusCode::BAD_REQUEST,
            ProfileError::NotFound(_) => StatusCode::NOT_FOUND,
            ProfileError::StorageIo { .. }
            | ProfileError::Persistence(_)
            | ProfileError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to a browser user
    pub fn user_message(&self) -> String {
        match self {
            ProfileError::Validation(msg) | ProfileError::NotFound(msg) => msg.clone(),
            // Don't leak paths or SQL
            ProfileError::StorageIo { .. } => "Failed to store the uploaded file".to_string(),
            ProfileError::Persistence(_) | ProfileError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl From<validator::ValidationErrors> for ProfileError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                errs.iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is required", field))
            })
            .collect();
        fields.sort();
        ProfileError::Validation(fields.join(", "))
    }
}

/// Error payload returned to the browser
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(ErrorResponse {
            message: self.user_message(),
            kind: "danger".to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for profile system operations
pub type ProfileResult<T> = Result<T, ProfileError>;
