/// User record data models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A stored user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Stored filename in the upload directory
    pub image: String,
    pub created_at: DateTime<Utc>,
}

/// Text fields submitted by the add and edit forms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct UserFields {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
}

impl UserFields {
    /// Build the fields with surrounding whitespace removed
    pub fn new(name: &str, email: &str, phone: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
        }
    }

    /// Attach an image filename, producing the writable document
    pub fn with_image(self, image: impl Into<String>) -> UserDocument {
        UserDocument {
            name: self.name,
            email: self.email,
            phone: self.phone,
            image: image.into(),
        }
    }
}

/// The mutable part of a record as written to the store
#[derive(Debug, Clone, PartialEq)]
pub struct UserDocument {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub image: String,
}
