//! Storage error types for the userinfo library.
//!
//! This module defines structured error types for storage operations,
//! providing better error context and type safety compared to string-based errors.

use thiserror::Error;

/// Errors that can occur during storage operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Field additions/changes require a major version bump
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StorageError {
    /// User not found by ID.
    #[error("User not found: {user_id}")]
    UserNotFound {
        /// The ID of the user that was not found
        user_id: String,
    },

    /// User file not found.
    #[error("File {file_name} not found for user {user_id}")]
    UserFileNotFound {
        /// The owner of the file
        user_id: String,
        /// The name of the file that was not found
        file_name: String,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// SQL database error.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Description of the failure, including context
        reason: String,
        /// The underlying sqlx error, when there is one
        #[source]
        source: Option<sqlx::Error>,
    },
}

impl StorageError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::UserNotFound { .. } | StorageError::UserFileNotFound { .. }
        )
    }

    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            StorageError::FileIo { .. }
                | StorageError::SerializationFailed { .. }
                | StorageError::DeserializationFailed { .. }
        )
    }

    /// Get the user ID if this error is about a specific user.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            StorageError::UserNotFound { user_id }
            | StorageError::UserFileNotFound { user_id, .. } => Some(user_id),
            _ => None,
        }
    }
}

// Conversion from StorageError to the main Error type
impl From<StorageError> for crate::Error {
    fn from(err: StorageError) -> Self {
        crate::Error::Storage(err)
    }
}
