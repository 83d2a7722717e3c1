//! Storage implementations for userinfo
//!
//! This module provides the `UserStorage` trait and the bundled backends.
//!
//! The `UserStorage` trait is the capability interface the service talks to.
//! Everything about durability, schema and write ordering lives behind it, so
//! alternate backends can be substituted without touching the service.

pub mod errors;
pub mod in_memory;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod sql;

use std::any::Any;
use std::collections::HashSet;

use async_trait::async_trait;

use crate::Result;
use crate::user::User;

pub use errors::StorageError;
pub use in_memory::InMemory;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub use sql::{DbKind, SqlxStorage};

/// Storage trait abstracting the persistence of users and their per-user data.
///
/// All storage implementations must be `Send` and `Sync` to allow sharing across
/// concurrent requests, and implement `Any` to allow for downcasting if needed.
///
/// Implementations own their own synchronization. Concurrent writes for the same
/// user are ordered however the implementation orders them; callers do not
/// coordinate.
///
/// ## Missing users
///
/// Reads of per-user data (`load_settings`, `get_user_files`) return empty values
/// for users with nothing stored. Writes against a user that does not exist fail
/// with `StorageError::UserNotFound`, as does `get_user`.
#[async_trait]
pub trait UserStorage: Send + Sync + Any {
    /// Records the client session id the user is currently using.
    async fn set_user_session_id(&self, user_id: &str, session_id: &str) -> Result<()>;

    /// Retrieves a user by id.
    ///
    /// # Returns
    /// A copy of the stored `User`, or `StorageError::UserNotFound`.
    async fn get_user(&self, user_id: &str) -> Result<User>;

    /// Retrieves a user by email, creating one with a fresh id if none exists.
    async fn get_user_from_email(&self, email: &str) -> Result<User>;

    /// Loads the user's settings blob, or an empty string if none was stored.
    async fn load_settings(&self, user_id: &str) -> Result<String>;

    /// Stores the user's settings blob verbatim.
    async fn store_settings(&self, user_id: &str, settings: &str) -> Result<()>;

    /// Sets the user's display name.
    async fn set_user_name(&self, user_id: &str, name: &str) -> Result<()>;

    /// Sets the user's profile link.
    async fn set_user_link(&self, user_id: &str, link: &str) -> Result<()>;

    /// Returns the names of all files stored for the user.
    async fn get_user_files(&self, user_id: &str) -> Result<HashSet<String>>;

    /// Creates or replaces a file for the user.
    async fn upload_user_file(&self, user_id: &str, file_name: &str, contents: &[u8])
    -> Result<()>;

    /// Returns the contents of a user file, or `StorageError::UserFileNotFound`.
    async fn download_user_file(&self, user_id: &str, file_name: &str) -> Result<Vec<u8>>;

    /// Deletes a user file. Deleting a file that does not exist is not an error.
    async fn delete_user_file(&self, user_id: &str, file_name: &str) -> Result<()>;

    /// Returns a reference to the storage as a `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
