//! In-memory storage implementation
//!
//! This module provides an in-memory implementation of the UserStorage trait,
//! suitable for testing, development, or single-node deployments where data
//! is persisted by saving the whole state to a file on shutdown.

mod persistence;

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::Result;
use crate::storage::UserStorage;
use crate::storage::errors::StorageError;
use crate::user::User;

/// User files grouped by owner: user_id -> (file_name -> contents)
pub(crate) type UserFiles = HashMap<String, HashMap<String, Vec<u8>>>;

/// A simple in-memory storage implementation using `HashMap`s.
///
/// It provides basic persistence capabilities via `save_to_file` and
/// `load_from_file`, serializing the maps to JSON.
#[derive(Debug, Default)]
pub struct InMemory {
    /// Users keyed by user id
    pub(crate) users: RwLock<HashMap<String, User>>,
    /// Settings blobs keyed by user id
    pub(crate) settings: RwLock<HashMap<String, String>>,
    /// Per-user files
    pub(crate) files: RwLock<UserFiles>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user record directly.
    ///
    /// Useful for seeding users with known ids; `get_user_from_email` is the
    /// normal creation path.
    pub async fn put_user(&self, user: User) {
        let mut users = self.users.write().await;
        users.insert(user.user_id.clone(), user);
    }

    /// Returns the number of users currently stored.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Saves the entire storage state to a specified file as JSON.
    ///
    /// # Arguments
    /// * `path` - The path to the file where the state should be saved.
    ///
    /// # Returns
    /// A `Result` indicating success or an I/O or serialization error.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads the storage state from a specified JSON file.
    ///
    /// If the file does not exist, a new, empty `InMemory` storage is returned.
    ///
    /// # Arguments
    /// * `path` - The path to the file from which to load the state.
    ///
    /// # Returns
    /// A `Result` containing the loaded `InMemory` storage or an I/O or deserialization error.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }

    /// Applies `update` to a stored user, failing if the user does not exist.
    async fn update_user<F>(&self, user_id: &str, update: F) -> Result<()>
    where
        F: FnOnce(&mut User) + Send,
    {
        let mut users = self.users.write().await;
        match users.get_mut(user_id) {
            Some(user) => {
                update(user);
                Ok(())
            }
            None => Err(StorageError::UserNotFound {
                user_id: user_id.to_string(),
            }
            .into()),
        }
    }

    async fn ensure_user_exists(&self, user_id: &str) -> Result<()> {
        if self.users.read().await.contains_key(user_id) {
            Ok(())
        } else {
            Err(StorageError::UserNotFound {
                user_id: user_id.to_string(),
            }
            .into())
        }
    }
}

#[async_trait]
impl UserStorage for InMemory {
    async fn set_user_session_id(&self, user_id: &str, session_id: &str) -> Result<()> {
        self.update_user(user_id, |user| {
            user.session_id = Some(session_id.to_string())
        })
        .await
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        let users = self.users.read().await;
        users.get(user_id).cloned().ok_or_else(|| {
            StorageError::UserNotFound {
                user_id: user_id.to_string(),
            }
            .into()
        })
    }

    async fn get_user_from_email(&self, email: &str) -> Result<User> {
        // Held for writing across lookup and insert so two logins with the
        // same email cannot create two users.
        let mut users = self.users.write().await;
        if let Some(user) = users.values().find(|u| u.email == email) {
            return Ok(user.clone());
        }

        let user = User::new(Uuid::new_v4().to_string(), email);
        tracing::info!(user_id = %user.user_id, "Created user");
        users.insert(user.user_id.clone(), user.clone());
        Ok(user)
    }

    async fn load_settings(&self, user_id: &str) -> Result<String> {
        let settings = self.settings.read().await;
        Ok(settings.get(user_id).cloned().unwrap_or_default())
    }

    async fn store_settings(&self, user_id: &str, settings: &str) -> Result<()> {
        self.ensure_user_exists(user_id).await?;
        let mut all_settings = self.settings.write().await;
        all_settings.insert(user_id.to_string(), settings.to_string());
        Ok(())
    }

    async fn set_user_name(&self, user_id: &str, name: &str) -> Result<()> {
        self.update_user(user_id, |user| user.name = name.to_string())
            .await
    }

    async fn set_user_link(&self, user_id: &str, link: &str) -> Result<()> {
        self.update_user(user_id, |user| user.link = Some(link.to_string()))
            .await
    }

    async fn get_user_files(&self, user_id: &str) -> Result<HashSet<String>> {
        let files = self.files.read().await;
        Ok(files
            .get(user_id)
            .map(|user_files| user_files.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn upload_user_file(
        &self,
        user_id: &str,
        file_name: &str,
        contents: &[u8],
    ) -> Result<()> {
        self.ensure_user_exists(user_id).await?;
        let mut files = self.files.write().await;
        files
            .entry(user_id.to_string())
            .or_default()
            .insert(file_name.to_string(), contents.to_vec());
        Ok(())
    }

    async fn download_user_file(&self, user_id: &str, file_name: &str) -> Result<Vec<u8>> {
        let files = self.files.read().await;
        files
            .get(user_id)
            .and_then(|user_files| user_files.get(file_name))
            .cloned()
            .ok_or_else(|| {
                StorageError::UserFileNotFound {
                    user_id: user_id.to_string(),
                    file_name: file_name.to_string(),
                }
                .into()
            })
    }

    async fn delete_user_file(&self, user_id: &str, file_name: &str) -> Result<()> {
        let mut files = self.files.write().await;
        if let Some(user_files) = files.get_mut(user_id) {
            user_files.remove(file_name);
            if user_files.is_empty() {
                files.remove(user_id);
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
