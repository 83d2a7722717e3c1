//! Persistence operations for InMemory storage
//!
//! This module handles serialization and file I/O for saving/loading
//! the in-memory storage state to/from JSON files.

use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

use super::{InMemory, UserFiles};
use crate::{Error, Result, storage::errors::StorageError, user::User};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// Serializable snapshot of InMemory storage for persistence
#[derive(Serialize, Deserialize)]
struct SerializableStorage {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    users: HashMap<String, User>,
    #[serde(default)]
    settings: HashMap<String, String>,
    #[serde(default)]
    files: UserFiles,
}

/// Saves the entire storage state to a specified file as JSON.
pub(crate) async fn save_to_file<P: AsRef<Path>>(storage: &InMemory, path: P) -> Result<()> {
    let users = storage.users.read().await.clone();
    let settings = storage.settings.read().await.clone();
    let files = storage.files.read().await.clone();

    let serializable = SerializableStorage {
        version: PERSISTENCE_VERSION,
        users,
        settings,
        files,
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { StorageError::SerializationFailed { source: e }.into() })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| -> Error { StorageError::FileIo { source: e }.into() })
}

/// Loads the storage state from a specified JSON file.
///
/// If the file does not exist, a new, empty `InMemory` storage is returned.
pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => {
            let serializable: SerializableStorage =
                serde_json::from_str(&json).map_err(|e| -> Error {
                    StorageError::DeserializationFailed { source: e }.into()
                })?;
            Ok(InMemory {
                users: RwLock::new(serializable.users),
                settings: RwLock::new(serializable.settings),
                files: RwLock::new(serializable.files),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
        Err(e) => Err(StorageError::FileIo { source: e }.into()),
    }
}
