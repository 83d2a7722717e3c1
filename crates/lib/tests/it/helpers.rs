#![allow(dead_code)]

use std::any::Any;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use userinfo::{
    Result, User, UserInfoService,
    flags::StaticFlags,
    identity::RequestContext,
    storage::{InMemory, UserStorage},
};

// ==========================
// CORE TEST FACTORIES
// ==========================

/// Creates a test storage based on TEST_BACKEND env var.
///
/// Supported values:
/// - "inmemory" or unset: InMemory storage (default)
/// - "sqlite": SQLite in-memory storage (requires `sqlite` feature)
/// - "postgres": PostgreSQL storage (requires `postgres` feature and TEST_POSTGRES_URL)
///
/// # Example
/// ```bash
/// # Run tests with SQLite
/// TEST_BACKEND=sqlite cargo test --features sqlite
///
/// # Run tests with PostgreSQL
/// TEST_BACKEND=postgres TEST_POSTGRES_URL="postgres://localhost/userinfo_test" \
///   cargo test --features postgres
/// ```
pub async fn test_storage() -> Arc<dyn UserStorage> {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("sqlite") => {
            #[cfg(feature = "sqlite")]
            {
                use userinfo::storage::sql::Sqlite;
                Arc::new(
                    Sqlite::sqlite_in_memory()
                        .await
                        .expect("Failed to create SQLite storage"),
                )
            }
            #[cfg(not(feature = "sqlite"))]
            {
                panic!("TEST_BACKEND=sqlite requires the 'sqlite' feature to be enabled")
            }
        }
        Ok("postgres") => {
            #[cfg(feature = "postgres")]
            {
                use userinfo::storage::sql::Postgres;
                let url = std::env::var("TEST_POSTGRES_URL")
                    .unwrap_or_else(|_| "postgres://localhost/userinfo_test".to_string());
                Arc::new(
                    Postgres::connect_postgres(&url)
                        .await
                        .expect("Failed to connect to PostgreSQL"),
                )
            }
            #[cfg(not(feature = "postgres"))]
            {
                panic!("TEST_BACKEND=postgres requires the 'postgres' feature to be enabled")
            }
        }
        Ok("inmemory") | Ok("") | Err(_) => Arc::new(InMemory::new()),
        Ok(other) => {
            panic!("Unknown TEST_BACKEND value: {other}. Supported: inmemory, sqlite, postgres")
        }
    }
}

/// A unique email, so tests sharing a persistent backend never collide.
pub fn unique_email(local: &str) -> String {
    format!("{local}+{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Creates a user in `storage` and returns a request context for it.
pub async fn create_caller(storage: &dyn UserStorage, local: &str) -> RequestContext {
    let user = storage
        .get_user_from_email(&unique_email(local))
        .await
        .expect("Failed to create user");
    RequestContext::for_user(user)
}

/// Creates a service over `storage` with an empty flag set.
///
/// Returns the flags so tests can change them between calls.
pub fn test_service(storage: Arc<dyn UserStorage>) -> (UserInfoService, StaticFlags) {
    let flags = StaticFlags::new();
    let service = UserInfoService::new(storage, Arc::new(flags.clone()));
    (service, flags)
}

/// Creates a service over fresh test storage with one caller.
pub async fn test_service_with_caller(
    local: &str,
) -> (UserInfoService, StaticFlags, RequestContext) {
    let storage = test_storage().await;
    let ctx = create_caller(storage.as_ref(), local).await;
    let (service, flags) = test_service(storage);
    (service, flags, ctx)
}

// ==========================
// RECORDING STORAGE
// ==========================

/// A storage call observed by `RecordingStorage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    SetUserSessionId { user_id: String, session_id: String },
    GetUser { user_id: String },
    LoadSettings { user_id: String },
    StoreSettings { user_id: String },
    SetUserName { user_id: String },
    SetUserLink { user_id: String },
    GetUserFiles { user_id: String },
    DeleteUserFile { user_id: String, file_name: String },
    Other,
}

/// Wraps an `InMemory` storage and records every call made through it.
#[derive(Default)]
pub struct RecordingStorage {
    pub inner: InMemory,
    calls: Mutex<Vec<StorageCall>>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: StorageCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Only the session-id writes, in order.
    pub fn session_writes(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StorageCall::SetUserSessionId {
                    user_id,
                    session_id,
                } => Some((user_id, session_id)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl UserStorage for RecordingStorage {
    async fn set_user_session_id(&self, user_id: &str, session_id: &str) -> Result<()> {
        self.record(StorageCall::SetUserSessionId {
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
        });
        self.inner.set_user_session_id(user_id, session_id).await
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        self.record(StorageCall::GetUser {
            user_id: user_id.to_string(),
        });
        self.inner.get_user(user_id).await
    }

    async fn get_user_from_email(&self, email: &str) -> Result<User> {
        self.record(StorageCall::Other);
        self.inner.get_user_from_email(email).await
    }

    async fn load_settings(&self, user_id: &str) -> Result<String> {
        self.record(StorageCall::LoadSettings {
            user_id: user_id.to_string(),
        });
        self.inner.load_settings(user_id).await
    }

    async fn store_settings(&self, user_id: &str, settings: &str) -> Result<()> {
        self.record(StorageCall::StoreSettings {
            user_id: user_id.to_string(),
        });
        self.inner.store_settings(user_id, settings).await
    }

    async fn set_user_name(&self, user_id: &str, name: &str) -> Result<()> {
        self.record(StorageCall::SetUserName {
            user_id: user_id.to_string(),
        });
        self.inner.set_user_name(user_id, name).await
    }

    async fn set_user_link(&self, user_id: &str, link: &str) -> Result<()> {
        self.record(StorageCall::SetUserLink {
            user_id: user_id.to_string(),
        });
        self.inner.set_user_link(user_id, link).await
    }

    async fn get_user_files(&self, user_id: &str) -> Result<HashSet<String>> {
        self.record(StorageCall::GetUserFiles {
            user_id: user_id.to_string(),
        });
        self.inner.get_user_files(user_id).await
    }

    async fn upload_user_file(
        &self,
        user_id: &str,
        file_name: &str,
        contents: &[u8],
    ) -> Result<()> {
        self.record(StorageCall::Other);
        self.inner
            .upload_user_file(user_id, file_name, contents)
            .await
    }

    async fn download_user_file(&self, user_id: &str, file_name: &str) -> Result<Vec<u8>> {
        self.record(StorageCall::Other);
        self.inner.download_user_file(user_id, file_name).await
    }

    async fn delete_user_file(&self, user_id: &str, file_name: &str) -> Result<()> {
        self.record(StorageCall::DeleteUserFile {
            user_id: user_id.to_string(),
            file_name: file_name.to_string(),
        });
        self.inner.delete_user_file(user_id, file_name).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
