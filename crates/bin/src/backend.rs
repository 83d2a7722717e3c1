//! Storage creation and utility functions.

use std::path::PathBuf;
use std::sync::Arc;

use userinfo::storage::{DbKind, InMemory, SqlxStorage, UserStorage};

use crate::cli::{Backend, ServeArgs};

/// File name of the SQLite database inside the data directory.
pub const SQLITE_FILE: &str = "userinfo.db";
/// File name of the in-memory snapshot inside the data directory.
pub const SNAPSHOT_FILE: &str = "userinfo.json";

/// Redact credentials from a PostgreSQL connection URL for safe logging
pub fn redact_postgres_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "postgres://***@<unparsable-url>".to_string()
    }
}

/// The data directory from the arguments, defaulting to the working directory.
pub fn data_dir(args: &ServeArgs) -> PathBuf {
    args.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
}

/// Create the appropriate storage based on configuration
pub async fn create_storage(
    args: &ServeArgs,
) -> Result<Arc<dyn UserStorage>, Box<dyn std::error::Error>> {
    let data_dir = data_dir(args);

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir).await?;

    match args.backend {
        Backend::Sqlite => {
            let db_path = data_dir.join(SQLITE_FILE);
            tracing::info!(path = %db_path.display(), "Using SQLite backend");
            Ok(Arc::new(SqlxStorage::open_sqlite(&db_path).await?))
        }
        Backend::Postgres => {
            let url = args
                .postgres_url
                .as_ref()
                .ok_or("PostgreSQL backend requires --postgres-url or USERINFO_POSTGRES_URL")?;

            let display_url = redact_postgres_url(url);
            tracing::info!(url = %display_url, "Connecting to PostgreSQL backend");

            match SqlxStorage::connect_postgres(url).await {
                Ok(storage) => {
                    tracing::info!("Connected to PostgreSQL successfully");
                    Ok(Arc::new(storage))
                }
                Err(e) => {
                    Err(format!("Failed to connect to PostgreSQL at {display_url}: {e}").into())
                }
            }
        }
        Backend::Inmemory => {
            let json_path = data_dir.join(SNAPSHOT_FILE);
            tracing::info!(
                path = %json_path.display(),
                "Using in-memory backend with persistence"
            );
            // A missing file loads as empty storage. Any other failure is fatal,
            // otherwise the shutdown save would overwrite the unreadable file.
            match InMemory::load_from_file(&json_path).await {
                Ok(storage) => {
                    tracing::info!(users = storage.user_count().await, "Loaded existing data");
                    Ok(Arc::new(storage))
                }
                Err(e) => {
                    tracing::error!(path = %json_path.display(), error = ?e, "Failed to load saved data");
                    Err(format!("Failed to load {}: {e}", json_path.display()).into())
                }
            }
        }
    }
}

/// Short name of the storage implementation, as reported by `/health`.
pub fn backend_label(storage: &dyn UserStorage) -> &'static str {
    if let Some(sqlx) = storage.as_any().downcast_ref::<SqlxStorage>() {
        match sqlx.kind() {
            DbKind::Sqlite => "sqlite",
            DbKind::Postgres => "postgres",
        }
    } else if storage.as_any().is::<InMemory>() {
        "inmemory"
    } else {
        "unknown"
    }
}
