//! SQL schema definitions.
//!
//! This module contains the database schema used by SQL storage.
//! The schema is portable between SQLite and Postgres.
//!
//! The stored `schema_version` must equal `SCHEMA_VERSION`. There are no
//! migrations yet, so a database written by any other version is refused
//! instead of being read with the wrong layout.

use crate::Result;
use crate::storage::errors::StorageError;

use super::SqlxStorage;

/// Current schema version.
///
/// Changing the schema requires bumping this and teaching `initialize` to
/// upgrade databases stored at the previous version.
pub const SCHEMA_VERSION: i64 = 1;

/// SQL statements to create the schema tables.
///
/// Each statement uses portable SQL that works on both SQLite and PostgreSQL.
pub const CREATE_TABLES: &[&str] = &[
    // Schema version tracking
    "CREATE TABLE IF NOT EXISTS schema_version (
        version BIGINT PRIMARY KEY
    )",
    // User identity records
    // email is the login identity and must be unique
    "CREATE TABLE IF NOT EXISTS users (
        user_id TEXT PRIMARY KEY NOT NULL,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        link TEXT,
        session_id TEXT,
        created_at BIGINT NOT NULL
    )",
    // Opaque per-user settings blobs
    "CREATE TABLE IF NOT EXISTS user_settings (
        user_id TEXT PRIMARY KEY NOT NULL,
        settings TEXT NOT NULL
    )",
    // Per-user files
    // BYTEA is PostgreSQL binary type and SQLite maps it to BLOB affinity
    "CREATE TABLE IF NOT EXISTS user_files (
        user_id TEXT NOT NULL,
        file_name TEXT NOT NULL,
        contents BYTEA NOT NULL,
        PRIMARY KEY (user_id, file_name)
    )",
];

fn schema_error(reason: String, source: sqlx::Error) -> StorageError {
    StorageError::SqlxError {
        reason,
        source: Some(source),
    }
}

/// Initialize the database schema.
///
/// Creates tables if they don't exist and records `SCHEMA_VERSION` in a new
/// database. Fails if an existing database records any other version.
pub async fn initialize(storage: &SqlxStorage) -> Result<()> {
    let pool = storage.pool();

    for statement in CREATE_TABLES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| schema_error(format!("Schema creation failed: {e} - SQL: {statement}"), e))?;
    }

    let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM schema_version")
        .fetch_optional(pool)
        .await
        .map_err(|e| schema_error(format!("Failed to check schema version: {e}"), e))?;

    match row {
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
                .bind(SCHEMA_VERSION)
                .execute(pool)
                .await
                .map_err(|e| {
                    schema_error(format!("Failed to initialize schema version: {e}"), e)
                })?;
            tracing::info!(version = SCHEMA_VERSION, "Initialized SQL schema");
            Ok(())
        }
        Some((SCHEMA_VERSION,)) => Ok(()),
        Some((stored,)) => Err(StorageError::SqlxError {
            reason: format!(
                "Unsupported schema version {stored}; this build only supports version {SCHEMA_VERSION}"
            ),
            source: None,
        }
        .into()),
    }
}
