//! User storage operations for SQL backends.
//!
//! This module implements the per-user CRUD operations using sqlx.

use std::collections::HashSet;

use uuid::Uuid;

use crate::Result;
use crate::storage::errors::StorageError;
use crate::user::User;

use super::{SqlxResultExt, SqlxStorage};

type UserRow = (String, String, String, Option<String>, Option<String>, i64);

const SELECT_USER: &str =
    "SELECT user_id, email, name, link, session_id, created_at FROM users";

fn user_from_row((user_id, email, name, link, session_id, created_at): UserRow) -> User {
    User {
        user_id,
        email,
        name,
        link,
        session_id,
        created_at,
    }
}

fn user_not_found(user_id: &str) -> crate::Error {
    StorageError::UserNotFound {
        user_id: user_id.to_string(),
    }
    .into()
}

/// Fail with `UserNotFound` unless the user exists.
async fn ensure_user_exists(storage: &SqlxStorage, user_id: &str) -> Result<()> {
    let row: Option<(String,)> = sqlx::query_as("SELECT user_id FROM users WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(storage.pool())
        .await
        .sql_context("Failed to check user")?;

    match row {
        Some(_) => Ok(()),
        None => Err(user_not_found(user_id)),
    }
}

/// Run a single-column update on a user row, failing if no row matched.
async fn update_user_column(
    storage: &SqlxStorage,
    user_id: &str,
    column: &'static str,
    value: &str,
) -> Result<()> {
    let statement = format!("UPDATE users SET {column} = $1 WHERE user_id = $2");
    let result = sqlx::query(&statement)
        .bind(value)
        .bind(user_id)
        .execute(storage.pool())
        .await
        .sql_context(&format!("Failed to update user {column}"))?;

    if result.rows_affected() == 0 {
        return Err(user_not_found(user_id));
    }
    Ok(())
}

pub async fn set_user_session_id(
    storage: &SqlxStorage,
    user_id: &str,
    session_id: &str,
) -> Result<()> {
    update_user_column(storage, user_id, "session_id", session_id).await
}

pub async fn set_user_name(storage: &SqlxStorage, user_id: &str, name: &str) -> Result<()> {
    update_user_column(storage, user_id, "name", name).await
}

pub async fn set_user_link(storage: &SqlxStorage, user_id: &str, link: &str) -> Result<()> {
    update_user_column(storage, user_id, "link", link).await
}

/// Get a user by ID.
pub async fn get_user(storage: &SqlxStorage, user_id: &str) -> Result<User> {
    let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE user_id = $1"))
        .bind(user_id)
        .fetch_optional(storage.pool())
        .await
        .sql_context("Failed to get user")?;

    row.map(user_from_row).ok_or_else(|| user_not_found(user_id))
}

/// Get a user by email, creating it if it does not exist.
///
/// The insert is a no-op when another request created the same email first;
/// the follow-up select then returns whichever row won.
pub async fn get_user_from_email(storage: &SqlxStorage, email: &str) -> Result<User> {
    let pool = storage.pool();

    let candidate = User::new(Uuid::new_v4().to_string(), email);
    let result = sqlx::query(
        "INSERT INTO users (user_id, email, name, link, session_id, created_at)
         VALUES ($1, $2, $3, NULL, NULL, $4)
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(&candidate.user_id)
    .bind(&candidate.email)
    .bind(&candidate.name)
    .bind(candidate.created_at)
    .execute(pool)
    .await
    .sql_context("Failed to insert user")?;

    if result.rows_affected() > 0 {
        tracing::info!(user_id = %candidate.user_id, "Created user");
    }

    let row: UserRow = sqlx::query_as(&format!("{SELECT_USER} WHERE email = $1"))
        .bind(email)
        .fetch_one(pool)
        .await
        .sql_context("Failed to get user by email")?;

    Ok(user_from_row(row))
}

/// Load the settings blob for a user.
pub async fn load_settings(storage: &SqlxStorage, user_id: &str) -> Result<String> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT settings FROM user_settings WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(storage.pool())
            .await
            .sql_context("Failed to load settings")?;

    Ok(row.map(|(settings,)| settings).unwrap_or_default())
}

/// Store the settings blob for a user.
pub async fn store_settings(storage: &SqlxStorage, user_id: &str, settings: &str) -> Result<()> {
    ensure_user_exists(storage, user_id).await?;

    sqlx::query(
        "INSERT INTO user_settings (user_id, settings) VALUES ($1, $2)
         ON CONFLICT (user_id) DO UPDATE SET settings = EXCLUDED.settings",
    )
    .bind(user_id)
    .bind(settings)
    .execute(storage.pool())
    .await
    .sql_context("Failed to store settings")?;

    Ok(())
}

/// List the names of all files for a user.
pub async fn get_user_files(storage: &SqlxStorage, user_id: &str) -> Result<HashSet<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT file_name FROM user_files WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(storage.pool())
        .await
        .sql_context("Failed to list user files")?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Create or replace a user file.
pub async fn upload_user_file(
    storage: &SqlxStorage,
    user_id: &str,
    file_name: &str,
    contents: &[u8],
) -> Result<()> {
    ensure_user_exists(storage, user_id).await?;

    sqlx::query(
        "INSERT INTO user_files (user_id, file_name, contents) VALUES ($1, $2, $3)
         ON CONFLICT (user_id, file_name) DO UPDATE SET contents = EXCLUDED.contents",
    )
    .bind(user_id)
    .bind(file_name)
    .bind(contents.to_vec())
    .execute(storage.pool())
    .await
    .sql_context("Failed to upload user file")?;

    Ok(())
}

/// Read a user file.
pub async fn download_user_file(
    storage: &SqlxStorage,
    user_id: &str,
    file_name: &str,
) -> Result<Vec<u8>> {
    let row: Option<(Vec<u8>,)> =
        sqlx::query_as("SELECT contents FROM user_files WHERE user_id = $1 AND file_name = $2")
            .bind(user_id)
            .bind(file_name)
            .fetch_optional(storage.pool())
            .await
            .sql_context("Failed to download user file")?;

    match row {
        Some((contents,)) => Ok(contents),
        None => Err(StorageError::UserFileNotFound {
            user_id: user_id.to_string(),
            file_name: file_name.to_string(),
        }
        .into()),
    }
}

/// Delete a user file. Missing files are ignored.
pub async fn delete_user_file(storage: &SqlxStorage, user_id: &str, file_name: &str) -> Result<()> {
    sqlx::query("DELETE FROM user_files WHERE user_id = $1 AND file_name = $2")
        .bind(user_id)
        .bind(file_name)
        .execute(storage.pool())
        .await
        .sql_context("Failed to delete user file")?;

    Ok(())
}
