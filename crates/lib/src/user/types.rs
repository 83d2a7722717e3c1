//! Core data types for the user system

use serde::{Deserialize, Serialize};

/// Identity record for a single user.
///
/// The storage layer owns the durable record. Everything handed out by the
/// service is a transient copy; the service only ever changes `session_id`
/// on that copy, and persists the session id through a separate storage write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque, stable primary key
    pub user_id: String,

    /// Login email the user was created from
    pub email: String,

    /// Display name
    pub name: String,

    /// Optional profile link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Client session the user was last seen with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Account creation timestamp (Unix timestamp)
    pub created_at: i64,
}

impl User {
    /// Create a new user record with the display name defaulted from the email.
    ///
    /// The name is the part of the email before `@`, matching what a user sees
    /// before they pick a display name of their own.
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        let email = email.into();
        let name = email.split('@').next().unwrap_or_default().to_string();
        Self {
            user_id: user_id.into(),
            email,
            name,
            link: None,
            session_id: None,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Return this copy with the session id set.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// System configuration returned to a client at startup.
///
/// Built fresh for every request; it has no lifetime beyond the response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Snapshot of the calling user, with the session id set
    pub user: User,

    /// Rendezvous server address, absent when none is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendezvous_server: Option<String>,
}

impl Config {
    pub fn new(user: User) -> Self {
        Self {
            user,
            rendezvous_server: None,
        }
    }
}
