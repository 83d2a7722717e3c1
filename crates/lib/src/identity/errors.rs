//! Identity error types for the userinfo library.
//!
//! This module defines structured error types for caller resolution,
//! keeping "no authenticated caller" distinct from storage failures.

use thiserror::Error as ThisError;

use crate::Error;

/// Errors that can occur while resolving the current caller.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum AuthError {
    /// The request carries no authenticated caller.
    #[error("No authenticated caller for this request")]
    NotAuthenticated,

    /// The request referenced a session that is unknown or no longer valid.
    #[error("Session is unknown or expired: {session}")]
    SessionExpired {
        /// The session token presented by the caller
        session: String,
    },
}

impl AuthError {
    /// Check if the caller never authenticated at all.
    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, AuthError::NotAuthenticated)
    }

    /// Check if the caller presented a session that could not be used.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, AuthError::SessionExpired { .. })
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}
