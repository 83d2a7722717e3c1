//!
//! userinfo: a stateless user profile and settings service.
//! This library provides the facade and the collaborator interfaces behind it.
//!
//! ## Core Concepts
//!
//! * **Users (`user::User`)**: The identity record handed out per request. Callers only ever see a
//!   transient copy; the storage layer owns the durable one.
//! * **Identity (`identity::IdentityResolver`)**: Resolves "the current caller" from an explicit
//!   per-request value (`identity::RequestContext`) rather than ambient global state.
//! * **Storage (`storage::UserStorage`)**: A pluggable persistence layer for users, session ids,
//!   settings blobs and user files. `InMemory` and sqlx-based SQL backends are provided.
//! * **Flags (`flags::FlagProvider`)**: Named string flags read at call time, such as the
//!   rendezvous server address.
//! * **Service (`service::UserInfoService`)**: The facade. Every operation resolves the caller,
//!   performs at most one storage read or write (plus the session-id write for the fused
//!   config/user-information calls) and returns.

pub mod constants;
pub mod flags;
pub mod identity;
pub mod service;
pub mod storage;
pub mod user;

pub use service::UserInfoService;
pub use user::{Config, User};

/// Result type used throughout the userinfo library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the userinfo library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured identity errors from the identity module
    #[error(transparent)]
    Auth(identity::AuthError),

    /// Structured storage errors from the storage module
    #[error(transparent)]
    Storage(storage::StorageError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Auth(_) => "identity",
            Error::Storage(_) => "storage",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Storage(storage_err) => storage_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Check if this error came from the storage layer.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Storage(storage_err) => storage_err.is_io_error(),
            _ => false,
        }
    }
}
