//! Caller identity resolution.
//!
//! The service never looks up "the current user" from global state. Instead,
//! every operation receives an `IdentityResolver`, normally a `RequestContext`
//! built by the transport after it has authenticated the request.

mod context;
mod errors;

pub use context::RequestContext;
pub use errors::AuthError;

use crate::{Result, user::User};

/// Resolves the caller of the current request.
///
/// Both methods must fail with an authentication error when there is no
/// authenticated caller. Implementations must never substitute a default user.
pub trait IdentityResolver: Send + Sync {
    /// A copy of the caller's user record.
    fn current_user(&self) -> Result<User>;

    /// The caller's user id.
    fn current_user_id(&self) -> Result<String>;
}
