//! Per-request identity context.

use uuid::Uuid;

use super::{AuthError, IdentityResolver};
use crate::{Result, user::User};

/// Identity established for a single request before the service runs.
///
/// The transport builds one of these per request (for example from a session
/// cookie) and passes it into every service call. There is no fallback user:
/// a context without a caller fails identity resolution.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated caller, if any
    pub caller: Option<User>,
    /// Correlation id for logs
    pub request_id: String,
}

impl RequestContext {
    /// A context with no authenticated caller.
    pub fn anonymous() -> Self {
        Self {
            caller: None,
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// A context for an authenticated caller.
    pub fn for_user(user: User) -> Self {
        Self {
            caller: Some(user),
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// Replace the generated request id, e.g. with one propagated by the transport.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.caller.is_some()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl IdentityResolver for RequestContext {
    fn current_user(&self) -> Result<User> {
        self.caller
            .clone()
            .ok_or_else(|| AuthError::NotAuthenticated.into())
    }

    fn current_user_id(&self) -> Result<String> {
        self.caller
            .as_ref()
            .map(|user| user.user_id.clone())
            .ok_or_else(|| AuthError::NotAuthenticated.into())
    }
}
