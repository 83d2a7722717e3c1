//! The user information service.
//!
//! `UserInfoService` is a stateless bridge between an RPC transport and the
//! storage, identity and flag collaborators. It holds only handles to those
//! collaborators, so any server replica can serve any request.
//!
//! Every operation that acts on "the current user" takes an
//! [`IdentityResolver`] and resolves the caller before touching storage. An
//! identity failure therefore never reaches storage. Storage failures are
//! returned unmodified; nothing here retries.

pub mod handler;
pub mod protocol;

use std::sync::Arc;

use crate::Result;
use crate::constants::RENDEZVOUS_SERVER_FLAG;
use crate::flags::FlagProvider;
use crate::identity::IdentityResolver;
use crate::storage::UserStorage;
use crate::user::{Config, User};

/// Facade exposing user profile, settings and file operations.
#[derive(Clone)]
pub struct UserInfoService {
    storage: Arc<dyn UserStorage>,
    flags: Arc<dyn FlagProvider>,
}

impl UserInfoService {
    pub fn new(storage: Arc<dyn UserStorage>, flags: Arc<dyn FlagProvider>) -> Self {
        Self { storage, flags }
    }

    /// The storage this service forwards to.
    pub fn storage(&self) -> &Arc<dyn UserStorage> {
        &self.storage
    }

    /// Returns the system configuration, including the caller's user record.
    ///
    /// This both reads and writes: the returned user carries `session_id`, and the
    /// same session id is persisted for the caller with a single storage write.
    /// The rendezvous server is included only when its flag is non-empty.
    pub async fn get_system_config(
        &self,
        ctx: &dyn IdentityResolver,
        session_id: &str,
    ) -> Result<Config> {
        let user = self.record_session(ctx, session_id).await?;
        let mut config = Config::new(user);

        let rendezvous_server = self.flags.get_flag(RENDEZVOUS_SERVER_FLAG, "");
        if !rendezvous_server.is_empty() {
            config.rendezvous_server = Some(rendezvous_server);
        }

        Ok(config)
    }

    /// Returns the caller's user record and records their session id.
    ///
    /// Superseded by [`get_system_config`](Self::get_system_config) and kept for
    /// older clients. The session-id write is fused into this read to save the
    /// client a second round trip.
    pub async fn get_user_information(
        &self,
        ctx: &dyn IdentityResolver,
        session_id: &str,
    ) -> Result<User> {
        self.record_session(ctx, session_id).await
    }

    /// Returns the user record for an arbitrary user id.
    ///
    /// No caller check happens here; the transport decides who may call it.
    /// Unknown ids fail with a not-found error.
    pub async fn get_user_information_by_user_id(&self, user_id: &str) -> Result<User> {
        tracing::debug!(user_id, "Looking up user by id");
        self.storage.get_user(user_id).await
    }

    /// Returns the caller's settings blob (empty if never stored).
    pub async fn load_user_settings(&self, ctx: &dyn IdentityResolver) -> Result<String> {
        let user_id = ctx.current_user_id()?;
        self.storage.load_settings(&user_id).await
    }

    /// Stores the caller's settings blob verbatim.
    pub async fn store_user_settings(
        &self,
        ctx: &dyn IdentityResolver,
        settings: &str,
    ) -> Result<()> {
        let user_id = ctx.current_user_id()?;
        tracing::debug!(user_id = %user_id, len = settings.len(), "Storing user settings");
        self.storage.store_settings(&user_id, settings).await
    }

    /// Stores the caller's display name.
    pub async fn store_user_name(&self, ctx: &dyn IdentityResolver, name: &str) -> Result<()> {
        let user_id = ctx.current_user_id()?;
        self.storage.set_user_name(&user_id, name).await
    }

    /// Stores the caller's profile link.
    pub async fn store_user_link(&self, ctx: &dyn IdentityResolver, link: &str) -> Result<()> {
        let user_id = ctx.current_user_id()?;
        self.storage.set_user_link(&user_id, link).await
    }

    /// Returns true if the caller has a user file with the given name.
    pub async fn has_user_file(&self, ctx: &dyn IdentityResolver, file_name: &str) -> Result<bool> {
        let user_id = ctx.current_user_id()?;
        let files = self.storage.get_user_files(&user_id).await?;
        Ok(files.contains(file_name))
    }

    /// Deletes the caller's user file with the given name.
    pub async fn delete_user_file(&self, ctx: &dyn IdentityResolver, file_name: &str) -> Result<()> {
        let user_id = ctx.current_user_id()?;
        tracing::debug!(user_id = %user_id, file_name, "Deleting user file");
        self.storage.delete_user_file(&user_id, file_name).await
    }

    /// Stores a file for the caller, replacing any file with the same name.
    pub async fn upload_user_file(
        &self,
        ctx: &dyn IdentityResolver,
        file_name: &str,
        contents: &[u8],
    ) -> Result<()> {
        let user_id = ctx.current_user_id()?;
        tracing::debug!(user_id = %user_id, file_name, len = contents.len(), "Uploading user file");
        self.storage
            .upload_user_file(&user_id, file_name, contents)
            .await
    }

    /// Returns the contents of one of the caller's files.
    pub async fn download_user_file(
        &self,
        ctx: &dyn IdentityResolver,
        file_name: &str,
    ) -> Result<Vec<u8>> {
        let user_id = ctx.current_user_id()?;
        self.storage.download_user_file(&user_id, file_name).await
    }

    /// Resolve the caller, stamp `session_id` on their copy and persist it.
    async fn record_session(&self, ctx: &dyn IdentityResolver, session_id: &str) -> Result<User> {
        let user = ctx.current_user()?.with_session_id(session_id);
        let user_id = ctx.current_user_id()?;
        tracing::debug!(user_id = %user_id, session_id, "Recording session");
        self.storage
            .set_user_session_id(&user_id, session_id)
            .await?;
        Ok(user)
    }
}
