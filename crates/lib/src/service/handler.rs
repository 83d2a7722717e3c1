//! Transport-agnostic request dispatch.
//!
//! Transports decode a [`UserInfoRequest`], build a request context and hand
//! both to [`handle_request`]. Errors are returned as-is so the transport can
//! map them onto its own error responses.

use super::UserInfoService;
use super::protocol::{UserInfoRequest, UserInfoResponse};
use crate::Result;
use crate::identity::IdentityResolver;

/// Dispatch a single request to the service.
///
/// # Arguments
/// * `service` - The service to dispatch to
/// * `ctx` - Identity of the caller for this request
/// * `request` - The decoded request
///
/// # Returns
/// The response for the request, or the service error unmodified.
pub async fn handle_request(
    service: &UserInfoService,
    ctx: &dyn IdentityResolver,
    request: UserInfoRequest,
) -> Result<UserInfoResponse> {
    let method = request.method();
    let result = dispatch(service, ctx, request).await;
    if let Err(e) = &result {
        tracing::debug!(method, error = %e, "Request failed");
    }
    result
}

async fn dispatch(
    service: &UserInfoService,
    ctx: &dyn IdentityResolver,
    request: UserInfoRequest,
) -> Result<UserInfoResponse> {
    let response = match request {
        UserInfoRequest::GetSystemConfig { session_id } => {
            UserInfoResponse::Config(service.get_system_config(ctx, &session_id).await?)
        }
        UserInfoRequest::GetUserInformation { session_id } => {
            UserInfoResponse::User(service.get_user_information(ctx, &session_id).await?)
        }
        UserInfoRequest::GetUserInformationByUserId { user_id } => {
            UserInfoResponse::User(service.get_user_information_by_user_id(&user_id).await?)
        }
        UserInfoRequest::LoadUserSettings => {
            UserInfoResponse::Settings(service.load_user_settings(ctx).await?)
        }
        UserInfoRequest::StoreUserSettings { settings } => {
            service.store_user_settings(ctx, &settings).await?;
            UserInfoResponse::Done
        }
        UserInfoRequest::StoreUserName { name } => {
            service.store_user_name(ctx, &name).await?;
            UserInfoResponse::Done
        }
        UserInfoRequest::StoreUserLink { link } => {
            service.store_user_link(ctx, &link).await?;
            UserInfoResponse::Done
        }
        UserInfoRequest::HasUserFile { file_name } => {
            UserInfoResponse::HasFile(service.has_user_file(ctx, &file_name).await?)
        }
        UserInfoRequest::DeleteUserFile { file_name } => {
            service.delete_user_file(ctx, &file_name).await?;
            UserInfoResponse::Done
        }
        UserInfoRequest::UploadUserFile {
            file_name,
            contents,
        } => {
            service.upload_user_file(ctx, &file_name, &contents).await?;
            UserInfoResponse::Done
        }
        UserInfoRequest::DownloadUserFile { file_name } => {
            UserInfoResponse::FileContents(service.download_user_file(ctx, &file_name).await?)
        }
    };
    Ok(response)
}
