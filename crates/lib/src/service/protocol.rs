//! Protocol definitions for the user information RPC surface.
//!
//! This module defines transport-agnostic message types. A request is a JSON
//! object naming the method and its parameters:
//!
//! ```json
//! {"method": "storeUserName", "params": {"name": "Alice"}}
//! ```
//!
//! Binary file contents travel as standard base64 strings.

use serde::{Deserialize, Serialize};

use crate::user::{Config, User};

/// Request messages accepted by the user information service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum UserInfoRequest {
    #[serde(rename_all = "camelCase")]
    GetSystemConfig { session_id: String },
    /// Superseded by `GetSystemConfig`; kept for older clients.
    #[serde(rename_all = "camelCase")]
    GetUserInformation { session_id: String },
    #[serde(rename_all = "camelCase")]
    GetUserInformationByUserId { user_id: String },
    LoadUserSettings,
    StoreUserSettings { settings: String },
    StoreUserName { name: String },
    StoreUserLink { link: String },
    #[serde(rename_all = "camelCase")]
    HasUserFile { file_name: String },
    #[serde(rename_all = "camelCase")]
    DeleteUserFile { file_name: String },
    #[serde(rename_all = "camelCase")]
    UploadUserFile {
        file_name: String,
        #[serde(with = "base64_bytes")]
        contents: Vec<u8>,
    },
    #[serde(rename_all = "camelCase")]
    DownloadUserFile { file_name: String },
}

impl UserInfoRequest {
    /// The wire name of the method, for logging.
    pub fn method(&self) -> &'static str {
        match self {
            UserInfoRequest::GetSystemConfig { .. } => "getSystemConfig",
            UserInfoRequest::GetUserInformation { .. } => "getUserInformation",
            UserInfoRequest::GetUserInformationByUserId { .. } => "getUserInformationByUserId",
            UserInfoRequest::LoadUserSettings => "loadUserSettings",
            UserInfoRequest::StoreUserSettings { .. } => "storeUserSettings",
            UserInfoRequest::StoreUserName { .. } => "storeUserName",
            UserInfoRequest::StoreUserLink { .. } => "storeUserLink",
            UserInfoRequest::HasUserFile { .. } => "hasUserFile",
            UserInfoRequest::DeleteUserFile { .. } => "deleteUserFile",
            UserInfoRequest::UploadUserFile { .. } => "uploadUserFile",
            UserInfoRequest::DownloadUserFile { .. } => "downloadUserFile",
        }
    }
}

/// Response messages returned by the user information service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", content = "result", rename_all = "camelCase")]
pub enum UserInfoResponse {
    Config(Config),
    User(User),
    Settings(String),
    HasFile(bool),
    FileContents(#[serde(with = "base64_bytes")] Vec<u8>),
    /// The operation completed and returns nothing.
    Done,
}

mod base64_bytes {
    use base64ct::{Base64, Encoding};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&Base64::encode_string(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        Base64::decode_vec(&encoded).map_err(serde::de::Error::custom)
    }
}
