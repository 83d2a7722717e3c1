use serde_json::json;
use userinfo::{
    identity::RequestContext,
    service::{
        handler::handle_request,
        protocol::{UserInfoRequest, UserInfoResponse},
    },
};

use crate::helpers::*;

fn request(value: serde_json::Value) -> UserInfoRequest {
    serde_json::from_value(value).expect("valid request")
}

#[tokio::test]
async fn test_dispatch_system_config() {
    let (service, flags, ctx) = test_service_with_caller("alice").await;
    flags.set("use.rendezvousserver", "wss://rv.example.com");

    let response = handle_request(
        &service,
        &ctx,
        request(json!({"method": "getSystemConfig", "params": {"sessionId": "s-1"}})),
    )
    .await
    .unwrap();

    let UserInfoResponse::Config(config) = response else {
        panic!("expected config response, got {response:?}");
    };
    assert_eq!(config.user.session_id.as_deref(), Some("s-1"));
    assert_eq!(config.rendezvous_server.as_deref(), Some("wss://rv.example.com"));
}

#[tokio::test]
async fn test_dispatch_settings_and_profile() {
    let (service, _flags, ctx) = test_service_with_caller("bob").await;

    let response = handle_request(
        &service,
        &ctx,
        request(json!({"method": "storeUserSettings", "params": {"settings": "{\"a\":1}"}})),
    )
    .await
    .unwrap();
    assert_eq!(response, UserInfoResponse::Done);

    let response = handle_request(&service, &ctx, request(json!({"method": "loadUserSettings"})))
        .await
        .unwrap();
    assert_eq!(response, UserInfoResponse::Settings("{\"a\":1}".to_string()));

    handle_request(
        &service,
        &ctx,
        request(json!({"method": "storeUserName", "params": {"name": "Bobby"}})),
    )
    .await
    .unwrap();
    handle_request(
        &service,
        &ctx,
        request(json!({"method": "storeUserLink", "params": {"link": "https://bob.example"}})),
    )
    .await
    .unwrap();

    let user_id = ctx.caller.as_ref().unwrap().user_id.clone();
    let response = handle_request(
        &service,
        &ctx,
        request(json!({"method": "getUserInformationByUserId", "params": {"userId": user_id}})),
    )
    .await
    .unwrap();
    let UserInfoResponse::User(user) = response else {
        panic!("expected user response, got {response:?}");
    };
    assert_eq!(user.name, "Bobby");
    assert_eq!(user.link.as_deref(), Some("https://bob.example"));
}

#[tokio::test]
async fn test_dispatch_file_operations() {
    let (service, _flags, ctx) = test_service_with_caller("carol").await;

    handle_request(
        &service,
        &ctx,
        request(json!({
            "method": "uploadUserFile",
            "params": {"fileName": "android.keystore", "contents": "AAEC/w=="}
        })),
    )
    .await
    .unwrap();

    let has = request(json!({"method": "hasUserFile", "params": {"fileName": "android.keystore"}}));
    assert_eq!(
        handle_request(&service, &ctx, has.clone()).await.unwrap(),
        UserInfoResponse::HasFile(true)
    );

    let response = handle_request(
        &service,
        &ctx,
        request(json!({"method": "downloadUserFile", "params": {"fileName": "android.keystore"}})),
    )
    .await
    .unwrap();
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"type": "fileContents", "result": "AAEC/w=="})
    );

    handle_request(
        &service,
        &ctx,
        request(json!({"method": "deleteUserFile", "params": {"fileName": "android.keystore"}})),
    )
    .await
    .unwrap();
    assert_eq!(
        handle_request(&service, &ctx, has).await.unwrap(),
        UserInfoResponse::HasFile(false)
    );
}

#[tokio::test]
async fn test_dispatch_propagates_errors() {
    let (service, _flags, _ctx) = test_service_with_caller("dave").await;

    let err = handle_request(
        &service,
        &RequestContext::anonymous(),
        request(json!({"method": "loadUserSettings"})),
    )
    .await
    .unwrap_err();
    assert!(err.is_authentication_error());

    let err = handle_request(
        &service,
        &RequestContext::anonymous(),
        request(json!({"method": "getUserInformationByUserId", "params": {"userId": "nobody"}})),
    )
    .await
    .unwrap_err();
    assert!(err.is_not_found());
}
