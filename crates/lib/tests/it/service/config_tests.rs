use std::sync::Arc;

use userinfo::{
    constants::RENDEZVOUS_SERVER_FLAG, identity::RequestContext, storage::UserStorage,
};

use crate::helpers::*;

async fn recording_setup() -> (Arc<RecordingStorage>, RequestContext) {
    let storage = Arc::new(RecordingStorage::new());
    let ctx = create_caller(storage.as_ref(), "alice").await;
    storage.clear();
    (storage, ctx)
}

#[tokio::test]
async fn test_system_config_records_session_once() {
    let (storage, ctx) = recording_setup().await;
    let (service, _flags) = test_service(storage.clone());
    let user_id = ctx.caller.as_ref().unwrap().user_id.clone();

    let config = service.get_system_config(&ctx, "session-1").await.unwrap();

    assert_eq!(config.user.user_id, user_id);
    assert_eq!(config.user.session_id.as_deref(), Some("session-1"));
    assert_eq!(
        storage.session_writes(),
        vec![(user_id.clone(), "session-1".to_string())]
    );

    // The persisted record agrees with the returned one
    let stored = storage.get_user(&user_id).await.unwrap();
    assert_eq!(stored.session_id.as_deref(), Some("session-1"));
}

#[tokio::test]
async fn test_system_config_matches_user_information() {
    let (storage, ctx) = recording_setup().await;
    let (service, _flags) = test_service(storage.clone());

    let config = service.get_system_config(&ctx, "s-42").await.unwrap();
    let user = service.get_user_information(&ctx, "s-42").await.unwrap();

    assert_eq!(config.user, user);

    let user_id = ctx.caller.as_ref().unwrap().user_id.clone();
    let expected = (user_id, "s-42".to_string());
    assert_eq!(storage.session_writes(), vec![expected.clone(), expected]);
}

#[tokio::test]
async fn test_rendezvous_server_included_when_flag_set() {
    let (service, flags, ctx) = test_service_with_caller("bob").await;
    flags.set(RENDEZVOUS_SERVER_FLAG, "wss://rendezvous.example.com");

    let config = service.get_system_config(&ctx, "s").await.unwrap();
    assert_eq!(
        config.rendezvous_server.as_deref(),
        Some("wss://rendezvous.example.com")
    );
}

#[tokio::test]
async fn test_rendezvous_server_omitted_when_flag_empty() {
    let (service, flags, ctx) = test_service_with_caller("carol").await;

    let config = service.get_system_config(&ctx, "s").await.unwrap();
    assert_eq!(config.rendezvous_server, None);

    flags.set(RENDEZVOUS_SERVER_FLAG, "");
    let config = service.get_system_config(&ctx, "s").await.unwrap();
    assert_eq!(config.rendezvous_server, None);

    let json = serde_json::to_value(&config).unwrap();
    assert!(json.get("rendezvousServer").is_none());
}

#[tokio::test]
async fn test_flag_change_visible_on_next_call() {
    let (service, flags, ctx) = test_service_with_caller("dave").await;

    flags.set(RENDEZVOUS_SERVER_FLAG, "wss://one.example.com");
    let first = service.get_system_config(&ctx, "s").await.unwrap();
    flags.unset(RENDEZVOUS_SERVER_FLAG);
    let second = service.get_system_config(&ctx, "s").await.unwrap();

    assert!(first.rendezvous_server.is_some());
    assert!(second.rendezvous_server.is_none());
}

#[tokio::test]
async fn test_later_session_id_wins() {
    let (service, _flags, ctx) = test_service_with_caller("erin").await;
    let user_id = ctx.caller.as_ref().unwrap().user_id.clone();

    service.get_system_config(&ctx, "first").await.unwrap();
    service.get_system_config(&ctx, "second").await.unwrap();

    let stored = service.storage().get_user(&user_id).await.unwrap();
    assert_eq!(stored.session_id.as_deref(), Some("second"));
}

#[tokio::test]
async fn test_lookup_by_user_id() {
    let (service, _flags, ctx) = test_service_with_caller("frank").await;
    let caller = ctx.caller.clone().unwrap();

    // Any identity may look up any user
    let other = service
        .storage()
        .get_user_from_email(&unique_email("grace"))
        .await
        .unwrap();
    let found = service
        .get_user_information_by_user_id(&other.user_id)
        .await
        .unwrap();
    assert_eq!(found.user_id, other.user_id);
    assert_eq!(found.email, other.email);

    let found = service
        .get_user_information_by_user_id(&caller.user_id)
        .await
        .unwrap();
    assert_eq!(found.email, caller.email);
}

#[tokio::test]
async fn test_lookup_unknown_user_id_fails() {
    let (service, _flags, _ctx) = test_service_with_caller("heidi").await;

    let err = service
        .get_user_information_by_user_id("no-such-user")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
