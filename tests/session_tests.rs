use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use taskboard_rust::api::{ClientOptions, FileStorage, MemoryStorage, TokenStorage};
use taskboard_rust::router::{GuardDecision, Route, Router};
use taskboard_rust::Taskboard;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_auth(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc",
            "token_type": "bearer"
        })))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "email": "test@example.com",
            "full_name": "Test User",
            "is_active": true,
            "is_superuser": false
        })))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_login_makes_dashboard_reachable() {
    let mock_server = MockServer::start().await;
    mount_auth(&mock_server).await;

    let storage = Arc::new(MemoryStorage::new());
    let taskboard = Taskboard::new_with_options(
        ClientOptions::default().with_base_url(&mock_server.uri()),
        storage.clone(),
    )
    .unwrap();

    // before initialization protected routes wait
    let nav = taskboard.navigate("/dashboard");
    assert_eq!(nav.route, Route::Dashboard);
    assert_eq!(nav.decision, GuardDecision::Placeholder);

    taskboard.session_store().initialize().await;
    let nav = taskboard.navigate("/dashboard");
    assert_eq!(nav.route, Route::Login);
    assert_eq!(nav.decision, GuardDecision::Render);

    let session = taskboard
        .session_store()
        .login("test@example.com", "password")
        .await;
    assert!(session.authenticated);
    assert_eq!(storage.get_item("token").unwrap(), Some("abc".to_string()));

    let nav = taskboard.navigate("/dashboard");
    assert_eq!(nav.route, Route::Dashboard);
    assert_eq!(nav.decision, GuardDecision::Render);

    // guest-only routes bounce back to the dashboard
    let nav = taskboard.navigate("/register");
    assert_eq!(nav.route, Route::Dashboard);

    taskboard.session_store().logout();
    let nav = taskboard.navigate("/tasks");
    assert_eq!(nav.route, Route::Login);
}

#[tokio::test]
async fn test_session_survives_restart_through_file_storage() {
    let mock_server = MockServer::start().await;
    mount_auth(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let storage_path = dir.path().join("storage.json");
    let options = ClientOptions::default().with_base_url(&mock_server.uri());

    let first = Taskboard::new_with_options(
        options.clone(),
        Arc::new(FileStorage::new(&storage_path)),
    )
    .unwrap();
    first.session_store().initialize().await;
    first
        .session_store()
        .login("test@example.com", "password")
        .await;
    assert!(first.session().authenticated);

    // a fresh process rehydrates from the persisted token
    let second =
        Taskboard::new_with_options(options, Arc::new(FileStorage::new(&storage_path))).unwrap();
    let session = second.session_store().initialize().await;

    assert!(session.authenticated);
    assert_eq!(session.user.unwrap().email, "test@example.com");
}

#[tokio::test]
async fn test_protected_routes_wait_while_token_is_checked() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 1, "email": "test@example.com"}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let taskboard = Taskboard::new_with_options(
        ClientOptions::default().with_base_url(&mock_server.uri()),
        Arc::new(MemoryStorage::with_item("token", "abc")),
    )
    .unwrap();

    let store = taskboard.session_store().clone();
    let init = tokio::spawn(async move { store.initialize().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let session = taskboard.session();
    assert!(session.loading);
    assert_eq!(
        Router::check(Route::Dashboard, &session),
        GuardDecision::Placeholder
    );
    assert_eq!(Router::check(Route::Login, &session), GuardDecision::Render);

    init.await.unwrap();
    assert_eq!(
        Router::check(Route::Dashboard, &taskboard.session()),
        GuardDecision::Render
    );
}

#[tokio::test]
async fn test_login_recovers_from_truncated_storage_file() {
    let mock_server = MockServer::start().await;
    mount_auth(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let storage_path = dir.path().join("storage.json");
    std::fs::write(&storage_path, r#"{"tok"#).unwrap();

    let taskboard = Taskboard::new_with_options(
        ClientOptions::default().with_base_url(&mock_server.uri()),
        Arc::new(FileStorage::new(&storage_path)),
    )
    .unwrap();

    let session = taskboard.session_store().initialize().await;
    assert!(!session.authenticated);

    taskboard.session_store().logout();
    let session = taskboard
        .session_store()
        .login("test@example.com", "password")
        .await;

    assert!(session.authenticated);
    assert_eq!(session.error, None);

    let reopened = FileStorage::new(&storage_path);
    assert_eq!(reopened.get_item("token").unwrap(), Some("abc".to_string()));
}
