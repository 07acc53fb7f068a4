//! Fixture client against a mock of the kanban REST API

mod support;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kanban_common::{BoardUpdate, Credentials, UserStore};
use kanban_e2e::{ApiClient, E2eError};

#[tokio::test]
async fn test_create_board_posts_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/boards"))
        .and(body_json(json!({ "name": "Project Alpha" })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "id": 7, "name": "Project Alpha", "starred": false })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let board = api.create_board("Project Alpha").await.unwrap();

    assert_eq!(board.id, 7);
    assert_eq!(board.name, "Project Alpha");
    assert!(!board.starred);
}

#[tokio::test]
async fn test_token_is_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/boards"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap().with_token("abc123");
    let boards = api.get_boards().await.unwrap();
    assert!(boards.is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let err = api.create_list(1, "To Do").await.unwrap_err();

    match err {
        E2eError::ApiStatus {
            method,
            path,
            status,
            body,
        } => {
            assert_eq!(method, "POST");
            assert_eq!(path, "/api/lists");
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unchecked_fetch_returns_forbidden() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/boards/1"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "error": "User doesn't have access to this board" })),
        )
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let response = api.get_board_unchecked(1).await.unwrap();

    assert_eq!(response.status, 403);
    assert!(!response.is_success());
    assert!(response.error_message().unwrap().contains("have access"));
}

#[tokio::test]
async fn test_update_board_sends_only_set_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/boards/3"))
        .and(body_json(json!({ "starred": true })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": 3, "name": "Test Board", "starred": true })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let board = api.update_board(3, &BoardUpdate::starred(true)).await.unwrap();
    assert!(board.starred);
}

#[tokio::test]
async fn test_reset_and_delete_all_discard_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reset"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;
    support::mount_housekeeping(&server).await;

    let api = ApiClient::new(&server.uri()).unwrap();
    api.reset_database().await.unwrap();
    api.reset_database().await.unwrap();
    api.delete_all_boards().await.unwrap();

    assert_eq!(
        support::request_log(&server).await,
        vec!["POST /api/reset", "POST /api/reset", "DELETE /api/boards"]
    );
}

#[tokio::test]
async fn test_boards_stay_empty_across_repeated_resets() {
    let server = MockServer::start().await;
    let store = support::BoardStore::default();
    store.mount(&server).await;

    let api = ApiClient::new(&server.uri()).unwrap();
    api.create_board("Project Alpha").await.unwrap();
    api.create_board("Personal").await.unwrap();
    assert_eq!(api.get_boards().await.unwrap().len(), 2);

    for _ in 0..2 {
        api.reset_database().await.unwrap();
        assert!(api.get_boards().await.unwrap().is_empty());
    }
    assert_eq!(store.count(), 0);
}

#[tokio::test]
async fn test_created_board_reads_back_once_unstarred() {
    let server = MockServer::start().await;
    support::BoardStore::default().mount(&server).await;

    let api = ApiClient::new(&server.uri()).unwrap();
    api.create_board("Other").await.unwrap();
    let created = api.create_board("N").await.unwrap();

    let boards = api.get_boards().await.unwrap();
    let named: Vec<_> = boards.iter().filter(|b| b.name == "N").collect();
    assert_eq!(named.len(), 1);
    assert_eq!(named[0].id, created.id);
    assert!(!named[0].starred);
}

#[tokio::test]
async fn test_known_user_is_not_signed_up() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/signup"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "accessToken": "t" })))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("database.json");
    std::fs::write(
        &db,
        r#"{"users":[{"id":1,"email":"filip@example.com","password":"x"}]}"#,
    )
    .unwrap();

    let api = ApiClient::new(&server.uri()).unwrap();
    let store = UserStore::load(&db).unwrap();
    let signed_up = api
        .ensure_user_exists(&Credentials::new("filip@example.com", "Asdf.1234#"), &store)
        .await
        .unwrap();
    assert!(signed_up.is_none());
}

#[tokio::test]
async fn test_unknown_user_is_signed_up() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/signup"))
        .and(body_json(json!({ "email": "new@example.com", "password": "pw" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "accessToken": "t" })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = UserStore::load(dir.path().join("absent.json")).unwrap();

    let api = ApiClient::new(&server.uri()).unwrap();
    let payload = api
        .ensure_user_exists(&Credentials::new("new@example.com", "pw"), &store)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payload.access_token.as_deref(), Some("t"));
}
