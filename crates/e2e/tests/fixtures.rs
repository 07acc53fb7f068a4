//! Entity builders: ordering, counts and abort-on-failure

mod support;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kanban_e2e::fixtures::{self, data, ListSpec};
use kanban_e2e::{ApiClient, E2eError};

#[tokio::test]
async fn test_lists_are_created_in_given_order() {
    let server = MockServer::start().await;
    support::mount_creates(&server).await;
    let api = ApiClient::new(&server.uri()).unwrap();

    let built = fixtures::create_board_with_lists(&api, "Task Board", &data::KANBAN_LISTS)
        .await
        .unwrap();

    let names: Vec<&str> = built.lists.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, data::KANBAN_LISTS);
    assert!(built.lists.iter().all(|l| l.board_id == built.board.id));

    let ids: Vec<i64> = built.lists.iter().map(|l| l.id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    assert!(built.board.id < ids[0]);
}

#[tokio::test]
async fn test_empty_list_names_create_only_the_board() {
    let server = MockServer::start().await;
    support::mount_creates(&server).await;
    let api = ApiClient::new(&server.uri()).unwrap();

    let built = fixtures::create_board_with_lists::<&str>(&api, "Lonely", &[])
        .await
        .unwrap();

    assert!(built.lists.is_empty());
    assert_eq!(support::request_log(&server).await, vec!["POST /api/boards"]);
}

#[tokio::test]
async fn test_cards_follow_their_list() {
    let server = MockServer::start().await;
    support::mount_creates(&server).await;
    let api = ApiClient::new(&server.uri()).unwrap();

    let specs = data::full_board();
    let built = fixtures::create_board_with_lists_and_cards(&api, data::FULL_BOARD_NAME, &specs)
        .await
        .unwrap();

    assert_eq!(built.lists.len(), specs.len());
    let expected_cards: usize = specs.iter().map(|s| s.cards.len()).sum();
    assert_eq!(built.card_count(), expected_cards);

    for (list, spec) in built.lists.iter().zip(&specs) {
        assert_eq!(list.name(), spec.list_name);
        let names: Vec<&str> = list.cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, spec.cards);
        for card in &list.cards {
            assert_eq!(card.list_id, list.id());
            assert_eq!(card.board_id, built.board.id);
            assert!(card.id > list.id());
        }
    }

    // each list is created right before its own cards
    let log = support::request_log(&server).await;
    let mut expected = vec!["POST /api/boards".to_string()];
    for spec in &specs {
        expected.push("POST /api/lists".to_string());
        expected.extend(spec.cards.iter().map(|_| "POST /api/cards".to_string()));
    }
    assert_eq!(log, expected);
}

#[tokio::test]
async fn test_failed_list_aborts_without_rollback() {
    let server = MockServer::start().await;
    let ids = support::IdAssigner::new();

    Mock::given(method("POST"))
        .and(path("/api/boards"))
        .respond_with(ids.clone())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/lists"))
        .respond_with(ids.clone())
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "db locked" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cards"))
        .respond_with(ids.clone())
        .expect(2)
        .mount(&server)
        .await;
    // nothing created so far may be removed
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let specs = vec![
        ListSpec::new("To Do", ["Task 1", "Task 2"]),
        ListSpec::new("Done", ["Task 3"]),
    ];
    let err = fixtures::create_board_with_lists_and_cards(&api, "Broken", &specs)
        .await
        .unwrap_err();

    assert!(matches!(err, E2eError::ApiStatus { status: 500, .. }));
}

#[tokio::test]
async fn test_failed_board_creates_nothing_else() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/boards"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "name required" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let err = fixtures::create_board_with_lists(&api, "", &data::KANBAN_LISTS)
        .await
        .unwrap_err();

    assert!(matches!(err, E2eError::ApiStatus { status: 400, .. }));
}
