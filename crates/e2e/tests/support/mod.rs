//! Mock kanban API shared by the integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Echoes the created entity back with an id; ids grow in request order
/// across every route sharing the counter
#[derive(Clone)]
pub struct IdAssigner {
    next: Arc<AtomicI64>,
}

impl IdAssigner {
    pub fn new() -> Self {
        Self {
            next: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Respond for IdAssigner {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut body: serde_json::Value =
            serde_json::from_slice(&request.body).unwrap_or_else(|_| json!({}));
        body["id"] = json!(self.next.fetch_add(1, Ordering::SeqCst));
        ResponseTemplate::new(201).set_body_json(body)
    }
}

/// In-memory board collection behind `/api/boards` and `/api/reset`
#[derive(Clone, Default)]
pub struct BoardStore {
    boards: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl BoardStore {
    pub fn count(&self) -> usize {
        self.boards.lock().len()
    }

    /// Mount the board and reset routes backed by this store
    pub async fn mount(&self, server: &MockServer) {
        Mock::given(path("/api/boards"))
            .respond_with(self.clone())
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/reset"))
            .respond_with(self.clone())
            .mount(server)
            .await;
    }
}

impl Respond for BoardStore {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut boards = self.boards.lock();
        match (request.method.as_str(), request.url.path()) {
            ("GET", _) => ResponseTemplate::new(200).set_body_json(&*boards),
            ("POST", "/api/boards") => {
                let body: serde_json::Value =
                    serde_json::from_slice(&request.body).unwrap_or_else(|_| json!({}));
                let board = json!({
                    "id": boards.len() as i64 + 1,
                    "name": body["name"],
                    "starred": false,
                });
                boards.push(board.clone());
                ResponseTemplate::new(201).set_body_json(board)
            }
            ("POST", "/api/reset") | ("DELETE", "/api/boards") => {
                boards.clear();
                ResponseTemplate::new(204)
            }
            _ => ResponseTemplate::new(405),
        }
    }
}

/// Mount create routes for boards, lists and cards on one id counter
pub async fn mount_creates(server: &MockServer) -> IdAssigner {
    let ids = IdAssigner::new();
    for route in ["/api/boards", "/api/lists", "/api/cards"] {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(ids.clone())
            .mount(server)
            .await;
    }
    ids
}

/// Health check and board reset routes
pub async fn mount_housekeeping(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/boards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/boards"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

/// Paths of every request the server saw, in order
pub async fn request_log(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}
