//! HTTP fixture client for the kanban application's REST API
//!
//! One call per domain operation. Every checked call turns a non-2xx answer
//! into [`E2eError::ApiStatus`] so the scenario that issued it fails; the
//! `*_unchecked` variants hand the status back for scenarios that assert on it.

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use kanban_common::{
    AuthPayload, Board, BoardUpdate, Card, CardUpdate, Credentials, List, ListUpdate, NewBoard,
    NewCard, NewList, UserStore,
};

use crate::error::{E2eError, E2eResult};

/// Status and decoded body of a call that is not allowed to fail
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `error` field of an application error body
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(|e| e.as_str())
    }
}

/// Client for the application's `/api` endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> E2eResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// A client that authenticates every request with `Bearer <token>`
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    /// An anonymous copy of this client
    pub fn anonymous(&self) -> Self {
        Self {
            token: None,
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("{} {}", method, path);
        let request = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn checked(
        &self,
        request: RequestBuilder,
        method: &Method,
        path: &str,
    ) -> E2eResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(E2eError::ApiStatus {
            method: method.to_string(),
            path: path.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn call<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> E2eResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.builder(method.clone(), path);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.checked(request, &method, path).await?;
        Ok(response.json::<T>().await?)
    }

    /// Calls whose response body carries nothing the kit needs
    async fn call_discarding<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> E2eResult<()>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.builder(method.clone(), path);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.checked(request, &method, path).await?;
        Ok(())
    }

    /// Issue a request and return whatever status the application answers with
    pub async fn send_unchecked<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> E2eResult<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.builder(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
        };

        Ok(ApiResponse { status, body })
    }

    // Boards

    pub async fn create_board(&self, name: &str) -> E2eResult<Board> {
        self.call(Method::POST, "/api/boards", Some(&NewBoard { name })).await
    }

    pub async fn get_boards(&self) -> E2eResult<Vec<Board>> {
        self.call::<_, ()>(Method::GET, "/api/boards", None).await
    }

    pub async fn get_board(&self, board_id: i64) -> E2eResult<Board> {
        self.call::<_, ()>(Method::GET, &format!("/api/boards/{}", board_id), None)
            .await
    }

    /// Fetch a board without failing on 4xx, for access-control checks
    pub async fn get_board_unchecked(&self, board_id: i64) -> E2eResult<ApiResponse> {
        self.send_unchecked::<()>(Method::GET, &format!("/api/boards/{}", board_id), None)
            .await
    }

    pub async fn update_board(&self, board_id: i64, update: &BoardUpdate) -> E2eResult<Board> {
        self.call(Method::PATCH, &format!("/api/boards/{}", board_id), Some(update))
            .await
    }

    pub async fn delete_board(&self, board_id: i64) -> E2eResult<()> {
        self.call_discarding::<()>(Method::DELETE, &format!("/api/boards/{}", board_id), None).await
    }

    pub async fn delete_all_boards(&self) -> E2eResult<()> {
        self.call_discarding::<()>(Method::DELETE, "/api/boards", None).await
    }

    // Lists

    pub async fn create_list(&self, board_id: i64, name: &str) -> E2eResult<List> {
        self.call(Method::POST, "/api/lists", Some(&NewList { board_id, name }))
            .await
    }

    pub async fn get_lists(&self, board_id: Option<i64>) -> E2eResult<Vec<List>> {
        let path = match board_id {
            Some(id) => format!("/api/lists?boardId={}", id),
            None => "/api/lists".to_string(),
        };
        self.call::<_, ()>(Method::GET, &path, None).await
    }

    pub async fn update_list(&self, list_id: i64, update: &ListUpdate) -> E2eResult<List> {
        self.call(Method::PATCH, &format!("/api/lists/{}", list_id), Some(update))
            .await
    }

    pub async fn delete_list(&self, list_id: i64) -> E2eResult<()> {
        self.call_discarding::<()>(Method::DELETE, &format!("/api/lists/{}", list_id), None).await
    }

    pub async fn delete_all_lists(&self) -> E2eResult<()> {
        self.call_discarding::<()>(Method::DELETE, "/api/lists", None).await
    }

    // Cards

    pub async fn create_card(&self, board_id: i64, list_id: i64, name: &str) -> E2eResult<Card> {
        self.call(
            Method::POST,
            "/api/cards",
            Some(&NewCard {
                board_id,
                list_id,
                name,
            }),
        )
        .await
    }

    pub async fn update_card(&self, card_id: i64, update: &CardUpdate) -> E2eResult<Card> {
        self.call(Method::PATCH, &format!("/api/cards/{}", card_id), Some(update))
            .await
    }

    pub async fn mark_card_complete(&self, card_id: i64) -> E2eResult<Card> {
        self.update_card(card_id, &CardUpdate::completed(true)).await
    }

    pub async fn delete_card(&self, card_id: i64) -> E2eResult<()> {
        self.call_discarding::<()>(Method::DELETE, &format!("/api/cards/{}", card_id), None).await
    }

    pub async fn delete_all_cards(&self) -> E2eResult<()> {
        self.call_discarding::<()>(Method::DELETE, "/api/cards", None).await
    }

    // Users and database

    pub async fn delete_all_users(&self) -> E2eResult<()> {
        self.call_discarding::<()>(Method::DELETE, "/api/users", None).await
    }

    pub async fn signup(&self, email: &str, password: &str) -> E2eResult<AuthPayload> {
        self.call(Method::POST, "/api/signup", Some(&Credentials::new(email, password)))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> E2eResult<AuthPayload> {
        self.call(Method::POST, "/api/login", Some(&Credentials::new(email, password)))
            .await
    }

    /// Sign the user up unless the application's database already has them
    pub async fn ensure_user_exists(
        &self,
        credentials: &Credentials,
        store: &UserStore,
    ) -> E2eResult<Option<AuthPayload>> {
        if store.contains_email(&credentials.email) {
            debug!("User {} already exists", credentials.email);
            return Ok(None);
        }

        let payload = self.signup(&credentials.email, &credentials.password).await?;
        Ok(Some(payload))
    }

    /// Wipe every collection of the application's database
    pub async fn reset_database(&self) -> E2eResult<()> {
        self.call_discarding::<()>(Method::POST, "/api/reset", None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_dropped() {
        let api = ApiClient::new("http://localhost:3000/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_with_token_keeps_base_url() {
        let api = ApiClient::new("http://localhost:3000").unwrap();
        let authed = api.with_token("abc");
        assert_eq!(authed.base_url(), api.base_url());
        assert!(authed.anonymous().token.is_none());
    }

    #[test]
    fn test_error_message_reads_error_field() {
        let response = ApiResponse {
            status: 403,
            body: serde_json::json!({ "error": "User doesn't have access to this board" }),
        };
        assert!(!response.is_success());
        assert_eq!(
            response.error_message(),
            Some("User doesn't have access to this board")
        );
    }
}
