//! Core records mirroring the kanban application's domain

use serde::{Deserialize, Serialize};

/// A board, the top-level container owning lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub starred: bool,
    /// Owning user for private boards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// An ordered column on a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// A task item within a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i64,
    pub board_id: i64,
    pub list_id: i64,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// A list together with the cards created for it, in creation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListWithCards {
    #[serde(flatten)]
    pub list: List,
    pub cards: Vec<Card>,
}

impl ListWithCards {
    pub fn id(&self) -> i64 {
        self.list.id
    }

    pub fn name(&self) -> &str {
        &self.list.name
    }
}

/// Result of building a board and its lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardWithLists {
    pub board: Board,
    pub lists: Vec<List>,
}

/// Result of building a board, its lists and every list's cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardWithListsAndCards {
    pub board: Board,
    pub lists: Vec<ListWithCards>,
}

impl BoardWithListsAndCards {
    /// Total number of cards across all lists
    pub fn card_count(&self) -> usize {
        self.lists.iter().map(|l| l.cards.len()).sum()
    }

    /// Card names in board order (list by list)
    pub fn card_names(&self) -> impl Iterator<Item = &str> {
        self.lists
            .iter()
            .flat_map(|l| l.cards.iter().map(|c| c.name.as_str()))
    }
}

/// Request body for creating a board
#[derive(Debug, Clone, Serialize)]
pub struct NewBoard<'a> {
    pub name: &'a str,
}

/// Request body for creating a list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewList<'a> {
    pub board_id: i64,
    pub name: &'a str,
}

/// Request body for creating a card
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard<'a> {
    pub board_id: i64,
    pub list_id: i64,
    pub name: &'a str,
}

/// Partial board update; unset fields are left out of the PATCH body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
}

impl BoardUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn starred(starred: bool) -> Self {
        Self {
            starred: Some(starred),
            ..Default::default()
        }
    }
}

/// Partial list update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Partial card update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<i64>,
}

impl CardUpdate {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }
}

/// Login/signup credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Body returned by the signup and login endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
}

/// Error body the application sends with 4xx responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_uses_camel_case_wire_names() {
        let json = r#"{"id":3,"boardId":1,"listId":2,"name":"Task","completed":true,"created":"2024-01-01"}"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.board_id, 1);
        assert_eq!(card.list_id, 2);
        assert!(card.completed);
        assert_eq!(card.description, None);
    }

    #[test]
    fn test_board_defaults_to_unstarred() {
        let board: Board = serde_json::from_str(r#"{"id":7,"name":"N"}"#).unwrap();
        assert!(!board.starred);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let list: List =
            serde_json::from_str(r#"{"id":1,"boardId":9,"name":"To Do","order":4}"#).unwrap();
        assert_eq!(list.name, "To Do");
    }

    #[test]
    fn test_updates_only_serialize_set_fields() {
        let body = serde_json::to_value(BoardUpdate::starred(true)).unwrap();
        assert_eq!(body, serde_json::json!({ "starred": true }));

        let body = serde_json::to_value(CardUpdate {
            list_id: Some(4),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "listId": 4 }));
    }

    #[test]
    fn test_list_with_cards_flattens_list_fields() {
        let value = serde_json::json!({
            "id": 5,
            "boardId": 1,
            "name": "Done",
            "cards": [{"id": 8, "boardId": 1, "listId": 5, "name": "Ship"}]
        });
        let list: ListWithCards = serde_json::from_value(value).unwrap();
        assert_eq!(list.id(), 5);
        assert_eq!(list.cards[0].name, "Ship");
    }

    #[test]
    fn test_auth_payload_reads_access_token() {
        let payload: AuthPayload = serde_json::from_str(
            r#"{"accessToken":"abc","user":{"email":"a@b.c","id":1}}"#,
        )
        .unwrap();
        assert_eq!(payload.access_token.as_deref(), Some("abc"));
        assert_eq!(payload.user.unwrap().email, "a@b.c");
    }
}
